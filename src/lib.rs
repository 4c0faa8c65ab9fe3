pub mod config;
pub mod decimation;
pub mod error;
pub mod export;
pub mod ingestion;
pub mod pipeline;
pub mod topology;
pub mod transfer;
pub mod transform;
pub mod types;

pub use config::{DecimateConfig, SimplifyConfig};
pub use pipeline::{DecimateOutcome, Pipeline, decimate_object};
