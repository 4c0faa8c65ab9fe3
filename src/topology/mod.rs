pub mod adjacency;
pub mod seams;

pub use adjacency::{Adjacency, EdgeRecord};
pub use seams::mark_seams_from_uv_islands;
