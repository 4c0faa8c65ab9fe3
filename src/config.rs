use std::path::PathBuf;

use clap::Parser;

/// Smallest decimation ratio accepted.
pub const MIN_RATIO: f32 = 0.01;
/// Largest decimation ratio accepted (no reduction).
pub const MAX_RATIO: f32 = 1.0;

/// Simplifier parameters.
#[derive(Debug, Clone)]
pub struct SimplifyConfig {
    /// Fraction of the original triangle count to keep.
    pub ratio: f32,
    /// meshoptimizer relative error bound.
    pub max_error: f32,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            ratio: 0.5,
            max_error: 1.0,
        }
    }
}

/// Fully resolved decimation configuration (constructed from CLI args).
#[derive(Debug, Clone, Default)]
pub struct DecimateConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Object to decimate; the first object with faces when unset.
    pub object: Option<String>,
    pub simplify: SimplifyConfig,
    pub dry_run: bool,
    pub verbose: bool,
    pub threads: Option<usize>,
}

/// Parse and range-check a decimation ratio.
pub fn parse_ratio(s: &str) -> Result<f32, String> {
    let ratio: f32 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if (MIN_RATIO..=MAX_RATIO).contains(&ratio) {
        Ok(ratio)
    } else {
        Err(format!("ratio must be between {MIN_RATIO} and {MAX_RATIO}"))
    }
}

/// CLI argument definition (clap derive).
#[derive(Parser, Debug)]
#[command(
    name = "seam-keeper",
    about = "Decimate a mesh while keeping UV seams, vertex groups and shape keys",
    version
)]
pub struct CliArgs {
    /// Input file (OBJ or scene JSON)
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Output scene JSON
    #[arg(short = 'o', long)]
    pub output: PathBuf,

    /// Fraction of triangles to keep (0.01-1.0)
    #[arg(short = 'r', long, default_value = "0.5", value_parser = parse_ratio)]
    pub ratio: f32,

    /// Name of the object to decimate
    #[arg(long)]
    pub object: Option<String>,

    /// Simplifier error bound, relative to mesh extent
    #[arg(long, default_value_t = 1.0)]
    pub max_error: f32,

    /// Report the triangle budget only
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Worker thread count (default: all cores)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

impl From<CliArgs> for DecimateConfig {
    fn from(args: CliArgs) -> Self {
        DecimateConfig {
            input: args.input,
            output: args.output,
            object: args.object,
            simplify: SimplifyConfig {
                ratio: args.ratio,
                max_error: args.max_error,
            },
            dry_run: args.dry_run,
            verbose: args.verbose,
            threads: args.threads,
        }
    }
}
