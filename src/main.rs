use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use seam_keeper::config::{CliArgs, DecimateConfig};
use seam_keeper::pipeline::Pipeline;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Init tracing
    let filter = if args.verbose {
        EnvFilter::new("seam_keeper=debug")
    } else {
        EnvFilter::new("seam_keeper=info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config: DecimateConfig = args.into();

    // Configure rayon thread pool
    if let Some(threads) = config.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure rayon thread pool")?;
    }

    match Pipeline::run(&config) {
        Ok(result) => {
            println!(
                "{} ({}: {} → {} triangles in {:.2}s)",
                result.status,
                result.object,
                result.source_triangles,
                result.result_triangles,
                result.duration.as_secs_f64()
            );
            Ok(())
        }
        Err(e) => {
            error!(%e, "Pipeline failed");
            Err(anyhow::anyhow!(e)).context("seam-keeper decimation failed")
        }
    }
}
