//! Runs the sample batch through both pipeline shapes.
//!
//! ```text
//! cargo run --example pipeline_demo
//! SUMPIPE_CONFIG=pipeline.toml RUST_LOG=sumpipe_rs=trace cargo run --example pipeline_demo
//! ```

use anyhow::Context;
use sumpipe_rs::pipeline::CollectingReporter;
use sumpipe_rs::{Pipeline, PipelineConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SAMPLE_BATCH: [i64; 14] = [1, 2, 3, 4, 5, 6, 7, 7, 7, 10, 100, 1000, 2000, 3000];

/// Environment variable naming an optional config file
const CONFIG_ENV: &str = "SUMPIPE_CONFIG";

fn main() -> anyhow::Result<()> {
    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => PipelineConfig::load(&path)
            .with_context(|| format!("Failed to load {}", CONFIG_ENV))?,
        None => PipelineConfig::default(),
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting sumpipe demo");
    let pipeline = Pipeline::new(config);

    let mut reporter = CollectingReporter::new();
    pipeline
        .run_per_value_with(&SAMPLE_BATCH, &mut reporter)
        .context("per-value run")?;
    println!("Per-value mode:");
    for result in reporter.results() {
        println!("  {}", result);
    }

    let stats = pipeline
        .run_persistent_with_stats(&SAMPLE_BATCH)
        .context("persistent run")?;
    println!("Persistent mode:");
    println!("  Result: {}", stats.total);
    println!("  {:.1}% of the batch accumulated", stats.pass_rate());
    println!(
        "{}",
        serde_json::to_string_pretty(&stats).context("Failed to serialize run stats")?
    );

    Ok(())
}
