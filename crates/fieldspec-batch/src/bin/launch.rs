use std::process;

use fieldspec_batch::{Harness, HarnessConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = HarnessConfig::from_env().unwrap_or_else(|e| {
        tracing::error!("{e}");
        process::exit(1);
    });

    tracing::info!(key = %config.job_key, store = ?config.object_store, "launching batch job");
    match Harness::new(config).run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            tracing::error!(error = %e, "batch job failed");
            process::exit(1);
        }
    }
}
