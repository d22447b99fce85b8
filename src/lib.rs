pub mod advice;
pub mod config;
pub mod error;
pub mod estimator;
pub mod intake;
pub mod lifestyle;
pub mod report;

use crate::config::Config;
use crate::error::AppError;
use crate::estimator::{load_reference_data, CostEstimator};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// `RUST_LOG` takes precedence over `level`. Output goes to stderr so that
/// stdout stays clean for machine-readable command output.
pub fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);

    if format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

/// Load the reference tables named in the configuration and build the
/// estimator with the configured overrides.
pub async fn build_estimator(cfg: &Config) -> Result<CostEstimator, AppError> {
    let data = load_reference_data(
        &cfg.data.costs_path,
        &cfg.data.weights_path,
        cfg.data.write_defaults,
    )
    .await?;

    Ok(CostEstimator::builder(data.costs, data.weights)
        .condition_sources(cfg.estimator.condition_source_map())
        .family_history(cfg.estimator.family_history_table())
        .lifestyle_source(cfg.estimator.lifestyle_source.clone())
        .insurance_source(cfg.estimator.insurance_source.clone())
        .discount_rate(cfg.estimator.insurance_discount_rate)
        .build())
}
