//! Driver binaries exercising tiered page placement.
//!
//! The `eval_placement` binary allocates regions with configurable placement
//! patterns, queries their residency, and reports the results as JSON.

use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;

/// Initializes logging bridged with an indicatif [`MultiProgress`], so
/// progress bars and log lines do not garble each other.
pub fn init_logging_with_progress() -> anyhow::Result<MultiProgress> {
    let logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).build();
    let progress = MultiProgress::new();
    LogWrapper::new(progress.clone(), logger).try_init()?;
    Ok(progress)
}
