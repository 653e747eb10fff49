//! Tracing subscriber setup for the command-line tool.
//!
//! Events go to stderr so stdout stays usable for `--json` reports. The
//! filter comes from `HTML2MD_LOG`, then `RUST_LOG`, then the verbosity
//! given on the command line.

use crate::envconfig::LOG_VAR;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Maps `-q`/`-v` counts to a default filter directive.
pub fn level_for(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn filter_directive(default_level: &str) -> String {
    std::env::var(LOG_VAR)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default_level.to_string())
}

/// Installs the global subscriber once; later calls are no-ops.
pub fn init_logging(verbose: u8, quiet: bool) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let directive = filter_directive(level_for(verbose, quiet));
        let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .with_filter(filter),
        );

        if subscriber.try_init().is_err() {
            tracing::debug!("global tracing subscriber already set");
        }

        tracing::debug!(filter = %directive, "logging initialized");
    });
}
