use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directive to install, if any.
///
/// A non-empty `RUST_LOG` wins, `--verbose` falls back to `debug`, otherwise logging stays off
/// so nothing is written over the TUI frame.
fn log_directive(verbose: bool, rust_log: Option<String>) -> Option<String> {
    match rust_log {
        Some(directive) if !directive.trim().is_empty() => Some(directive),
        _ if verbose => Some("debug".to_string()),
        _ => None,
    }
}

/// Initialize the logging system. Returns whether a subscriber was installed.
pub fn init_logger(verbose: bool) -> bool {
    let Some(directive) = log_directive(verbose, std::env::var("RUST_LOG").ok()) else {
        return false;
    };
    let filter = tracing_subscriber::EnvFilter::new(directive);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr) // Write to stderr to not interfere with TUI
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .try_init()
        .is_ok()
}

/// Progress indicator for startup sequence
pub fn log_progress(step: usize, total: usize, message: impl std::fmt::Display) {
    eprintln!("[{}/{}] -> {}", step, total, message);
}
