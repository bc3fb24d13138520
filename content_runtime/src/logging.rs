//! Structured logging through `tracing`.
//!
//! # Log Levels
//!
//! - `error`: a panicking event handler
//! - `warn`: asset failures, wiring failures, orphaned input, boot items skipped
//! - `info`: instance creation and removal, boot summaries
//! - `debug`: life-cycle transitions, asset requests, input routing

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install a global subscriber. `RUST_LOG` wins over `default_filter`
/// (typically [`crate::RuntimeConfig::log_filter`]).
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(default_filter: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(true),
    );

    if subscriber.try_init().is_err() {
        return false;
    }

    tracing::debug!(filter = default_filter, "tracing initialized");
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        // Another test may have installed the subscriber first.
        let _ = init("content_runtime=debug");
        assert!(!init("content_runtime=debug"));
    }
}
