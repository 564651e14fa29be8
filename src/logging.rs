//! Diagnostic logging for the `td` binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the binary. Output goes to stderr so it never mixes with command output.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Level for a `-v` count, or `None` to defer to the configured level.
pub fn verbosity_level(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Filter directive for this run: `-v` flags beat the configured level.
/// Directives apply to this crate only.
pub fn directive(verbose: u8, configured: &str) -> String {
    let level = verbosity_level(verbose).unwrap_or(configured);
    format!("taskdeck={}", level)
}

/// Install the global subscriber. `RUST_LOG` overrides `directive` when set.
///
/// Calling this twice is harmless; the second call reports an error string.
pub fn init(directive: &str) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .map_err(|e| format!("invalid log level '{}': {}", directive, e))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| format!("logging already initialized: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_flags_override_config() {
        assert_eq!(directive(0, "warn"), "taskdeck=warn");
        assert_eq!(directive(1, "warn"), "taskdeck=info");
        assert_eq!(directive(2, "error"), "taskdeck=debug");
        assert_eq!(directive(5, "warn"), "taskdeck=trace");
    }
}
