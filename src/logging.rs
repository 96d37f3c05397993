//! Diagnostic logging on stderr.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "hookcheck=debug"
    } else {
        "warn"
    }
}

/// Initialize the global subscriber. `RUST_LOG` overrides the default filter.
///
/// Logs go to stderr so JSON and SARIF on stdout stay parseable. Calling this
/// twice is harmless; the second call is ignored.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "warn");
        assert_eq!(default_directive(true), "hookcheck=debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(false);
        init_logging(true);
        tracing::debug!("still alive");
    }
}
