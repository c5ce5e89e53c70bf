//! Diagnostic output setup.
//!
//! Everything goes to stderr so the tool stays quiet on stdout inside build
//! systems. `RUST_LOG` overrides the default `warn` level, but it cannot hide
//! this crate's own warnings: missing patterns and a missing repository are
//! always reported.

use std::io::IsTerminal;

use tracing::Level;
use tracing_subscriber::filter::{EnvFilter, FilterExt, Targets};
use tracing_subscriber::prelude::*;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "warn";

/// Events from this crate at or above this level are always shown.
pub const ALWAYS_SHOWN: Level = Level::WARN;

/// Filter letting this crate's warnings through whatever `RUST_LOG` says.
pub fn crate_warnings() -> Targets {
    Targets::new().with_target(env!("CARGO_CRATE_NAME"), ALWAYS_SHOWN)
}

/// Install the global subscriber. Safe to call more than once.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .with_filter(env_filter.or(crate_warnings()));

    let _ = tracing_subscriber::registry().with(layer).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_warnings_cover_own_modules() {
        let targets = crate_warnings();
        assert!(targets.would_enable("buildstamp::template", &Level::WARN));
        assert!(targets.would_enable("buildstamp::generator", &Level::ERROR));
        assert!(!targets.would_enable("buildstamp::process", &Level::DEBUG));
        assert!(!targets.would_enable("other_crate", &Level::WARN));
    }
}
