//! Logging initialization
//!
//! The library only emits `tracing` events; installing a subscriber is up to
//! the binary (or a test) through [`init`].

use std::sync::Once;

use tracing_subscriber::{EnvFilter, util::SubscriberInitExt};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output on stderr
    Development,
    /// JSON structured output on stderr
    Production,
    /// No output; events are discarded
    Test,
}

static INIT_ONCE: Once = Once::new();

/// Directive used when `RUST_LOG` is not set
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "xml_compare=debug"
    } else {
        "xml_compare=warn"
    }
}

/// Installs the global subscriber; later calls are no-ops
///
/// `RUST_LOG` takes precedence over the default directive.
pub fn init(profile: Profile, verbose: bool) {
    INIT_ONCE.call_once(|| {
        let filter = || {
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
        };
        match profile {
            Profile::Development => {
                tracing_subscriber::fmt()
                    .with_env_filter(filter())
                    .with_writer(std::io::stderr)
                    .init();
            }
            Profile::Production => {
                tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(filter())
                    .with_writer(std::io::stderr)
                    .init();
            }
            Profile::Test => {
                tracing_subscriber::registry().init();
            }
        }
    });
}
