//! Tracing subscriber setup for hosts embedding the harvester.
//!
//! Log output goes to stderr so stdout stays free for the serialized
//! harvest. `RUST_LOG` takes precedence over the default directive.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "site_harvester=info";

/// Builds the filter: `RUST_LOG` if set and valid, otherwise `default_directive`.
pub fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Installs a global fmt subscriber on stderr.
///
/// Returns `false` if a global subscriber was already set, in which case the
/// existing one is kept.
pub fn init_logging(default_directive: &str) -> bool {
    let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    tracing_subscriber::registry()
        .with(env_filter(default_directive))
        .with(fmt_layer)
        .try_init()
        .is_ok()
}
