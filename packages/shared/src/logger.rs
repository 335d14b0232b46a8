//! Logging setup for Quizhall binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// The filter covers the server library and the calling binary. `RUST_LOG`
/// takes precedence over `default_log_level` when it is set.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "quizhall-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info")
///
/// # Examples
///
/// ```no_run
/// use quizhall_shared::logger::setup_logger;
///
/// setup_logger("quizhall-server", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the fallback `EnvFilter` directive used when `RUST_LOG` is unset.
fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    format!(
        "quizhall_server={level},{bin}={level},tower_http={level}",
        level = default_log_level,
        bin = binary_name.replace('-', "_"),
    )
}
