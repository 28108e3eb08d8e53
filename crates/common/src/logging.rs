use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{CommonError, Result};

/// Install a global fmt subscriber.
///
/// `RUST_LOG` takes precedence over `log_level` when it is set.
pub fn init_tracing(log_level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| CommonError::Logging(format!("Failed to initialize logging: {}", e)))
}
