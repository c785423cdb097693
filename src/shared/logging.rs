//! Logging utilities module
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` overrides the
//! configured level.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};
use crate::shared::error::{AppError, AppResult};

/// Logging utilities for the application
pub struct LoggingUtils;

impl LoggingUtils {
    /// Initialize logging with the specified configuration
    pub fn initialize(config: &LoggingConfig) -> AppResult<()> {
        let filter = Self::filter(&config.level)?;

        let builder = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(true)
            .with_ansi(config.ansi);

        let result = match config.format {
            LogFormat::Full => tracing::subscriber::set_global_default(
                builder.with_file(true).with_line_number(true).finish(),
            ),
            LogFormat::Compact => tracing::subscriber::set_global_default(builder.compact().finish()),
        };

        result.map_err(|e| AppError::Internal(format!("Failed to initialize logging: {}", e)))
    }

    fn filter(level: &str) -> AppResult<EnvFilter> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(level)
                .map_err(|e| AppError::Config(format!("Invalid log level '{}': {}", level, e))),
        }
    }
}
