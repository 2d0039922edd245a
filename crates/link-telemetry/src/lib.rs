//! # Link Telemetry
//!
//! Structured logging for the secure link tools.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use link_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::for_service("sl-probe"))?;
//!     // Logs from secure-session now reach stdout
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SL_SERVICE_NAME` | `secure-link` | Service name |
//! | `SL_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` also honored) |
//! | `SL_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `SL_JSON_LOGS` | `false` | JSON lines instead of pretty output |

#![warn(missing_docs)]

mod config;
mod logging;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::build_filter;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber is already installed or could not be set.
    #[error("Failed to initialize subscriber: {0}")]
    SubscriberInit(String),

    /// Log level directives did not parse.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install structured logging.
///
/// Returns a guard to hold for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    tracing_setup::init_tracing(&config)?;
    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
}

impl TelemetryGuard {
    /// Service name the logs are tagged with.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::debug!(service = %self.service_name, "Shutting down telemetry");
    }
}
