//! # Secure Session Configuration
//!
//! Configuration for the handshake, channel and lifecycle manager.
//!
//! Sources, later overriding earlier: defaults, TOML file, environment.

use crate::algorithms::default_secure_endpoints;
use crate::domain::{
    ProtocolVariant, SessionError, SessionKeyDerivation, ACTIVITY_INTERVAL_MS,
    HANDSHAKE_TIMEOUT_MS, MAX_RETRY_ATTEMPTS, RETRY_BASE_DELAY_MS,
};
use serde::{Deserialize, Serialize};
use shared_crypto::DEFAULT_PBKDF2_ITERATIONS;
use std::env;
use std::path::Path;
use std::time::Duration;

/// Secure session configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Injected client identifier. Required by `initialize`.
    pub client_id: Option<String>,

    /// Device base URL for relative request targets.
    pub base_url: String,

    /// Handshake variant.
    pub variant: ProtocolVariant,

    /// Channel key derivation.
    pub session_key_derivation: SessionKeyDerivation,

    /// Handshake attempts per `initialize`.
    pub max_retry_attempts: u32,

    /// Linear backoff base in milliseconds.
    pub retry_base_delay_ms: u64,

    /// Per round-trip timeout in milliseconds.
    pub handshake_timeout_ms: u64,

    /// Liveness ping interval in milliseconds.
    pub activity_interval_ms: u64,

    /// PBKDF2 iterations for handshake envelopes.
    pub pbkdf2_iterations: u32,

    /// Inbound nonce replay window in milliseconds.
    pub replay_window_ms: u64,

    /// Wrapped handshake endpoint.
    pub protected_handshake_path: String,

    /// Unwrapped key-exchange endpoint.
    pub key_exchange_path: String,

    /// Liveness ping endpoint.
    pub activity_path: String,

    /// Capability probe endpoint.
    pub hello_path: String,

    /// Path substrings routed through the channel by `secure_fetch`.
    pub secure_endpoints: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            base_url: "http://192.168.4.1".to_string(),
            variant: ProtocolVariant::Wrapped,
            session_key_derivation: SessionKeyDerivation::Hkdf,
            max_retry_attempts: MAX_RETRY_ATTEMPTS,
            retry_base_delay_ms: RETRY_BASE_DELAY_MS,
            handshake_timeout_ms: HANDSHAKE_TIMEOUT_MS,
            activity_interval_ms: ACTIVITY_INTERVAL_MS,
            pbkdf2_iterations: DEFAULT_PBKDF2_ITERATIONS,
            replay_window_ms: 60_000,
            protected_handshake_path: "/secure/protected-handshake".to_string(),
            key_exchange_path: "/api/secure/keyexchange".to_string(),
            activity_path: "/api/activity".to_string(),
            hello_path: "/api/secure/hello".to_string(),
            secure_endpoints: default_secure_endpoints(),
        }
    }
}

impl SessionConfig {
    /// Create a config for testing (cheap KDF, short timers).
    pub fn for_testing() -> Self {
        Self {
            client_id: Some("abc123".to_string()),
            base_url: "http://device.test".to_string(),
            retry_base_delay_ms: 10,
            handshake_timeout_ms: 1_000,
            activity_interval_ms: 100,
            pbkdf2_iterations: 100,
            ..Self::default()
        }
    }

    /// Parse a TOML document; missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, SessionError> {
        let config: Self =
            toml::from_str(text).map_err(|e| SessionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SessionError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Defaults overridden by environment.
    ///
    /// # Environment Variables
    ///
    /// - `SL_CLIENT_ID`: client identifier
    /// - `SL_BASE_URL`: device base URL
    /// - `SL_VARIANT`: `wrapped` or `unwrapped`
    /// - `SL_SESSION_KEY`: `hkdf` or `direct`
    /// - `SL_MAX_RETRIES`, `SL_RETRY_BASE_MS`, `SL_HANDSHAKE_TIMEOUT_MS`,
    ///   `SL_ACTIVITY_INTERVAL_MS`, `SL_PBKDF2_ITERATIONS`
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of `self`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(id) = env::var("SL_CLIENT_ID") {
            if !id.is_empty() {
                self.client_id = Some(id);
            }
        }
        if let Ok(url) = env::var("SL_BASE_URL") {
            self.base_url = url;
        }
        if let Ok(variant) = env::var("SL_VARIANT") {
            match variant.to_lowercase().as_str() {
                "wrapped" | "a" => self.variant = ProtocolVariant::Wrapped,
                "unwrapped" | "b" => self.variant = ProtocolVariant::Unwrapped,
                other => tracing::warn!("[secure-session] ignoring unknown SL_VARIANT {other}"),
            }
        }
        if let Ok(kdf) = env::var("SL_SESSION_KEY") {
            match kdf.to_lowercase().as_str() {
                "hkdf" => self.session_key_derivation = SessionKeyDerivation::Hkdf,
                "direct" => self.session_key_derivation = SessionKeyDerivation::Direct,
                other => tracing::warn!("[secure-session] ignoring unknown SL_SESSION_KEY {other}"),
            }
        }
        self.max_retry_attempts = env_parse("SL_MAX_RETRIES").unwrap_or(self.max_retry_attempts);
        self.retry_base_delay_ms =
            env_parse("SL_RETRY_BASE_MS").unwrap_or(self.retry_base_delay_ms);
        self.handshake_timeout_ms =
            env_parse("SL_HANDSHAKE_TIMEOUT_MS").unwrap_or(self.handshake_timeout_ms);
        self.activity_interval_ms =
            env_parse("SL_ACTIVITY_INTERVAL_MS").unwrap_or(self.activity_interval_ms);
        self.pbkdf2_iterations =
            env_parse("SL_PBKDF2_ITERATIONS").unwrap_or(self.pbkdf2_iterations);
        self
    }

    /// Reject values that would make the lifecycle unusable.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.max_retry_attempts == 0 {
            return Err(SessionError::Config("max_retry_attempts must be >= 1".into()));
        }
        if self.pbkdf2_iterations == 0 {
            return Err(SessionError::Config("pbkdf2_iterations must be >= 1".into()));
        }
        if self.handshake_timeout_ms == 0 || self.activity_interval_ms == 0 {
            return Err(SessionError::Config("timers must be non-zero".into()));
        }
        Ok(())
    }

    /// Per round-trip timeout.
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    /// Liveness ping interval.
    pub fn activity_interval(&self) -> Duration {
        Duration::from_millis(self.activity_interval_ms)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
