//! Server configuration.
//!
//! Settings are plain structs with sensible defaults. The binary fills them
//! from the environment; tests and embedders set fields directly or go
//! through [`DuelrelayServerBuilder`](crate::DuelrelayServerBuilder).

use std::time::Duration;

use duelrelay_room::RegistryConfig;

/// Environment variable holding a full bind address, e.g. `127.0.0.1:9000`.
pub const ENV_BIND: &str = "DUELRELAY_BIND";
/// Environment variable holding just a port; the relay listens on all
/// interfaces.
pub const ENV_PORT: &str = "PORT";
/// Environment variable holding the idle timeout in seconds (0 = none).
pub const ENV_IDLE_TIMEOUT_SECS: &str = "DUELRELAY_IDLE_TIMEOUT_SECS";

const DEFAULT_PORT: u16 = 8080;

/// Configuration for a relay server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// Capacity of the hub's command queue. When it fills, connection
    /// readers wait; connection writers never do.
    pub hub_channel_size: usize,

    /// Close connections that send nothing for this long. `None` keeps
    /// idle connections open forever, which is what a host waiting for a
    /// joiner needs.
    pub idle_timeout: Option<Duration>,

    /// Room code and room count limits.
    pub registry: RegistryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            hub_channel_size: 256,
            idle_timeout: None,
            registry: RegistryConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// See [`ServerConfig::from_lookup`] for the rules.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from a key lookup.
    ///
    /// - `DUELRELAY_BIND` sets the full address and wins over `PORT`.
    /// - `PORT` binds `0.0.0.0:<PORT>`.
    /// - `DUELRELAY_IDLE_TIMEOUT_SECS` sets the idle timeout; `0` disables it.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(port) = lookup(ENV_PORT) {
            match port.trim().parse::<u16>() {
                Ok(port) => config.bind_addr = format!("0.0.0.0:{port}"),
                Err(e) => tracing::warn!(%port, error = %e, "ignoring invalid PORT"),
            }
        }

        if let Some(addr) = lookup(ENV_BIND) {
            let addr = addr.trim();
            if addr.is_empty() {
                tracing::warn!("ignoring empty {ENV_BIND}");
            } else {
                config.bind_addr = addr.to_string();
            }
        }

        if let Some(secs) = lookup(ENV_IDLE_TIMEOUT_SECS) {
            match secs.trim().parse::<u64>() {
                Ok(0) => config.idle_timeout = None,
                Ok(secs) => config.idle_timeout = Some(Duration::from_secs(secs)),
                Err(e) => tracing::warn!(
                    %secs, error = %e,
                    "ignoring invalid {ENV_IDLE_TIMEOUT_SECS}"
                ),
            }
        }

        config
    }
}
