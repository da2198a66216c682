//! `DuelrelayServer` builder and server loop.
//!
//! This is the entry point for running a relay. It ties together all the
//! layers: transport → hub (router, rooms, sessions) → connection handlers.

use std::net::SocketAddr;
use std::time::Duration;

use duelrelay_protocol::JsonCodec;
use duelrelay_room::RegistryConfig;
use duelrelay_transport::{Transport, WebSocketTransport};

use crate::config::ServerConfig;
use crate::handler::handle_connection;
use crate::hub::{HubHandle, spawn_hub};
use crate::DuelrelayError;

/// Builder for configuring and starting a relay server.
///
/// # Example
///
/// ```rust,no_run
/// use duelrelay::prelude::*;
///
/// # async fn run() -> Result<(), DuelrelayError> {
/// let server = DuelrelayServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct DuelrelayServerBuilder {
    config: ServerConfig,
}

impl DuelrelayServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Closes connections that stay silent for `timeout`.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = Some(timeout);
        self
    }

    /// Sets the room registry limits.
    pub fn registry_config(mut self, registry: RegistryConfig) -> Self {
        self.config.registry = registry;
        self
    }

    /// Binds the listener and starts the hub.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<DuelrelayServer, DuelrelayError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;
        let hub = spawn_hub(
            JsonCodec,
            self.config.registry.clone(),
            self.config.hub_channel_size,
        );

        Ok(DuelrelayServer {
            transport,
            hub,
            idle_timeout: self.config.idle_timeout,
        })
    }
}

impl Default for DuelrelayServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound relay server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct DuelrelayServer {
    transport: WebSocketTransport,
    hub: HubHandle,
    idle_timeout: Option<Duration>,
}

impl DuelrelayServer {
    /// Creates a new builder.
    pub fn builder() -> DuelrelayServerBuilder {
        DuelrelayServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, DuelrelayError> {
        Ok(self.transport.local_addr()?)
    }

    /// Returns a handle to the hub, e.g. for [`HubHandle::stats`].
    pub fn hub(&self) -> HubHandle {
        self.hub.clone()
    }

    /// Runs the accept loop.
    ///
    /// Spawns a task for each accepted socket that runs the WebSocket
    /// upgrade and then the connection handler. A failed accept or upgrade
    /// is logged and the loop continues.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), DuelrelayError> {
        tracing::info!("duelrelay server running");

        loop {
            match self.transport.accept().await {
                Ok(incoming) => {
                    let hub = self.hub.clone();
                    let idle_timeout = self.idle_timeout;
                    tokio::spawn(async move {
                        let peer = incoming.peer_addr();
                        let conn = match incoming.upgrade().await {
                            Ok(conn) => conn,
                            Err(e) => {
                                tracing::debug!(%peer, error = %e, "websocket upgrade failed");
                                return;
                            }
                        };
                        if let Err(e) = handle_connection(conn, hub, idle_timeout).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                }
            }
        }
    }
}
