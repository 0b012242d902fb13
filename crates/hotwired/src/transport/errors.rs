//! Error types for listener sessions.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors that end a listener session.
///
/// The supervisor logs the error and starts a fresh session after a fixed
/// backoff unless the stop signal has been raised.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to start listener runtime: {source}")]
    Runtime {
        #[source]
        source: io::Error,
    },
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("failed to listen on channel '{channel}': {source}")]
    Subscribe {
        channel: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("notification stream on channel '{channel}' failed: {source}")]
    Receive {
        channel: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("connection for channel '{channel}' was lost")]
    ConnectionLost { channel: String },
    #[error("failed to resolve datagram address {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("no datagram addresses resolved for {host}:{port}")]
    ResolveEmpty { host: String, port: u16 },
    #[error("failed to bind datagram socket at {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("failed to configure datagram socket at {addr}: {source}")]
    Configure {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("failed to spawn listener thread: {source}")]
    Spawn {
        #[source]
        source: io::Error,
    },
    #[error("listener thread panicked")]
    ThreadPanic,
}
