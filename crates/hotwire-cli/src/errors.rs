//! Error types for the sender CLI.

use std::io;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to serialise notification: {0}")]
    SerialiseNotification(serde_json::Error),
    #[error("failed to start async runtime: {0}")]
    Runtime(io::Error),
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("failed to notify channel '{channel}': {source}")]
    Notify {
        channel: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("failed to open a datagram socket: {0}")]
    Socket(io::Error),
    #[error("failed to send datagram to {endpoint}: {source}")]
    Send {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write output: {0}")]
    WriteOutput(io::Error),
}
