//! Defines the unified error surface for daemon launch and supervision.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::coordinator::{RunnerError, WorkerError};
use crate::transport::ListenerError;

use super::shutdown::ShutdownError;

/// Errors surfaced while launching or supervising the daemon process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Bootstrapping the daemon failed.
    #[error("daemon bootstrap failed: {source}")]
    Bootstrap {
        /// Underlying bootstrap error.
        #[source]
        source: BootstrapError,
    },
    /// No test runner command was configured.
    #[error("no test runner configured; set runner_command or HOTWIRE_RUNNER_COMMAND")]
    MissingRunner,
    /// The configured test runner could not be used.
    #[error("invalid test runner: {source}")]
    Runner {
        /// Underlying runner error.
        #[source]
        source: RunnerError,
    },
    /// The task worker failed to start or panicked.
    #[error("task worker failed: {source}")]
    Worker {
        /// Underlying worker error.
        #[source]
        source: WorkerError,
    },
    /// The listener failed to start or panicked.
    #[error("listener failed: {source}")]
    Listener {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
    /// Waiting for shutdown failed.
    #[error("failed to await shutdown signal: {source}")]
    Shutdown {
        /// Underlying shutdown error.
        #[source]
        source: ShutdownError,
    },
    /// The shutdown supervisor thread could not be spawned.
    #[error("failed to spawn shutdown supervisor: {source}")]
    ShutdownSupervisor {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The listener and worker did not stop within the shutdown budget.
    #[error("background threads did not stop within {timeout:?}")]
    ShutdownTimeout {
        /// Budget that elapsed.
        timeout: Duration,
    },
}

impl From<BootstrapError> for LaunchError {
    fn from(source: BootstrapError) -> Self {
        Self::Bootstrap { source }
    }
}

impl From<RunnerError> for LaunchError {
    fn from(source: RunnerError) -> Self {
        Self::Runner { source }
    }
}

impl From<WorkerError> for LaunchError {
    fn from(source: WorkerError) -> Self {
        Self::Worker { source }
    }
}

impl From<ListenerError> for LaunchError {
    fn from(source: ListenerError) -> Self {
        Self::Listener { source }
    }
}

impl From<ShutdownError> for LaunchError {
    fn from(source: ShutdownError) -> Self {
        Self::Shutdown { source }
    }
}
