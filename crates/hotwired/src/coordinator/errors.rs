//! Error types for the task coordinator and its collaborators.

use std::io;

use thiserror::Error;

/// Errors reported by the external test-runner collaborator.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The runner command line was empty.
    #[error("test runner command is empty")]
    EmptyCommand,
    /// Spawning the runner process failed.
    #[error("failed to spawn test runner '{program}': {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Exchanging the request with the runner failed.
    #[error("failed to exchange '{action}' with test runner: {source}")]
    Io {
        /// Request action.
        action: &'static str,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Serialising the request failed.
    #[error("failed to encode '{action}' request: {source}")]
    Encode {
        /// Request action.
        action: &'static str,
        /// Underlying serialisation error.
        #[source]
        source: serde_json::Error,
    },
    /// The runner printed nothing on stdout.
    #[error("test runner returned no response to '{action}'")]
    EmptyResponse {
        /// Request action.
        action: &'static str,
    },
    /// The runner response could not be decoded.
    #[error("invalid test runner response to '{action}': {source}")]
    Decode {
        /// Request action.
        action: &'static str,
        /// Underlying deserialisation error.
        #[source]
        source: serde_json::Error,
    },
    /// The runner exited unsuccessfully.
    #[error("test runner exited with {status} while handling '{action}': {stderr}")]
    Exit {
        /// Request action.
        action: &'static str,
        /// Rendered exit status.
        status: String,
        /// Captured standard error.
        stderr: String,
    },
    /// The runner reported a failure in its response.
    #[error("test runner reported an error for '{action}': {message}")]
    Reported {
        /// Request action.
        action: &'static str,
        /// Message supplied by the runner.
        message: String,
    },
}

/// Errors that end a single test run.
#[derive(Debug, Error)]
pub enum TaskError {
    /// No database is configured to scope the run.
    #[error("no database configured for test runs")]
    MissingDatabase,
    /// A collaborator call failed.
    #[error("test runner failed: {source}")]
    Runner {
        /// Underlying runner error.
        #[source]
        source: RunnerError,
    },
}

impl From<RunnerError> for TaskError {
    fn from(source: RunnerError) -> Self {
        Self::Runner { source }
    }
}

/// Errors surfaced while starting or joining the worker thread.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Spawning the worker thread failed.
    #[error("failed to spawn task worker thread: {source}")]
    Spawn {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The worker thread panicked.
    #[error("task worker thread panicked")]
    ThreadPanic,
}
