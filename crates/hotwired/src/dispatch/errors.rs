//! Error types for method binding and dispatch.

use hotwire_protocol::ParseFailure;
use thiserror::Error;

/// Errors reported by a registered handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// An argument was present but had the wrong JSON type.
    #[error("argument '{name}' must be {expected}")]
    InvalidArgument {
        /// Declared argument name.
        name: String,
        /// Human readable description of the expected type.
        expected: &'static str,
    },
    /// The handler could not complete its work.
    #[error("{message}")]
    Failed {
        /// Description of the failure.
        message: String,
    },
}

impl HandlerError {
    /// Builds a [`HandlerError::Failed`] from any displayable value.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Mismatch between the received params and a handler's calling convention.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArityError {
    /// The params shape is not accepted by the handler at all.
    #[error("{convention} parameters are not accepted")]
    UnsupportedConvention {
        /// Shape that was received (`named` or `positional`).
        convention: &'static str,
    },
    /// Params were absent although the handler declares arguments.
    #[error("expected {expected} parameters, none were supplied")]
    MissingParams {
        /// Number of declared arguments.
        expected: usize,
    },
    /// Positional params did not match the declared count.
    #[error("expected {expected} positional parameters, found {found}")]
    PositionalCount {
        /// Number of declared arguments.
        expected: usize,
        /// Number of supplied values.
        found: usize,
    },
    /// A declared named argument was missing.
    #[error("missing named parameter '{name}'")]
    MissingNamed {
        /// Declared argument name.
        name: &'static str,
    },
    /// A named argument was supplied that the handler does not declare.
    #[error("unexpected named parameter '{name}'")]
    UnexpectedNamed {
        /// Supplied key.
        name: String,
    },
}

/// Reasons a payload was dropped by the dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The payload did not parse as a supported envelope.
    #[error("rejected payload: {source}")]
    Parse {
        /// Underlying parser failure.
        #[source]
        source: ParseFailure,
    },
    /// No handler is registered under the method name.
    #[error("method '{method}' is not registered")]
    UnknownMethod {
        /// Requested method.
        method: String,
    },
    /// The params did not fit the handler's calling convention.
    #[error("invalid params for '{method}': {source}")]
    InvalidParams {
        /// Requested method.
        method: String,
        /// Shape mismatch.
        #[source]
        source: ArityError,
    },
    /// The handler returned an error.
    #[error("handler '{method}' failed: {source}")]
    Handler {
        /// Invoked method.
        method: String,
        /// Error returned by the handler.
        #[source]
        source: HandlerError,
    },
    /// The handler panicked.
    #[error("handler '{method}' panicked: {message}")]
    Panicked {
        /// Invoked method.
        method: String,
        /// Panic payload rendered as text.
        message: String,
    },
}

impl DispatchError {
    /// Stable label used as the `kind` field in structured logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse { source } => source.kind(),
            Self::UnknownMethod { .. } => "unknown_method",
            Self::InvalidParams { .. } => "invalid_params",
            Self::Handler {
                source: HandlerError::InvalidArgument { .. },
                ..
            } => "invalid_argument",
            Self::Handler { .. } => "handler_failed",
            Self::Panicked { .. } => "handler_panicked",
        }
    }

    /// Method named by the payload, when parsing got that far.
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        match self {
            Self::Parse { .. } => None,
            Self::UnknownMethod { method }
            | Self::InvalidParams { method, .. }
            | Self::Handler { method, .. }
            | Self::Panicked { method, .. } => Some(method),
        }
    }
}
