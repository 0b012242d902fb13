//! Routes raw payloads to registered handlers.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use hotwire_protocol::{ParseFailure, RequestEnvelope, excerpt};
use tracing::{error, info};

use super::DISPATCH_TARGET;
use super::errors::{DispatchError, HandlerError};
use super::registry::MethodRegistry;

/// Result of dispatching one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler ran to completion.
    Invoked,
    /// The payload was not a supported envelope.
    Rejected(ParseFailure),
    /// No handler is registered under the method name.
    UnknownMethod,
    /// The params did not fit the handler's calling convention.
    InvalidParams,
    /// The handler returned an error or panicked.
    HandlerFailed,
}

impl From<&DispatchError> for DispatchOutcome {
    fn from(error: &DispatchError) -> Self {
        match error {
            DispatchError::Parse { source } => Self::Rejected(source.clone()),
            DispatchError::UnknownMethod { .. } => Self::UnknownMethod,
            DispatchError::InvalidParams { .. }
            | DispatchError::Handler {
                source: HandlerError::InvalidArgument { .. },
                ..
            } => Self::InvalidParams,
            DispatchError::Handler { .. } | DispatchError::Panicked { .. } => Self::HandlerFailed,
        }
    }
}

/// Parses payloads and invokes the matching handler on the caller's thread.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<MethodRegistry>,
}

impl Dispatcher {
    /// Builds a dispatcher over a frozen registry.
    #[must_use]
    pub fn new(registry: Arc<MethodRegistry>) -> Self {
        Self { registry }
    }

    /// Registry consulted for lookups.
    #[must_use]
    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// Dispatches one payload.
    ///
    /// Never fails: every rejection is logged at error level with a safe
    /// excerpt of the payload and reported through the returned outcome.
    pub fn dispatch(&self, payload: &[u8]) -> DispatchOutcome {
        match self.route(payload) {
            Ok(()) => DispatchOutcome::Invoked,
            Err(failure) => {
                error!(
                    target: DISPATCH_TARGET,
                    kind = failure.kind(),
                    method = failure.method().unwrap_or_default(),
                    payload = %excerpt(payload),
                    error = %failure,
                    "dropping notification"
                );
                DispatchOutcome::from(&failure)
            }
        }
    }

    fn route(&self, payload: &[u8]) -> Result<(), DispatchError> {
        let envelope =
            RequestEnvelope::parse(payload).map_err(|source| DispatchError::Parse { source })?;
        let (method, params) = envelope.into_parts();
        let Some(handler) = self.registry.lookup(&method) else {
            return Err(DispatchError::UnknownMethod { method });
        };
        let arguments = match handler.arity().bind(params) {
            Ok(arguments) => arguments,
            Err(source) => return Err(DispatchError::InvalidParams { method, source }),
        };

        info!(
            target: DISPATCH_TARGET,
            method = %method,
            binding = ?arguments.binding(),
            "received notification"
        );
        match panic::catch_unwind(AssertUnwindSafe(|| handler.invoke(arguments))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(DispatchError::Handler { method, source }),
            Err(panic) => Err(DispatchError::Panicked {
                method,
                message: describe_panic(panic.as_ref()),
            }),
        }
    }
}

/// Renders a caught panic payload as text.
pub(crate) fn describe_panic(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("non-string panic payload")
    }
}
