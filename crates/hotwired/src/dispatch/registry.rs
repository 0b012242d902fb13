//! Registry mapping method names to handlers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::DISPATCH_TARGET;
use super::arguments::{Arguments, Arity};
use super::errors::HandlerError;

/// A locally registered method.
pub trait MethodHandler: Send + Sync {
    /// Calling convention used to bind received params.
    fn arity(&self) -> Arity;

    /// Runs the method with bound arguments.
    fn invoke(&self, arguments: Arguments) -> Result<(), HandlerError>;
}

struct FnHandler<F> {
    arity: Arity,
    function: F,
}

impl<F> MethodHandler for FnHandler<F>
where
    F: Fn(Arguments) -> Result<(), HandlerError> + Send + Sync,
{
    fn arity(&self) -> Arity {
        self.arity
    }

    fn invoke(&self, arguments: Arguments) -> Result<(), HandlerError> {
        (self.function)(arguments)
    }
}

/// Method name to handler mapping, populated during startup.
///
/// Once populated, the registry is frozen into an `Arc` and only read.
#[derive(Default)]
pub struct MethodRegistry {
    methods: HashMap<String, Arc<dyn MethodHandler>>,
}

impl MethodRegistry {
    /// Builds an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `name`, replacing any previous handler.
    ///
    /// Returns the replaced handler, if any.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: Arc<dyn MethodHandler>,
    ) -> Option<Arc<dyn MethodHandler>> {
        let name = name.into();
        debug!(
            target: DISPATCH_TARGET,
            method = %name,
            arity = ?handler.arity(),
            "registering method"
        );
        let previous = self.methods.insert(name.clone(), handler);
        if previous.is_some() {
            warn!(
                target: DISPATCH_TARGET,
                method = %name,
                "method registered twice; keeping the latest handler"
            );
        }
        previous
    }

    /// Registers a closure under `name`.
    pub fn register_fn<F>(
        &mut self,
        name: impl Into<String>,
        arity: Arity,
        function: F,
    ) -> Option<Arc<dyn MethodHandler>>
    where
        F: Fn(Arguments) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.register(name, Arc::new(FnHandler { arity, function }))
    }

    /// Looks up the handler registered under `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn MethodHandler>> {
        self.methods.get(name).cloned()
    }

    /// Returns `true` when a handler is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Number of registered methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Registered method names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for MethodRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("MethodRegistry")
            .field("methods", &self.names())
            .finish()
    }
}
