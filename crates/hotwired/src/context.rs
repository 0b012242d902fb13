//! Shared control state built once at startup.

use std::sync::Arc;

use crate::coordinator::TaskCoordinator;
use crate::dispatch::{Dispatcher, MethodRegistry};
use crate::process::StopSignal;

/// Method registry, task coordinator, and stop signal handed to every
/// long-lived component.
///
/// The registry is frozen when the context is built; lookups afterwards need
/// no locking.
#[derive(Debug, Clone)]
pub struct ControlContext {
    registry: Arc<MethodRegistry>,
    coordinator: Arc<TaskCoordinator>,
    stop: StopSignal,
}

impl ControlContext {
    /// Freezes `registry` and bundles it with the coordinator and stop signal.
    #[must_use]
    pub fn new(
        registry: MethodRegistry,
        coordinator: Arc<TaskCoordinator>,
        stop: StopSignal,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            coordinator,
            stop,
        }
    }

    /// Dispatcher over the frozen registry.
    #[must_use]
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(Arc::clone(&self.registry))
    }

    /// Shared task coordinator.
    #[must_use]
    pub fn coordinator(&self) -> Arc<TaskCoordinator> {
        Arc::clone(&self.coordinator)
    }

    /// Process-wide stop signal.
    #[must_use]
    pub fn stop(&self) -> &StopSignal {
        &self.stop
    }

    /// Registered method names, sorted.
    #[must_use]
    pub fn methods(&self) -> Vec<&str> {
        self.registry.names()
    }
}
