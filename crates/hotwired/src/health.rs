//! Structured health reporting for daemon lifecycle events.

use std::sync::Arc;

use hotwire_config::{Config, ListenerEndpoint};

use crate::bootstrap::BootstrapError;

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked once the worker and listener threads are running.
    fn runtime_ready(&self, endpoint: &ListenerEndpoint);

    /// Invoked when shutdown begins.
    fn runtime_stopping(&self);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn runtime_ready(&self, endpoint: &ListenerEndpoint) {
        (**self).runtime_ready(endpoint);
    }

    fn runtime_stopping(&self) {
        (**self).runtime_stopping();
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: "hotwired::health",
            event = "bootstrap_starting",
            "starting daemon bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: "hotwired::health",
            event = "bootstrap_succeeded",
            listener = %config.listener().redacted(),
            database = config.database_name().unwrap_or_default(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "daemon bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: "hotwired::health",
            event = "bootstrap_failed",
            error = %error,
            "daemon bootstrap failed"
        );
    }

    fn runtime_ready(&self, endpoint: &ListenerEndpoint) {
        tracing::info!(
            target: "hotwired::health",
            event = "runtime_ready",
            transport = endpoint.transport(),
            listener = %endpoint.redacted(),
            "daemon ready"
        );
    }

    fn runtime_stopping(&self) {
        tracing::info!(
            target: "hotwired::health",
            event = "runtime_stopping",
            "daemon stopping"
        );
    }
}
