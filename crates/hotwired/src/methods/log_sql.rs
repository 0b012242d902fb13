use std::sync::Arc;

use hotwire_protocol::LOG_SQL_METHOD;
use tracing::{debug, info};

use crate::dispatch::{Arity, HandlerError, MethodRegistry};
use crate::telemetry::TelemetryError;

use super::METHODS_TARGET;

/// Calling convention of `log_sql`.
pub const LOG_SQL_ARITY: Arity = Arity::Flexible(&["enabled"]);

/// Runtime switch for verbose SQL logging.
pub trait SqlLogSwitch: Send + Sync {
    /// Returns `true` while verbose SQL logging is active.
    fn sql_logging_enabled(&self) -> bool;

    /// Enables or disables verbose SQL logging.
    fn set_sql_logging(&self, enabled: bool) -> Result<(), TelemetryError>;
}

pub(super) fn register(registry: &mut MethodRegistry, switch: Arc<dyn SqlLogSwitch>) {
    registry.register_fn(LOG_SQL_METHOD, LOG_SQL_ARITY, move |arguments| {
        let enabled = arguments.boolean("enabled")?;
        if switch.sql_logging_enabled() == enabled {
            debug!(
                target: METHODS_TARGET,
                enabled,
                "SQL logging already in requested state"
            );
            return Ok(());
        }
        switch
            .set_sql_logging(enabled)
            .map_err(|error| HandlerError::failed(error.to_string()))?;
        info!(target: METHODS_TARGET, enabled, "SQL logging toggled");
        Ok(())
    });
}
