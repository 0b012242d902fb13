//! Structured telemetry initialisation for the daemon.
//!
//! The filter sits behind a reload layer so `log_sql` can raise or lower
//! the SQL target's verbosity at runtime without reinstalling the
//! subscriber.

use std::io::{self, IsTerminal};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hotwire_config::{LogFormat, LogSettings};
use once_cell::sync::OnceCell;
use tracing::Level;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

use crate::methods::SqlLogSwitch;

static TELEMETRY: OnceCell<TelemetryHandle> = OnceCell::new();

/// Handle returned when telemetry has been initialised.
///
/// Clones share the installed filter.
#[derive(Debug, Clone)]
pub struct TelemetryHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    settings: LogSettings,
    active: Arc<Mutex<String>>,
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
    /// Failed to swap the active filter.
    #[error("failed to reload log filter: {0}")]
    Reload(String),
}

/// Configures the global tracing subscriber when invoked for the first time.
///
/// Repeated calls are idempotent: the first invocation installs the global
/// subscriber and later invocations return a handle to it, ignoring their
/// settings.
pub fn initialise(settings: &LogSettings) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY
        .get_or_try_init(|| install_subscriber(settings))
        .cloned()
}

fn parse_filter(expression: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(expression).map_err(|error| TelemetryError::Filter(error.to_string()))
}

/// Returns `true` when `expression` lets `target` emit debug events.
///
/// Expressions using span or field directives fall outside the plain
/// `target=level` grammar and are reported as not verbose.
fn debug_enabled_for(expression: &str, target: &str) -> bool {
    expression
        .parse::<Targets>()
        .is_ok_and(|targets| targets.would_enable(target, &Level::DEBUG))
}

fn reloadable_filter(
    settings: &LogSettings,
) -> Result<(reload::Layer<EnvFilter, Registry>, TelemetryHandle), TelemetryError> {
    let (layer, filter) = reload::Layer::new(parse_filter(&settings.filter)?);
    let handle = TelemetryHandle {
        filter,
        settings: settings.clone(),
        active: Arc::new(Mutex::new(settings.filter.clone())),
    };
    Ok((layer, handle))
}

fn install_subscriber(settings: &LogSettings) -> Result<TelemetryHandle, TelemetryError> {
    let (filter_layer, handle) = reloadable_filter(settings)?;
    let registry = tracing_subscriber::registry().with(filter_layer);

    let layer = || {
        fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(true)
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .with_timer(UtcTime::rfc_3339())
    };

    let installed = match settings.format {
        LogFormat::Json => tracing::subscriber::set_global_default(
            registry.with(layer().json().flatten_event(true)),
        ),
        LogFormat::Compact => {
            tracing::subscriber::set_global_default(registry.with(layer().compact()))
        }
    };
    installed.map_err(TelemetryError::Subscriber)?;
    Ok(handle)
}

impl TelemetryHandle {
    fn active(&self) -> MutexGuard<'_, String> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SqlLogSwitch for TelemetryHandle {
    fn sql_logging_enabled(&self) -> bool {
        debug_enabled_for(&self.active(), &self.settings.sql_target)
    }

    fn set_sql_logging(&self, enabled: bool) -> Result<(), TelemetryError> {
        let expression = if enabled {
            self.settings.verbose_sql_filter()
        } else {
            self.settings.quiet_sql_filter()
        };
        let filter = parse_filter(&expression)?;
        let mut active = self.active();
        self.filter
            .reload(filter)
            .map_err(|error| TelemetryError::Reload(error.to_string()))?;
        *active = expression;
        Ok(())
    }
}
