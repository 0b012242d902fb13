//! Configuration loading and telemetry start-up.

use std::sync::Arc;

use hotwire_config::Config;
use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use crate::health::HealthReporter;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Abstraction over configuration loading to enable testing.
pub trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that hands out a pre-resolved configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry could not be initialised.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The host runs more than one worker process.
    #[error(
        "hotwired requires a single worker process but {workers} are configured; \
         concurrent test runs cannot be coordinated across processes"
    )]
    MultipleWorkers {
        /// Configured worker count.
        workers: u32,
    },
}

/// Outcome of a successful bootstrap.
#[derive(Debug)]
pub struct Bootstrapped {
    /// Resolved configuration.
    pub config: Config,
    /// Handle to the installed telemetry subscriber.
    pub telemetry: TelemetryHandle,
}

/// Loads configuration, initialises telemetry, and validates the host.
///
/// # Errors
///
/// Returns a [`BootstrapError`] when configuration fails to load, telemetry
/// cannot be installed, or more than one worker process is configured.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: &dyn HealthReporter,
) -> Result<Bootstrapped, BootstrapError> {
    reporter.bootstrap_starting();
    let result = load_and_validate(loader);
    match &result {
        Ok(bootstrapped) => reporter.bootstrap_succeeded(&bootstrapped.config),
        Err(error) => reporter.bootstrap_failed(error),
    }
    result
}

fn load_and_validate(loader: &dyn ConfigLoader) -> Result<Bootstrapped, BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    let telemetry = telemetry::initialise(&config.log_settings())
        .map_err(|source| BootstrapError::Telemetry { source })?;
    let workers = config.workers();
    if workers > 1 {
        return Err(BootstrapError::MultipleWorkers { workers });
    }
    Ok(Bootstrapped { config, telemetry })
}
