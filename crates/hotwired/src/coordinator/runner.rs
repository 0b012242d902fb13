//! Test-run execution against the external runner collaborators.

use std::fmt;

use hotwire_config::Config;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::COORDINATOR_TARGET;
use super::errors::{RunnerError, TaskError};
use super::worker::{PendingTask, TaskExecutor};

/// Pattern naming the cached test modules invalidated before each run.
pub const TEST_MODULE_CONVENTION: &str = r"^odoo\.addons\.\w+\.tests";

/// State of a module after [`TestRunner::ensure_module`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleState {
    /// The module was already loaded.
    Loaded,
    /// The module was installed by this call.
    Installed,
    /// The module could not be installed.
    Unavailable,
}

/// Phase of a test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestPhase {
    /// Tests that run while the module is being installed.
    AtInstall,
    /// Tests that run once every module is installed.
    PostInstall,
}

impl TestPhase {
    /// Phases in execution order.
    pub const ALL: [Self; 2] = [Self::AtInstall, Self::PostInstall];

    /// Label used in logs and runner requests.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AtInstall => "at_install",
            Self::PostInstall => "post_install",
        }
    }
}

impl fmt::Display for TestPhase {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Suite built by the runner for one module and phase.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TestSuite {
    /// Module under test.
    pub module: String,
    /// Phase the suite belongs to.
    pub phase: TestPhase,
    /// Tag expression used to select the tests.
    pub test_tags: String,
    /// Number of test cases selected.
    pub test_count: usize,
}

impl TestSuite {
    /// Returns `true` when no tests were selected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.test_count == 0
    }
}

/// Counts reported after running a suite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SuiteReport {
    /// Tests executed.
    pub tests_run: usize,
    /// Tests that failed an assertion.
    pub failures: usize,
    /// Tests that raised an unexpected error.
    pub errors: usize,
}

/// Host application hooks used to execute a test run.
pub trait TestRunner: Send + Sync {
    /// Loads `module` in `database`, installing it when absent.
    fn ensure_module(&self, database: &str, module: &str) -> Result<ModuleState, RunnerError>;

    /// Drops cached test definitions whose module path matches `convention`,
    /// returning how many were dropped.
    fn invalidate_test_definitions(&self, convention: &str) -> Result<usize, RunnerError>;

    /// Collects the tests of `module` selected by `test_tags` for `phase`.
    fn build_suite(
        &self,
        database: &str,
        module: &str,
        test_tags: &str,
        phase: TestPhase,
    ) -> Result<TestSuite, RunnerError>;

    /// Runs a suite previously returned by [`TestRunner::build_suite`].
    fn run_suite(&self, database: &str, suite: &TestSuite) -> Result<SuiteReport, RunnerError>;
}

/// Supplies the database that test runs are scoped to.
pub trait IdentityProvider: Send + Sync {
    /// Active database name, if one is configured.
    fn database_name(&self) -> Option<String>;
}

/// Identity provider backed by the resolved configuration.
///
/// A comma separated `database_name` resolves to its first entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfiguredIdentity {
    database_name: Option<String>,
}

impl ConfiguredIdentity {
    /// Builds a provider from the resolved configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.database_name())
    }

    /// Builds a provider from a raw database setting.
    #[must_use]
    pub fn new(database_name: Option<&str>) -> Self {
        let database_name = database_name
            .and_then(|names| names.split(',').map(str::trim).find(|name| !name.is_empty()))
            .map(str::to_owned);
        Self { database_name }
    }
}

impl IdentityProvider for ConfiguredIdentity {
    fn database_name(&self) -> Option<String> {
        self.database_name.clone()
    }
}

/// Task executor that runs a module's test phases through a [`TestRunner`].
pub struct TestTask<R, I> {
    runner: R,
    identity: I,
}

impl<R, I> TestTask<R, I>
where
    R: TestRunner,
    I: IdentityProvider,
{
    /// Builds a task executor from its collaborators.
    pub fn new(runner: R, identity: I) -> Self {
        Self { runner, identity }
    }

    fn run_phase(
        &self,
        database: &str,
        task: &PendingTask,
        phase: TestPhase,
    ) -> Result<usize, TaskError> {
        info!(
            target: COORDINATOR_TARGET,
            module = %task.module,
            phase = %phase,
            "running tests"
        );
        let suite = self
            .runner
            .build_suite(database, &task.module, &task.test_tags, phase)?;
        if suite.is_empty() {
            debug!(
                target: COORDINATOR_TARGET,
                module = %task.module,
                phase = %phase,
                "no tests selected for phase"
            );
            return Ok(0);
        }
        let report = self.runner.run_suite(database, &suite)?;
        info!(
            target: COORDINATOR_TARGET,
            module = %task.module,
            phase = %phase,
            tests_run = report.tests_run,
            failures = report.failures,
            errors = report.errors,
            "tests completed"
        );
        Ok(suite.test_count)
    }
}

impl<R, I> TaskExecutor for TestTask<R, I>
where
    R: TestRunner,
    I: IdentityProvider,
{
    fn execute(&self, task: &PendingTask) -> Result<(), TaskError> {
        let database = self
            .identity
            .database_name()
            .ok_or(TaskError::MissingDatabase)?;

        match self.runner.ensure_module(&database, &task.module)? {
            ModuleState::Loaded => {}
            ModuleState::Installed => info!(
                target: COORDINATOR_TARGET,
                module = %task.module,
                database = %database,
                "module was not loaded and has been installed"
            ),
            ModuleState::Unavailable => {
                error!(
                    target: COORDINATOR_TARGET,
                    module = %task.module,
                    database = %database,
                    "module cannot be installed; skipping tests"
                );
                return Ok(());
            }
        }

        let invalidated = self
            .runner
            .invalidate_test_definitions(TEST_MODULE_CONVENTION)?;
        debug!(
            target: COORDINATOR_TARGET,
            invalidated,
            "invalidated cached test definitions"
        );

        let mut selected = 0;
        for phase in TestPhase::ALL {
            selected += self.run_phase(&database, task, phase)?;
        }
        if selected == 0 {
            warn!(
                target: COORDINATOR_TARGET,
                module = %task.module,
                test_tags = %task.test_tags,
                "no tests to run"
            );
        }
        Ok(())
    }
}
