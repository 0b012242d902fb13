//! Single-flight coordinator for background test runs.
//!
//! Listener threads hand `run_test` requests to the [`TaskCoordinator`],
//! which keeps at most one task pending or running and drops any request
//! that arrives while busy. A dedicated worker thread drains the slot and
//! runs the task through a [`TaskExecutor`], normally a [`TestTask`] driving
//! the host's [`TestRunner`].

mod command_runner;
mod errors;
mod runner;
mod worker;

pub use self::command_runner::CommandTestRunner;
pub use self::errors::{RunnerError, TaskError, WorkerError};
pub use self::runner::{
    ConfiguredIdentity, IdentityProvider, ModuleState, SuiteReport, TEST_MODULE_CONVENTION,
    TestPhase, TestRunner, TestSuite, TestTask,
};
pub use self::worker::{
    CoordinatorState, PendingTask, TaskCoordinator, TaskExecutor, TriggerOutcome, WorkerHandle,
    spawn_worker,
};

const COORDINATOR_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::coordinator");
