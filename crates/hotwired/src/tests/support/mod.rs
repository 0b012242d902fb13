//! Test harness utilities shared by the behavioural suites.

mod doubles;
mod reporter;

pub use doubles::{
    GatedExecutor, RecordingSwitch, StaticExecutorFactory, TestShutdownSignal, builtin_dispatcher,
    free_udp_port, outcome_label,
};
pub use reporter::{HealthEvent, RecordingHealthReporter};

use std::time::Duration;

/// Upper bound for any asynchronous expectation in the suites.
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5);
