//! Control daemon for in-process test runs of the host application.
//!
//! `hotwired` listens for JSON-RPC 2.0 notifications on one transport, a
//! Postgres `LISTEN` channel or a UDP socket, and dispatches them to the
//! registered control methods. `run_test` hands a module's tests to a
//! single-flight coordinator that runs at most one test task at a time and
//! drops requests that arrive while busy. `log_sql` raises or restores the
//! verbosity of database logging at runtime.
//!
//! Every payload is handled fire-and-forget: malformed or unroutable
//! notifications are logged and dropped, handler failures are absorbed, and
//! transport failures are retried after a fixed backoff. The only fatal
//! conditions are start-up misconfiguration, such as running with more than
//! one worker process.
//!
//! Long-lived loops observe a process-wide [`StopSignal`] within a bounded
//! wait and release their connections and sockets when it is raised.

mod bootstrap;
mod context;
pub mod coordinator;
pub mod dispatch;
mod health;
pub mod methods;
mod process;
mod telemetry;
pub mod transport;

pub use bootstrap::{
    BootstrapError, Bootstrapped, ConfigLoader, StaticConfigLoader, SystemConfigLoader,
    bootstrap_with,
};
pub use context::ControlContext;
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{
    LaunchError, ShutdownError, ShutdownSignal, StopSignal, SystemShutdownSignal, run_daemon,
};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
