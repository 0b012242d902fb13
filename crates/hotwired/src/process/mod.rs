//! Process lifecycle: stop signal, shutdown hooks, and launch sequencing.

use std::time::Duration;

mod errors;
pub(crate) mod launch;
pub(crate) mod shutdown;
mod stop;

pub use errors::LaunchError;
pub use launch::run_daemon;
pub use shutdown::{ShutdownError, ShutdownSignal, SystemShutdownSignal};
pub use stop::StopSignal;

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
pub(crate) const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);
