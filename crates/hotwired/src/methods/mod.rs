//! Built-in control methods.
//!
//! `run_test` hands a test run to the task coordinator and `log_sql`
//! toggles verbose logging of database traffic.

mod log_sql;
mod run_test;

use std::sync::Arc;

use crate::coordinator::TaskCoordinator;
use crate::dispatch::MethodRegistry;

pub use self::log_sql::{LOG_SQL_ARITY, SqlLogSwitch};
pub use self::run_test::RUN_TEST_ARITY;

const METHODS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::methods");

/// Registers `run_test` and `log_sql` in `registry`.
pub fn register_builtin_methods(
    registry: &mut MethodRegistry,
    coordinator: Arc<TaskCoordinator>,
    switch: Arc<dyn SqlLogSwitch>,
) {
    run_test::register(registry, coordinator);
    log_sql::register(registry, switch);
}
