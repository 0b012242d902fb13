//! Test suites for the control daemon.

mod coordinator_behaviour;
mod support;
