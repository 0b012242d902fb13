//! Collaborator doubles for the coordinator, telemetry, and lifecycle host.

use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex};

use hotwire_config::Config;

use crate::coordinator::{PendingTask, TaskCoordinator, TaskError, TaskExecutor};
use crate::dispatch::{DispatchOutcome, Dispatcher, MethodRegistry};
use crate::methods::{SqlLogSwitch, register_builtin_methods};
use crate::process::launch::ExecutorFactory;
use crate::process::{LaunchError, ShutdownError, ShutdownSignal};
use crate::telemetry::TelemetryError;

use super::WAIT_TIMEOUT;

/// Executor that reports each task and blocks until released.
pub struct GatedExecutor {
    started: Mutex<Sender<PendingTask>>,
    release: Mutex<Receiver<()>>,
}

impl GatedExecutor {
    /// Builds an executor plus the channels observing and releasing it.
    pub fn new() -> (Arc<Self>, Receiver<PendingTask>, Sender<()>) {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let executor = Arc::new(Self {
            started: Mutex::new(started_tx),
            release: Mutex::new(release_rx),
        });
        (executor, started_rx, release_tx)
    }
}

impl TaskExecutor for GatedExecutor {
    fn execute(&self, task: &PendingTask) -> Result<(), TaskError> {
        let _ = self
            .started
            .lock()
            .expect("started lock poisoned")
            .send(task.clone());
        let _ = self
            .release
            .lock()
            .expect("release lock poisoned")
            .recv_timeout(WAIT_TIMEOUT);
        Ok(())
    }
}

/// SQL log switch that records every state change.
#[derive(Debug, Default)]
pub struct RecordingSwitch {
    enabled: AtomicBool,
    changes: Mutex<Vec<bool>>,
}

impl RecordingSwitch {
    /// Requested states, in order.
    pub fn changes(&self) -> Vec<bool> {
        self.changes.lock().expect("changes lock poisoned").clone()
    }
}

impl SqlLogSwitch for RecordingSwitch {
    fn sql_logging_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn set_sql_logging(&self, enabled: bool) -> Result<(), TelemetryError> {
        self.enabled.store(enabled, Ordering::SeqCst);
        self.changes
            .lock()
            .expect("changes lock poisoned")
            .push(enabled);
        Ok(())
    }
}

/// Dispatcher over the built-in methods.
pub fn builtin_dispatcher(
    coordinator: &Arc<TaskCoordinator>,
    switch: &Arc<RecordingSwitch>,
) -> Dispatcher {
    let mut registry = MethodRegistry::new();
    register_builtin_methods(
        &mut registry,
        Arc::clone(coordinator),
        Arc::clone(switch) as Arc<dyn SqlLogSwitch>,
    );
    Dispatcher::new(Arc::new(registry))
}

/// Step-friendly label for a dispatch outcome.
pub fn outcome_label(outcome: &DispatchOutcome) -> String {
    match outcome {
        DispatchOutcome::Invoked => String::from("invoked"),
        DispatchOutcome::Rejected(failure) => format!("rejected as {}", failure.kind()),
        DispatchOutcome::UnknownMethod => String::from("unknown method"),
        DispatchOutcome::InvalidParams => String::from("invalid params"),
        DispatchOutcome::HandlerFailed => String::from("handler failed"),
    }
}

/// Hands out a fixed executor regardless of configuration.
#[derive(Clone)]
pub struct StaticExecutorFactory {
    executor: Arc<dyn TaskExecutor>,
}

impl StaticExecutorFactory {
    pub fn new(executor: Arc<dyn TaskExecutor>) -> Self {
        Self { executor }
    }
}

impl ExecutorFactory for StaticExecutorFactory {
    fn build(&self, _config: &Config) -> Result<Arc<dyn TaskExecutor>, LaunchError> {
        Ok(Arc::clone(&self.executor))
    }
}

/// Shutdown hook released explicitly by the test.
#[derive(Clone)]
pub struct TestShutdownSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl TestShutdownSignal {
    pub fn new() -> Self {
        Self {
            inner: Arc::new((Mutex::new(false), Condvar::new())),
        }
    }

    pub fn trigger(&self) {
        let (lock, cvar) = &*self.inner;
        let mut triggered = lock.lock().expect("shutdown mutex poisoned");
        *triggered = true;
        cvar.notify_all();
    }
}

impl ShutdownSignal for TestShutdownSignal {
    fn wait(&self) -> Result<(), ShutdownError> {
        let (lock, cvar) = &*self.inner;
        let mut triggered = lock.lock().expect("shutdown mutex poisoned");
        while !*triggered {
            triggered = cvar
                .wait(triggered)
                .expect("shutdown mutex poisoned during wait");
        }
        Ok(())
    }
}

/// Reserves a loopback UDP port that is free at the time of the call.
pub fn free_udp_port() -> u16 {
    let socket = UdpSocket::bind("127.0.0.1:0").expect("bind probe socket");
    socket.local_addr().expect("probe address").port()
}
