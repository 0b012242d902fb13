//! Single-flight task slot and the worker that drains it.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::dispatch::describe_panic;
use crate::process::StopSignal;

use super::COORDINATOR_TARGET;
use super::errors::{TaskError, WorkerError};

/// Shortest pause between stop-signal checks of an idle worker.
const MIN_TRIGGER_WAIT: Duration = Duration::from_millis(10);

/// Parameters of a requested test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTask {
    /// Module under test.
    pub module: String,
    /// Test tag expression selecting the tests to run.
    pub test_tags: String,
}

impl PendingTask {
    /// Builds a task for `module` filtered by `test_tags`.
    #[must_use]
    pub fn new(module: impl Into<String>, test_tags: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            test_tags: test_tags.into(),
        }
    }
}

/// Result of a trigger request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The task was recorded and the worker signalled.
    Accepted,
    /// A task was already pending or running; the request was dropped.
    Busy,
}

/// Observable state of the coordinator slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// No task is pending or running.
    Idle,
    /// A task was accepted and awaits the worker.
    Pending,
    /// The worker is executing a task.
    Running,
}

/// Executes one accepted task to completion.
pub trait TaskExecutor: Send + Sync {
    /// Runs `task`; errors are logged by the worker and never stop it.
    fn execute(&self, task: &PendingTask) -> Result<(), TaskError>;
}

#[derive(Debug, Default)]
struct Slot {
    task: Option<PendingTask>,
    running: bool,
}

/// Owner of the single pending-task slot.
///
/// Triggers are non-blocking check-and-set operations under the slot mutex,
/// so concurrent triggers can never both observe an idle slot.
#[derive(Debug)]
pub struct TaskCoordinator {
    slot: Mutex<Slot>,
    wake: Condvar,
    trigger_wait: Duration,
    stop: StopSignal,
}

impl TaskCoordinator {
    /// Builds a coordinator whose worker observes `stop`.
    ///
    /// The worker waits at most `trigger_wait`, but never less than 10 ms,
    /// between checks of the stop signal and is woken
    /// immediately when the signal is raised.
    #[must_use]
    pub fn new(trigger_wait: Duration, stop: StopSignal) -> Arc<Self> {
        let coordinator = Arc::new(Self {
            slot: Mutex::new(Slot::default()),
            wake: Condvar::new(),
            trigger_wait: trigger_wait.max(MIN_TRIGGER_WAIT),
            stop: stop.clone(),
        });
        let weak: Weak<Self> = Arc::downgrade(&coordinator);
        stop.on_stop(move || {
            if let Some(coordinator) = weak.upgrade() {
                coordinator.wake_all();
            }
        });
        coordinator
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wake_all(&self) {
        let _slot = self.lock();
        self.wake.notify_all();
    }

    /// Requests a run of `task` without blocking.
    ///
    /// The request is dropped with a warning while another task is pending
    /// or running.
    pub fn trigger(&self, task: PendingTask) -> TriggerOutcome {
        let mut slot = self.lock();
        if let Some(current) = slot.task.as_ref() {
            warn!(
                target: COORDINATOR_TARGET,
                module = %task.module,
                test_tags = %task.test_tags,
                current_module = %current.module,
                running = slot.running,
                "test run already in progress; ignoring request"
            );
            return TriggerOutcome::Busy;
        }
        info!(
            target: COORDINATOR_TARGET,
            module = %task.module,
            test_tags = %task.test_tags,
            "test run requested"
        );
        slot.task = Some(task);
        drop(slot);
        self.wake.notify_one();
        TriggerOutcome::Accepted
    }

    /// Task currently pending or running.
    #[must_use]
    pub fn current(&self) -> Option<PendingTask> {
        self.lock().task.clone()
    }

    /// Current slot state.
    #[must_use]
    pub fn state(&self) -> CoordinatorState {
        let slot = self.lock();
        match (&slot.task, slot.running) {
            (None, _) => CoordinatorState::Idle,
            (Some(_), false) => CoordinatorState::Pending,
            (Some(_), true) => CoordinatorState::Running,
        }
    }

    /// Runs the worker loop on the calling thread until the stop signal is
    /// raised.
    pub fn run_worker(&self, executor: &dyn TaskExecutor) {
        info!(target: COORDINATOR_TARGET, "task worker started");
        while !self.stop.is_stopped() {
            let Some(task) = self.next_task() else {
                continue;
            };
            self.execute(executor, &task);
            self.finish();
        }
        info!(target: COORDINATOR_TARGET, "task worker stopped");
    }

    fn next_task(&self) -> Option<PendingTask> {
        let slot = self.lock();
        let (mut slot, _) = self
            .wake
            .wait_timeout_while(slot, self.trigger_wait, |slot| {
                slot.task.is_none() && !self.stop.is_stopped()
            })
            .unwrap_or_else(PoisonError::into_inner);
        if self.stop.is_stopped() {
            if let Some(task) = slot.task.take() {
                debug!(
                    target: COORDINATOR_TARGET,
                    module = %task.module,
                    "discarding pending test run during shutdown"
                );
            }
            return None;
        }
        let task = slot.task.clone()?;
        slot.running = true;
        Some(task)
    }

    fn execute(&self, executor: &dyn TaskExecutor, task: &PendingTask) {
        info!(
            target: COORDINATOR_TARGET,
            module = %task.module,
            test_tags = %task.test_tags,
            "starting test run"
        );
        let started = Instant::now();
        let elapsed_ms = || u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match panic::catch_unwind(AssertUnwindSafe(|| executor.execute(task))) {
            Ok(Ok(())) => info!(
                target: COORDINATOR_TARGET,
                module = %task.module,
                test_tags = %task.test_tags,
                elapsed_ms = elapsed_ms(),
                "test run completed"
            ),
            Ok(Err(failure)) => error!(
                target: COORDINATOR_TARGET,
                module = %task.module,
                test_tags = %task.test_tags,
                elapsed_ms = elapsed_ms(),
                error = %failure,
                "test run failed"
            ),
            Err(panic) => error!(
                target: COORDINATOR_TARGET,
                module = %task.module,
                test_tags = %task.test_tags,
                panic = %describe_panic(panic.as_ref()),
                "test run panicked"
            ),
        }
    }

    fn finish(&self) {
        let mut slot = self.lock();
        slot.task = None;
        slot.running = false;
    }
}

/// Starts the worker loop on a dedicated thread.
///
/// # Errors
///
/// Returns [`WorkerError::Spawn`] when the thread cannot be created.
pub fn spawn_worker(
    coordinator: Arc<TaskCoordinator>,
    executor: Arc<dyn TaskExecutor>,
) -> Result<WorkerHandle, WorkerError> {
    let handle = thread::Builder::new()
        .name(String::from("hotwire-task-worker"))
        .spawn(move || coordinator.run_worker(executor.as_ref()))
        .map_err(|source| WorkerError::Spawn { source })?;
    Ok(WorkerHandle {
        handle: Some(handle),
    })
}

/// Handle to the background worker thread.
#[derive(Debug)]
pub struct WorkerHandle {
    handle: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    /// Waits for the worker to exit after the stop signal is raised.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::ThreadPanic`] when the worker panicked.
    pub fn join(mut self) -> Result<(), WorkerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| WorkerError::ThreadPanic),
            None => Ok(()),
        }
    }
}
