//! Behavioural tests for single-flight test runs driven by notifications.

use std::cell::RefCell;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::coordinator::{
    CoordinatorState, PendingTask, TaskCoordinator, TaskExecutor, WorkerHandle, spawn_worker,
};
use crate::dispatch::Dispatcher;
use crate::process::StopSignal;
use crate::tests::support::{GatedExecutor, RecordingSwitch, WAIT_TIMEOUT, builtin_dispatcher};
use crate::transport::wait_until;

struct CoordinatorWorld {
    stop: StopSignal,
    coordinator: Arc<TaskCoordinator>,
    dispatcher: Dispatcher,
    started: Receiver<PendingTask>,
    release: Sender<()>,
    executor: Arc<GatedExecutor>,
    worker: Option<WorkerHandle>,
    runs: usize,
}

impl CoordinatorWorld {
    fn new() -> Self {
        let stop = StopSignal::new();
        let coordinator = TaskCoordinator::new(Duration::from_millis(100), stop.clone());
        let switch = Arc::new(RecordingSwitch::default());
        let dispatcher = builtin_dispatcher(&coordinator, &switch);
        let (executor, started, release) = GatedExecutor::new();
        Self {
            stop,
            coordinator,
            dispatcher,
            started,
            release,
            executor,
            worker: None,
            runs: 0,
        }
    }
}

impl Drop for CoordinatorWorld {
    fn drop(&mut self) {
        self.stop.stop();
        let _ = self.release.send(());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[fixture]
fn world() -> RefCell<CoordinatorWorld> {
    RefCell::new(CoordinatorWorld::new())
}

#[given("an idle coordinator with a running worker")]
fn given_running_worker(world: &RefCell<CoordinatorWorld>) {
    let mut world = world.borrow_mut();
    let executor = Arc::clone(&world.executor) as Arc<dyn TaskExecutor>;
    let worker = spawn_worker(Arc::clone(&world.coordinator), executor).expect("spawn worker");
    world.worker = Some(worker);
    assert_eq!(world.coordinator.state(), CoordinatorState::Idle);
}

#[when("the notification '{payload}' arrives")]
fn when_payload_dispatched(world: &RefCell<CoordinatorWorld>, payload: String) {
    world.borrow().dispatcher.dispatch(payload.as_bytes());
}

#[then("the worker starts a run for \"{module}\" with tags \"{tags}\"")]
fn then_worker_starts(world: &RefCell<CoordinatorWorld>, module: String, tags: String) {
    let mut world = world.borrow_mut();
    let task = world
        .started
        .recv_timeout(WAIT_TIMEOUT)
        .expect("worker should start a run");
    assert_eq!(task, PendingTask::new(module, tags));
    world.runs += 1;
}

#[then("the coordinator is running \"{module}\" with tags \"{tags}\"")]
fn then_coordinator_running(world: &RefCell<CoordinatorWorld>, module: String, tags: String) {
    let world = world.borrow();
    assert_eq!(world.coordinator.state(), CoordinatorState::Running);
    assert_eq!(
        world.coordinator.current(),
        Some(PendingTask::new(module, tags))
    );
}

#[when("the run is released")]
fn when_run_released(world: &RefCell<CoordinatorWorld>) {
    world.borrow().release.send(()).expect("release run");
}

#[then("the coordinator returns to idle")]
fn then_idle(world: &RefCell<CoordinatorWorld>) {
    let world = world.borrow();
    assert!(wait_until(WAIT_TIMEOUT, || {
        world.coordinator.state() == CoordinatorState::Idle
    }));
}

#[then("exactly {count} run was started")]
fn then_one_run(world: &RefCell<CoordinatorWorld>, count: usize) {
    assert_runs(&world.borrow(), count);
}

#[then("exactly {count} runs were started")]
fn then_runs(world: &RefCell<CoordinatorWorld>, count: usize) {
    assert_runs(&world.borrow(), count);
}

fn assert_runs(world: &CoordinatorWorld, count: usize) {
    assert_eq!(world.runs, count);
    assert!(
        world.started.try_recv().is_err(),
        "no further run should have started"
    );
}

#[scenario(path = "tests/features/single_flight.feature")]
fn single_flight(#[from(world)] world: RefCell<CoordinatorWorld>) {
    drop(world);
}
