//! Supervises daemon launch sequencing and runtime orchestration.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use hotwire_config::Config;
use tracing::{info, warn};

use crate::bootstrap::{Bootstrapped, ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::context::ControlContext;
use crate::coordinator::{
    CommandTestRunner, ConfiguredIdentity, TaskCoordinator, TaskExecutor, TestTask, WorkerHandle,
    spawn_worker,
};
use crate::dispatch::MethodRegistry;
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::methods::register_builtin_methods;
use crate::transport::{self, ListenerHandle, spawn_listener};

use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};
use super::stop::StopSignal;
use super::{PROCESS_TARGET, SHUTDOWN_TIMEOUT};

/// Builds the executor that runs accepted test tasks.
pub(crate) trait ExecutorFactory: Send + Sync {
    /// Builds the executor for the resolved configuration.
    fn build(&self, config: &Config) -> Result<Arc<dyn TaskExecutor>, LaunchError>;
}

/// Executor factory driving the configured runner command.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct CommandExecutorFactory;

impl ExecutorFactory for CommandExecutorFactory {
    fn build(&self, config: &Config) -> Result<Arc<dyn TaskExecutor>, LaunchError> {
        let command_line = config.runner_command().ok_or(LaunchError::MissingRunner)?;
        let runner = CommandTestRunner::from_command_line(command_line)?;
        Ok(Arc::new(TestTask::new(
            runner,
            ConfiguredIdentity::from_config(config),
        )))
    }
}

/// Process-level collaborators needed to control daemon lifecycle.
pub(crate) struct ProcessControl<S> {
    pub(crate) shutdown: S,
    /// Time allowed for the listener and worker to stop once signalled.
    pub(crate) shutdown_timeout: Duration,
}

/// Service dependencies required to construct the daemon runtime.
pub(crate) struct ServiceDeps<L, X> {
    pub(crate) loader: L,
    pub(crate) executor: X,
    pub(crate) reporter: Arc<dyn HealthReporter>,
}

/// Collaborators required to launch the daemon runtime.
pub(crate) struct LaunchPlan<L, X, S> {
    pub(crate) process: ProcessControl<S>,
    pub(crate) services: ServiceDeps<L, X>,
}

/// Runs the daemon using the production collaborators.
pub fn run_daemon() -> Result<(), LaunchError> {
    let plan = LaunchPlan {
        process: ProcessControl {
            shutdown: SystemShutdownSignal,
            shutdown_timeout: SHUTDOWN_TIMEOUT,
        },
        services: ServiceDeps {
            loader: SystemConfigLoader,
            executor: CommandExecutorFactory,
            reporter: Arc::new(StructuredHealthReporter::new()),
        },
    };
    run_daemon_with(plan)
}

/// Runs the daemon with injected collaborators.
pub(crate) fn run_daemon_with<L, X, S>(plan: LaunchPlan<L, X, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    X: ExecutorFactory,
    S: ShutdownSignal,
{
    let LaunchPlan { process, services } = plan;
    let ProcessControl {
        shutdown,
        shutdown_timeout,
    } = process;
    let ServiceDeps {
        loader,
        executor,
        reporter,
    } = services;

    let Bootstrapped { config, telemetry } = bootstrap_with(&loader, reporter.as_ref())?;
    info!(
        target: PROCESS_TARGET,
        listener = %config.listener().redacted(),
        "starting daemon runtime"
    );
    let executor = executor.build(&config)?;

    let stop = StopSignal::new();
    let coordinator = TaskCoordinator::new(config.trigger_wait(), stop.clone());
    let mut registry = MethodRegistry::new();
    register_builtin_methods(&mut registry, Arc::clone(&coordinator), Arc::new(telemetry));
    let context = ControlContext::new(registry, coordinator, stop);
    info!(
        target: PROCESS_TARGET,
        methods = ?context.methods(),
        "control methods registered"
    );

    let worker = spawn_worker(context.coordinator(), executor)?;
    let listener = match spawn_listener(
        transport::for_config(&config),
        context.dispatcher(),
        context.stop().clone(),
        config.reconnect_backoff(),
    ) {
        Ok(listener) => listener,
        Err(error) => {
            context.stop().stop();
            if let Err(worker_error) = worker.join() {
                warn!(
                    target: PROCESS_TARGET,
                    error = %worker_error,
                    "task worker failed while aborting launch"
                );
            }
            return Err(error.into());
        }
    };
    reporter.runtime_ready(config.listener());

    let waited = shutdown.wait();
    reporter.runtime_stopping();
    context.stop().stop();
    let joined = join_within(shutdown_timeout, listener, worker);
    waited?;
    joined?;
    info!(
        target: PROCESS_TARGET,
        "shutdown sequence completed"
    );
    Ok(())
}

/// Joins the listener then the worker, giving up once `timeout` elapses.
///
/// Threads still running after the budget are left detached so the
/// process can exit.
fn join_within(
    timeout: Duration,
    listener: ListenerHandle,
    worker: WorkerHandle,
) -> Result<(), LaunchError> {
    let (sender, receiver) = mpsc::channel();
    thread::Builder::new()
        .name(String::from("hotwire-shutdown"))
        .spawn(move || {
            let listener_joined = listener.join();
            let worker_joined = worker.join();
            let _ = sender.send((listener_joined, worker_joined));
        })
        .map_err(|source| LaunchError::ShutdownSupervisor { source })?;

    let Ok((listener_joined, worker_joined)) = receiver.recv_timeout(timeout) else {
        warn!(
            target: PROCESS_TARGET,
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            "background threads outlived the shutdown budget"
        );
        return Err(LaunchError::ShutdownTimeout { timeout });
    };
    listener_joined?;
    worker_joined?;
    Ok(())
}
