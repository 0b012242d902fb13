use std::sync::Arc;

use hotwire_protocol::RUN_TEST_METHOD;
use tracing::debug;

use crate::coordinator::{PendingTask, TaskCoordinator, TriggerOutcome};
use crate::dispatch::{Arguments, Arity, HandlerError, MethodRegistry};

use super::METHODS_TARGET;

/// Calling convention of `run_test`.
pub const RUN_TEST_ARITY: Arity = Arity::Flexible(&["module", "test_tags"]);

pub(super) fn register(registry: &mut MethodRegistry, coordinator: Arc<TaskCoordinator>) {
    registry.register_fn(RUN_TEST_METHOD, RUN_TEST_ARITY, move |arguments| {
        run_test(&coordinator, &arguments)
    });
}

fn run_test(coordinator: &TaskCoordinator, arguments: &Arguments) -> Result<(), HandlerError> {
    let module = arguments.string("module")?.trim();
    if module.is_empty() {
        return Err(HandlerError::InvalidArgument {
            name: String::from("module"),
            expected: "a non-empty module name",
        });
    }
    let test_tags = arguments.string("test_tags")?.trim();
    if test_tags.is_empty() {
        return Err(HandlerError::InvalidArgument {
            name: String::from("test_tags"),
            expected: "a non-empty tag expression",
        });
    }
    let outcome = coordinator.trigger(PendingTask::new(module, test_tags));
    debug!(
        target: METHODS_TARGET,
        module,
        test_tags,
        accepted = outcome == TriggerOutcome::Accepted,
        "run_test handled"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::coordinator::CoordinatorState;
    use crate::dispatch::{DispatchOutcome, Dispatcher};
    use crate::process::StopSignal;

    fn dispatcher() -> (Dispatcher, Arc<TaskCoordinator>) {
        let coordinator = TaskCoordinator::new(Duration::from_secs(60), StopSignal::new());
        let mut registry = MethodRegistry::new();
        register(&mut registry, Arc::clone(&coordinator));
        (Dispatcher::new(Arc::new(registry)), coordinator)
    }

    #[test]
    fn named_params_trigger_a_run() {
        let (dispatcher, coordinator) = dispatcher();
        let payload = json!({
            "jsonrpc": "2.0",
            "method": "run_test",
            "params": {"module": "sale", "test_tags": "/sale"}
        });
        let outcome = dispatcher.dispatch(payload.to_string().as_bytes());

        assert_eq!(outcome, DispatchOutcome::Invoked);
        assert_eq!(coordinator.state(), CoordinatorState::Pending);
        assert_eq!(coordinator.current(), Some(PendingTask::new("sale", "/sale")));
    }

    #[test]
    fn positional_params_trigger_a_run() {
        let (dispatcher, coordinator) = dispatcher();
        let outcome = dispatcher.dispatch(
            br#"{"jsonrpc":"2.0","method":"run_test","params":["stock","/stock:TestMove"]}"#,
        );

        assert_eq!(outcome, DispatchOutcome::Invoked);
        assert_eq!(
            coordinator.current(),
            Some(PendingTask::new("stock", "/stock:TestMove"))
        );
    }

    #[test]
    fn busy_coordinators_keep_the_first_request() {
        let (dispatcher, coordinator) = dispatcher();
        let first = br#"{"jsonrpc":"2.0","method":"run_test","params":["sale","/sale"]}"#;
        let second = br#"{"jsonrpc":"2.0","method":"run_test","params":["stock","/stock"]}"#;

        assert_eq!(dispatcher.dispatch(first), DispatchOutcome::Invoked);
        assert_eq!(dispatcher.dispatch(second), DispatchOutcome::Invoked);
        assert_eq!(coordinator.current(), Some(PendingTask::new("sale", "/sale")));
    }

    #[test]
    fn blank_modules_are_rejected() {
        let (dispatcher, coordinator) = dispatcher();
        let outcome =
            dispatcher.dispatch(br#"{"jsonrpc":"2.0","method":"run_test","params":["  ","/x"]}"#);

        assert_eq!(outcome, DispatchOutcome::InvalidParams);
        assert_eq!(coordinator.state(), CoordinatorState::Idle);
    }

    #[rstest]
    #[case(br#"{"jsonrpc":"2.0","method":"run_test","params":["sale",""]}"#)]
    #[case(br#"{"jsonrpc":"2.0","method":"run_test","params":{"module":"sale","test_tags":" "}}"#)]
    fn blank_tags_are_rejected(#[case] payload: &[u8]) {
        let (dispatcher, coordinator) = dispatcher();
        let outcome = dispatcher.dispatch(payload);

        assert_eq!(outcome, DispatchOutcome::InvalidParams);
        assert_eq!(coordinator.state(), CoordinatorState::Idle);
        assert_eq!(coordinator.current(), None);
    }

    #[test]
    fn missing_tags_are_rejected() {
        let (dispatcher, coordinator) = dispatcher();
        let outcome = dispatcher
            .dispatch(br#"{"jsonrpc":"2.0","method":"run_test","params":{"module":"sale"}}"#);

        assert_eq!(outcome, DispatchOutcome::InvalidParams);
        assert_eq!(coordinator.state(), CoordinatorState::Idle);
    }
}
