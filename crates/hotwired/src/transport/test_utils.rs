//! Test helpers for the transport module.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::dispatch::{Arity, Dispatcher, MethodRegistry};

/// Collects the arguments of every `record` invocation.
#[derive(Debug, Clone, Default)]
pub(crate) struct Recorder {
    calls: Arc<Mutex<Vec<Vec<Value>>>>,
}

impl Recorder {
    pub(crate) fn calls(&self) -> Vec<Vec<Value>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Builds a dispatcher exposing a single `record(value)` method.
pub(crate) fn recording_dispatcher() -> (Dispatcher, Recorder) {
    let recorder = Recorder::default();
    let calls = Arc::clone(&recorder.calls);
    let mut registry = MethodRegistry::new();
    registry.register_fn("record", Arity::Flexible(&["value"]), move |arguments| {
        let values = arguments.values().map(|(_, value)| value.clone()).collect();
        calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(values);
        Ok(())
    });
    (Dispatcher::new(Arc::new(registry)), recorder)
}

/// Polls `condition` until it holds or `timeout` elapses.
pub(crate) fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}
