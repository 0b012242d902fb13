//! Process-wide, write-once stop signal.

use std::fmt;
use std::mem;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::info;

use super::PROCESS_TARGET;

type StopCallback = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct StopState {
    stopped: bool,
    callbacks: Vec<StopCallback>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<StopState>,
    changed: Condvar,
}

/// Cancellation flag shared by every long-lived loop.
///
/// The flag is set at most once and never reset. Clones share the same flag.
#[derive(Clone, Default)]
pub struct StopSignal {
    inner: Arc<Inner>,
}

impl StopSignal {
    /// Builds a signal in the running state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StopState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets the flag, wakes every waiter, and runs the stop callbacks.
    ///
    /// Returns `true` for the call that set the flag and `false` for every
    /// later call, which has no further effect.
    pub fn stop(&self) -> bool {
        let callbacks = {
            let mut state = self.lock();
            if state.stopped {
                return false;
            }
            state.stopped = true;
            mem::take(&mut state.callbacks)
        };
        self.inner.changed.notify_all();
        info!(
            target: PROCESS_TARGET,
            callbacks = callbacks.len(),
            "stop signal raised"
        );
        for callback in callbacks {
            callback();
        }
        true
    }

    /// Returns `true` once [`StopSignal::stop`] has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Waits up to `timeout` for the flag to be set.
    ///
    /// Returns early when the flag is set and reports whether it is set.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let state = self.lock();
        let (state, _) = self
            .inner
            .changed
            .wait_timeout_while(state, timeout, |state| !state.stopped)
            .unwrap_or_else(PoisonError::into_inner);
        state.stopped
    }

    /// Registers `callback` to run once when the flag is set.
    ///
    /// Runs `callback` immediately when the flag is already set.
    pub fn on_stop(&self, callback: impl FnOnce() + Send + 'static) {
        let mut state = self.lock();
        if state.stopped {
            drop(state);
            callback();
        } else {
            state.callbacks.push(Box::new(callback));
        }
    }
}

impl fmt::Debug for StopSignal {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("StopSignal")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Instant;

    use super::*;

    #[test]
    fn stop_is_idempotent() {
        let signal = StopSignal::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        signal.on_stop(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(signal.stop());
        assert!(!signal.stop());
        assert!(!signal.clone().stop());
        assert!(signal.is_stopped());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn late_callbacks_run_immediately() {
        let signal = StopSignal::new();
        signal.stop();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        signal.on_stop(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn wait_returns_early_on_stop() {
        let signal = StopSignal::new();
        let remote = signal.clone();
        let started = Instant::now();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            remote.stop();
        });

        assert!(signal.wait_timeout(Duration::from_secs(30)));
        assert!(started.elapsed() < Duration::from_secs(10));
        stopper.join().expect("stopper thread");
    }

    #[test]
    fn wait_times_out_while_running() {
        let signal = StopSignal::new();
        assert!(!signal.wait_timeout(Duration::from_millis(20)));
    }
}
