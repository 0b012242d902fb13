//! Outer run wrapper shared by every listener transport.

use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::dispatch::Dispatcher;
use crate::process::StopSignal;

use super::{LISTENER_TARGET, Listener, ListenerError};

/// Runs listener sessions until the stop signal is raised.
///
/// A failed session is logged and followed by a `backoff` wait, cut short by
/// the stop signal, before a new session starts. Failures that race with the
/// stop signal are attributed to shutdown and end the loop without a retry.
pub fn supervise(
    listener: &mut dyn Listener,
    dispatcher: &Dispatcher,
    stop: &StopSignal,
    backoff: Duration,
) {
    let endpoint = listener.endpoint().redacted();
    let transport = listener.endpoint().transport();
    info!(
        target: LISTENER_TARGET,
        endpoint = %endpoint,
        transport,
        "listener active"
    );
    while !stop.is_stopped() {
        match listener.run_session(dispatcher, stop) {
            Ok(()) => {}
            Err(error) if stop.is_stopped() => {
                debug!(
                    target: LISTENER_TARGET,
                    endpoint = %endpoint,
                    error = %error,
                    "listener session ended during shutdown"
                );
            }
            Err(error) => {
                warn!(
                    target: LISTENER_TARGET,
                    endpoint = %endpoint,
                    transport,
                    error = %error,
                    backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                    "listener session failed; retrying after backoff"
                );
                stop.wait_timeout(backoff);
            }
        }
    }
    info!(
        target: LISTENER_TARGET,
        endpoint = %endpoint,
        "listener stopped"
    );
}

/// Starts [`supervise`] on a dedicated thread.
///
/// # Errors
///
/// Returns [`ListenerError::Spawn`] when the thread cannot be created.
pub fn spawn_listener(
    mut listener: Box<dyn Listener>,
    dispatcher: Dispatcher,
    stop: StopSignal,
    backoff: Duration,
) -> Result<ListenerHandle, ListenerError> {
    let thread_stop = stop.clone();
    let handle = thread::Builder::new()
        .name(String::from("hotwire-listener"))
        .spawn(move || supervise(listener.as_mut(), &dispatcher, &thread_stop, backoff))
        .map_err(|source| ListenerError::Spawn { source })?;
    Ok(ListenerHandle {
        stop,
        handle: Some(handle),
    })
}

/// Handle to the background listener thread.
#[derive(Debug)]
pub struct ListenerHandle {
    stop: StopSignal,
    handle: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    /// Raises the stop signal observed by the listener.
    pub fn shutdown(&self) {
        self.stop.stop();
    }

    /// Waits for the listener thread to finish.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::ThreadPanic`] when the thread panicked.
    pub fn join(mut self) -> Result<(), ListenerError> {
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(()) => Ok(()),
                Err(_) => Err(ListenerError::ThreadPanic),
            }
        } else {
            Ok(())
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop.stop();
        }
    }
}
