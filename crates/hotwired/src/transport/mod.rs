//! Listener transports feeding payloads to the dispatcher.
//!
//! Two interchangeable [`Listener`] implementations exist: a database
//! notification channel and a UDP datagram socket. Exactly one is selected
//! from configuration at startup and run by the shared supervisor on its own
//! thread.

mod burst;
mod channel;
mod datagram;
mod errors;
mod supervisor;
#[cfg(test)]
mod test_utils;

use hotwire_config::{Config, ListenerEndpoint};

use crate::dispatch::Dispatcher;
use crate::process::StopSignal;

pub use self::channel::ChannelListener;
pub use self::datagram::DatagramListener;
pub use self::errors::ListenerError;
pub use self::supervisor::{ListenerHandle, spawn_listener, supervise};
#[cfg(test)]
pub(crate) use self::test_utils::{recording_dispatcher, wait_until};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");

/// A transport that receives payloads and hands them to a [`Dispatcher`].
pub trait Listener: Send {
    /// Endpoint served by this listener.
    fn endpoint(&self) -> &ListenerEndpoint;

    /// Runs one session until the stop signal is observed or the transport
    /// fails.
    ///
    /// Returns `Ok(())` only once `stop` is raised. Resources owned by the
    /// session are released on every return path.
    ///
    /// # Errors
    ///
    /// Returns a [`ListenerError`] when the transport fails; the supervisor
    /// backs off and starts a new session.
    fn run_session(
        &mut self,
        dispatcher: &Dispatcher,
        stop: &StopSignal,
    ) -> Result<(), ListenerError>;
}

/// Builds the listener selected by the configured endpoint.
#[must_use]
pub fn for_config(config: &Config) -> Box<dyn Listener> {
    match config.listener() {
        ListenerEndpoint::Channel {
            database_url,
            channel,
        } => Box::new(ChannelListener::new(
            database_url.clone(),
            channel.clone(),
            config.poll_interval(),
        )),
        ListenerEndpoint::Datagram { host, port } => Box::new(DatagramListener::new(
            host.clone(),
            *port,
            config.receive_timeout(),
        )),
    }
}
