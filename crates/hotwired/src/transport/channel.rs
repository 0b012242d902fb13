//! Database notification channel transport.

use std::iter;
use std::time::Duration;

use hotwire_config::ListenerEndpoint;
use sqlx::postgres::{PgListener, PgNotification};
use tokio::runtime::Builder;
use tracing::{debug, info};

use crate::dispatch::Dispatcher;
use crate::process::StopSignal;

use super::burst::collapse_burst;
use super::{LISTENER_TARGET, Listener, ListenerError};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Listener subscribed to a Postgres `LISTEN` channel.
///
/// Each session opens a dedicated connection on a current-thread runtime and
/// waits at most `poll_interval` (at least 10 ms) for a notification before
/// re-checking the stop signal. A wake that delivers several queued notifications dispatches
/// only the newest; the others are discarded.
#[derive(Debug)]
pub struct ChannelListener {
    endpoint: ListenerEndpoint,
    database_url: String,
    channel: String,
    poll_interval: Duration,
}

impl ChannelListener {
    /// Builds a listener for `channel` on the database at `database_url`.
    #[must_use]
    pub fn new(
        database_url: impl Into<String>,
        channel: impl Into<String>,
        poll_interval: Duration,
    ) -> Self {
        let database_url = database_url.into();
        let channel = channel.into();
        Self {
            endpoint: ListenerEndpoint::channel(database_url.clone(), channel.clone()),
            database_url,
            channel,
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
        }
    }

    async fn listen(
        &self,
        dispatcher: &Dispatcher,
        stop: &StopSignal,
    ) -> Result<(), ListenerError> {
        let channel = self.channel.as_str();
        let mut listener = PgListener::connect(&self.database_url)
            .await
            .map_err(|source| ListenerError::Connect {
                endpoint: self.endpoint.redacted(),
                source,
            })?;
        listener
            .listen(channel)
            .await
            .map_err(|source| ListenerError::Subscribe {
                channel: channel.to_owned(),
                source,
            })?;
        info!(
            target: LISTENER_TARGET,
            channel,
            poll_interval_ms = u64::try_from(self.poll_interval.as_millis()).unwrap_or(u64::MAX),
            "subscribed to notification channel"
        );

        while !stop.is_stopped() {
            let received = match tokio::time::timeout(self.poll_interval, listener.try_recv()).await
            {
                Err(_elapsed) => continue,
                Ok(received) => received,
            };
            match received {
                Ok(Some(first)) => dispatch_burst(&mut listener, first, dispatcher, channel),
                Ok(None) => {
                    return Err(ListenerError::ConnectionLost {
                        channel: channel.to_owned(),
                    });
                }
                Err(source) => {
                    return Err(ListenerError::Receive {
                        channel: channel.to_owned(),
                        source,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Dispatches the newest notification of a wake cycle.
///
/// Notifications that arrive while the newest one is being dispatched belong
/// to the same cycle and are discarded as well.
fn dispatch_burst(
    listener: &mut PgListener,
    first: PgNotification,
    dispatcher: &Dispatcher,
    channel: &str,
) {
    let buffered = iter::from_fn(|| listener.next_buffered());
    let Some(collapsed) = collapse_burst(iter::once(first).chain(buffered)) else {
        return;
    };
    if collapsed.discarded > 0 {
        debug!(
            target: LISTENER_TARGET,
            channel,
            discarded = collapsed.discarded,
            "collapsed notification burst to the newest payload"
        );
    }
    dispatcher.dispatch(collapsed.newest.payload().as_bytes());

    let late = iter::from_fn(|| listener.next_buffered()).count();
    if late > 0 {
        debug!(
            target: LISTENER_TARGET,
            channel,
            discarded = late,
            "discarded notifications received during dispatch"
        );
    }
}

impl Listener for ChannelListener {
    fn endpoint(&self) -> &ListenerEndpoint {
        &self.endpoint
    }

    fn run_session(
        &mut self,
        dispatcher: &Dispatcher,
        stop: &StopSignal,
    ) -> Result<(), ListenerError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|source| ListenerError::Runtime { source })?;
        runtime.block_on(self.listen(dispatcher, stop))
    }
}
