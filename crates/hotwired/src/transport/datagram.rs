//! UDP datagram transport.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use hotwire_config::ListenerEndpoint;
use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, info, warn};

use crate::dispatch::Dispatcher;
use crate::process::StopSignal;

use super::{LISTENER_TARGET, Listener, ListenerError};

/// Largest payload a single datagram can carry.
const MAX_DATAGRAM_SIZE: usize = 64 * 1024;
const MIN_RECEIVE_TIMEOUT: Duration = Duration::from_millis(1);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// Listener bound to a UDP socket.
///
/// Each received datagram is decoded as lossy UTF-8 and dispatched before
/// the next receive.
#[derive(Debug)]
pub struct DatagramListener {
    endpoint: ListenerEndpoint,
    host: String,
    port: u16,
    receive_timeout: Duration,
    socket: Option<UdpSocket>,
}

impl DatagramListener {
    /// Builds a listener that binds its socket when the first session starts.
    ///
    /// Bind failures then surface as session errors and are retried by the
    /// supervisor.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, receive_timeout: Duration) -> Self {
        let host = host.into();
        Self {
            endpoint: ListenerEndpoint::datagram(host.clone(), port),
            host,
            port,
            receive_timeout,
            socket: None,
        }
    }

    /// Builds a listener and binds its socket immediately.
    ///
    /// # Errors
    ///
    /// Returns a [`ListenerError`] when the address cannot be resolved or the
    /// socket cannot be bound.
    pub fn bind(
        host: impl Into<String>,
        port: u16,
        receive_timeout: Duration,
    ) -> Result<Self, ListenerError> {
        let mut listener = Self::new(host, port, receive_timeout);
        listener.socket = Some(bind_socket(
            &listener.host,
            listener.port,
            listener.receive_timeout,
        )?);
        Ok(listener)
    }

    /// Address of the bound socket, if bound.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket
            .as_ref()
            .and_then(|socket| socket.local_addr().ok())
    }

    fn receive_loop(socket: &UdpSocket, dispatcher: &Dispatcher, stop: &StopSignal) {
        let mut buffer = vec![0_u8; MAX_DATAGRAM_SIZE];
        let mut last_error = None::<io::ErrorKind>;
        while !stop.is_stopped() {
            match socket.recv_from(&mut buffer) {
                Ok((length, peer)) => {
                    last_error = None;
                    let payload = String::from_utf8_lossy(&buffer[..length]);
                    debug!(
                        target: LISTENER_TARGET,
                        peer = %peer,
                        bytes = length,
                        "datagram received"
                    );
                    dispatcher.dispatch(payload.as_bytes());
                }
                Err(error) if is_quiet(&error) => {}
                Err(error) => {
                    let kind = error.kind();
                    if last_error != Some(kind) {
                        warn!(
                            target: LISTENER_TARGET,
                            error = %error,
                            "datagram receive error"
                        );
                    }
                    last_error = Some(kind);
                    stop.wait_timeout(ERROR_BACKOFF);
                }
            }
        }
    }
}

impl Listener for DatagramListener {
    fn endpoint(&self) -> &ListenerEndpoint {
        &self.endpoint
    }

    fn run_session(
        &mut self,
        dispatcher: &Dispatcher,
        stop: &StopSignal,
    ) -> Result<(), ListenerError> {
        let socket = match self.socket.take() {
            Some(socket) => socket,
            None => bind_socket(&self.host, self.port, self.receive_timeout)?,
        };
        info!(
            target: LISTENER_TARGET,
            local_addr = ?socket.local_addr().ok(),
            "datagram socket bound"
        );
        Self::receive_loop(&socket, dispatcher, stop);
        Ok(())
    }
}

/// Timeouts and interrupts only mean no datagram arrived yet.
fn is_quiet(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr, ListenerError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?;
    addrs
        .next()
        .ok_or_else(|| ListenerError::ResolveEmpty {
            host: host.to_owned(),
            port,
        })
}

fn bind_socket(
    host: &str,
    port: u16,
    receive_timeout: Duration,
) -> Result<UdpSocket, ListenerError> {
    let addr = resolve(host, port)?;
    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))
        .map_err(|source| ListenerError::Bind { addr, source })?;
    socket
        .set_reuse_address(true)
        .map_err(|source| ListenerError::Configure { addr, source })?;
    socket
        .bind(&addr.into())
        .map_err(|source| ListenerError::Bind { addr, source })?;
    let socket: UdpSocket = socket.into();
    socket
        .set_read_timeout(Some(receive_timeout.max(MIN_RECEIVE_TIMEOUT)))
        .map_err(|source| ListenerError::Configure { addr, source })?;
    Ok(socket)
}
