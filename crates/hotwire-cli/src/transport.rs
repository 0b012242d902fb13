//! Publishing of control notifications on the configured endpoint.
//!
//! Channel endpoints issue `pg_notify` over a short-lived database
//! connection. Datagram endpoints send the payload as a single UDP datagram.

use std::net::UdpSocket;

use hotwire_config::ListenerEndpoint;
use sqlx::{Connection, PgConnection};

use crate::AppError;

pub(crate) const NOTIFY_STATEMENT: &str = "SELECT pg_notify($1, $2)";

/// Publishes `payload` to whatever listens on `endpoint`.
pub(crate) fn publish(endpoint: &ListenerEndpoint, payload: &str) -> Result<(), AppError> {
    match endpoint {
        ListenerEndpoint::Channel {
            database_url,
            channel,
        } => notify_channel(endpoint, database_url, channel, payload),
        ListenerEndpoint::Datagram { host, port } => {
            send_datagram(endpoint, host, *port, payload)
        }
    }
}

fn notify_channel(
    endpoint: &ListenerEndpoint,
    database_url: &str,
    channel: &str,
    payload: &str,
) -> Result<(), AppError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(AppError::Runtime)?;
    runtime.block_on(async {
        let mut connection = PgConnection::connect(database_url)
            .await
            .map_err(|source| AppError::Connect {
                endpoint: endpoint.redacted(),
                source,
            })?;
        sqlx::query(NOTIFY_STATEMENT)
            .bind(channel)
            .bind(payload)
            .execute(&mut connection)
            .await
            .map_err(|source| AppError::Notify {
                channel: channel.to_owned(),
                source,
            })?;
        // A failed close does not undo the committed notification.
        let _ = connection.close().await;
        Ok(())
    })
}

fn send_datagram(
    endpoint: &ListenerEndpoint,
    host: &str,
    port: u16,
    payload: &str,
) -> Result<(), AppError> {
    let local = if host.contains(':') { "[::]:0" } else { "0.0.0.0:0" };
    let socket = UdpSocket::bind(local).map_err(AppError::Socket)?;
    socket
        .send_to(payload.as_bytes(), (host, port))
        .map(|_| ())
        .map_err(|source| AppError::Send {
            endpoint: endpoint.to_string(),
            source,
        })
}
