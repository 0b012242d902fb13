use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::defaults::{DEFAULT_CHANNEL, DEFAULT_DATAGRAM_PORT};

/// Declarative description of the transport the daemon listens on.
///
/// Endpoints are written as URLs on the command line and in the
/// environment:
///
/// * `postgres://user@host/db?channel=hot_test` subscribes to a database
///   notification channel;
/// * `udp://127.0.0.1:8070` receives datagrams on a local socket.
///
/// Configuration files may use either the URL form or the tagged table form
/// (`{ transport = "datagram", host = "127.0.0.1", port = 8070 }`).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(
    tag = "transport",
    rename_all = "snake_case",
    try_from = "EndpointRepr"
)]
pub enum ListenerEndpoint {
    /// Database publish/subscribe channel.
    Channel {
        /// Connection URL, without the `channel` query pair.
        database_url: String,
        /// Channel name passed to `LISTEN`.
        channel: String,
    },
    /// Connectionless datagram socket.
    Datagram {
        /// Host or address to bind.
        host: String,
        /// UDP port to bind.
        port: u16,
    },
}

impl ListenerEndpoint {
    /// Builds a channel endpoint.
    #[must_use]
    pub fn channel(database_url: impl Into<String>, channel: impl Into<String>) -> Self {
        Self::Channel {
            database_url: database_url.into(),
            channel: channel.into(),
        }
    }

    /// Builds a datagram endpoint.
    #[must_use]
    pub fn datagram(host: impl Into<String>, port: u16) -> Self {
        Self::Datagram {
            host: host.into(),
            port,
        }
    }

    /// Short transport label used in structured logs.
    #[must_use]
    pub const fn transport(&self) -> &'static str {
        match self {
            Self::Channel { .. } => "channel",
            Self::Datagram { .. } => "datagram",
        }
    }

    /// Renders the endpoint with any database password masked.
    #[must_use]
    pub fn redacted(&self) -> String {
        match self {
            Self::Channel {
                database_url,
                channel,
            } => {
                let masked = match Url::parse(database_url) {
                    Ok(mut url) if url.password().is_some() => {
                        if url.set_password(Some("***")).is_ok() {
                            url.to_string()
                        } else {
                            database_url.clone()
                        }
                    }
                    _ => database_url.clone(),
                };
                with_channel(&masked, channel)
            }
            Self::Datagram { .. } => self.to_string(),
        }
    }
}

impl fmt::Display for ListenerEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel {
                database_url,
                channel,
            } => formatter.write_str(&with_channel(database_url, channel)),
            Self::Datagram { host, port } => {
                if host.contains(':') {
                    write!(formatter, "udp://[{host}]:{port}")
                } else {
                    write!(formatter, "udp://{host}:{port}")
                }
            }
        }
    }
}

impl FromStr for ListenerEndpoint {
    type Err = EndpointParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(input)?;
        match url.scheme() {
            "postgres" | "postgresql" => parse_channel(url),
            "udp" => {
                let host = url
                    .host_str()
                    .filter(|host| !host.is_empty())
                    .ok_or_else(|| EndpointParseError::MissingHost(input.to_owned()))?;
                let host = host.trim_start_matches('[').trim_end_matches(']');
                Ok(Self::datagram(
                    host,
                    url.port().unwrap_or(DEFAULT_DATAGRAM_PORT),
                ))
            }
            other => Err(EndpointParseError::UnsupportedScheme(other.to_owned())),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EndpointRepr {
    Url(String),
    Tagged(TaggedEndpoint),
}

#[derive(Deserialize)]
#[serde(tag = "transport", rename_all = "snake_case")]
enum TaggedEndpoint {
    Channel { database_url: String, channel: String },
    Datagram { host: String, port: u16 },
}

impl TryFrom<EndpointRepr> for ListenerEndpoint {
    type Error = EndpointParseError;

    fn try_from(repr: EndpointRepr) -> Result<Self, Self::Error> {
        match repr {
            EndpointRepr::Url(text) => text.parse(),
            EndpointRepr::Tagged(TaggedEndpoint::Channel {
                database_url,
                channel,
            }) => {
                validate_channel(&channel)?;
                Ok(Self::channel(database_url, channel))
            }
            EndpointRepr::Tagged(TaggedEndpoint::Datagram { host, port }) => {
                Ok(Self::datagram(host, port))
            }
        }
    }
}

fn parse_channel(mut url: Url) -> Result<ListenerEndpoint, EndpointParseError> {
    let mut channel = None;
    let mut retained = Vec::new();
    for (key, value) in url.query_pairs() {
        if key == "channel" {
            channel = Some(value.into_owned());
        } else {
            retained.push((key.into_owned(), value.into_owned()));
        }
    }

    if retained.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(retained);
    }

    let channel = channel.unwrap_or_else(|| DEFAULT_CHANNEL.to_owned());
    validate_channel(&channel)?;
    Ok(ListenerEndpoint::channel(url.to_string(), channel))
}

/// Checks that a channel name is a plain SQL identifier.
///
/// # Errors
///
/// Returns [`EndpointParseError::InvalidChannel`] when the name is empty or
/// contains characters other than ASCII letters, digits, and underscores,
/// or starts with a digit.
pub fn validate_channel(channel: &str) -> Result<(), EndpointParseError> {
    let mut chars = channel.chars();
    let valid_start = chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(EndpointParseError::InvalidChannel(channel.to_owned()))
    }
}

fn with_channel(database_url: &str, channel: &str) -> String {
    let separator = if database_url.contains('?') { '&' } else { '?' };
    format!("{database_url}{separator}channel={channel}")
}

/// Errors encountered while parsing a [`ListenerEndpoint`] from text.
#[derive(Debug, Error)]
pub enum EndpointParseError {
    /// Scheme was not recognised.
    #[error("unsupported listener scheme '{0}'")]
    UnsupportedScheme(String),
    /// Datagram host was missing.
    #[error("missing datagram host in '{0}'")]
    MissingHost(String),
    /// Channel name is not a plain identifier.
    #[error("invalid channel name '{0}'")]
    InvalidChannel(String),
    /// URL parsing failed.
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn parses_channel_with_explicit_name() {
        let endpoint: ListenerEndpoint = "postgres://odoo@localhost/postgres?channel=reload"
            .parse()
            .expect("parse channel endpoint");
        assert_eq!(
            endpoint,
            ListenerEndpoint::channel("postgres://odoo@localhost/postgres", "reload")
        );
    }

    #[test]
    fn channel_defaults_and_keeps_other_query_pairs() {
        let endpoint: ListenerEndpoint = "postgresql://localhost/postgres?sslmode=disable"
            .parse()
            .expect("parse channel endpoint");
        assert_eq!(
            endpoint,
            ListenerEndpoint::channel(
                "postgresql://localhost/postgres?sslmode=disable",
                DEFAULT_CHANNEL
            )
        );
    }

    #[rstest]
    #[case("udp://127.0.0.1:9100", ListenerEndpoint::datagram("127.0.0.1", 9100))]
    #[case("udp://localhost", ListenerEndpoint::datagram("localhost", DEFAULT_DATAGRAM_PORT))]
    #[case("udp://[::1]:9100", ListenerEndpoint::datagram("::1", 9100))]
    fn parses_datagram_endpoints(#[case] input: &str, #[case] expected: ListenerEndpoint) {
        let endpoint: ListenerEndpoint = input.parse().expect("parse datagram endpoint");
        assert_eq!(endpoint, expected);
    }

    #[rstest]
    #[case("udp://127.0.0.1:9100")]
    #[case("udp://[::1]:9100")]
    #[case("postgres://localhost/postgres?channel=hot_test")]
    fn display_round_trips(#[case] input: &str) {
        let endpoint: ListenerEndpoint = input.parse().expect("parse endpoint");
        assert_eq!(endpoint.to_string(), input);
    }

    #[test]
    fn redacts_passwords() {
        let endpoint: ListenerEndpoint = "postgres://odoo:secret@db/postgres"
            .parse()
            .expect("parse endpoint");
        let shown = endpoint.redacted();
        assert!(!shown.contains("secret"), "password leaked: {shown}");
        assert!(shown.ends_with("?channel=hot_test"));
    }

    #[rstest]
    #[case(r#""udp://127.0.0.1:9100""#)]
    #[case(r#"{"transport":"datagram","host":"127.0.0.1","port":9100}"#)]
    fn deserialises_url_and_tagged_forms(#[case] json: &str) {
        let endpoint: ListenerEndpoint = serde_json::from_str(json).expect("deserialise");
        assert_eq!(endpoint, ListenerEndpoint::datagram("127.0.0.1", 9100));
    }

    #[test]
    fn tagged_form_validates_channel() {
        let json = r#"{"transport":"channel","database_url":"postgres://db/x","channel":"a-b"}"#;
        assert!(serde_json::from_str::<ListenerEndpoint>(json).is_err());
    }

    #[rstest]
    #[case("tcp://127.0.0.1:9100")]
    #[case("postgres://localhost/postgres?channel=drop%20table")]
    #[case("postgres://localhost/postgres?channel=9lives")]
    #[case("not a url")]
    fn rejects_invalid_endpoints(#[case] input: &str) {
        assert!(input.parse::<ListenerEndpoint>().is_err());
    }
}
