//! Layered configuration shared by the hotwire daemon and its sender CLI.
//!
//! Values are resolved by [`ortho_config`] from, in order of precedence,
//! command-line flags, `HOTWIRE_*` environment variables, a configuration
//! file (`--config-path` or `HOTWIRE_CONFIG_PATH`), and the built-in
//! defaults exported alongside [`Config`].

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod endpoint;
mod logging;

pub use defaults::{
    DEFAULT_CHANNEL, DEFAULT_DATABASE_URL, DEFAULT_DATAGRAM_PORT, DEFAULT_LOG_FILTER,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_RECEIVE_TIMEOUT_MILLIS, DEFAULT_RECONNECT_BACKOFF_SECS,
    DEFAULT_SQL_LOG_TARGET, DEFAULT_TRIGGER_WAIT_SECS, DEFAULT_WORKERS, default_listener_endpoint,
    default_log_filter, default_log_format, default_sql_log_target,
};
pub use endpoint::{EndpointParseError, ListenerEndpoint, validate_channel};
pub use logging::{LogFormat, LogFormatParseError, LogSettings};

/// Resolved configuration for the control channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "HOTWIRE")]
pub struct Config {
    /// Transport the daemon listens on and senders publish to.
    #[ortho_config(default = default_listener_endpoint())]
    pub listener: ListenerEndpoint,
    /// Database that test runs are scoped to.
    pub database_name: Option<String>,
    /// Worker processes run by the host; more than one is rejected.
    #[ortho_config(default = DEFAULT_WORKERS)]
    pub workers: u32,
    /// `tracing_subscriber::EnvFilter` expression.
    #[ortho_config(default = default_log_filter())]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Tracing target toggled by `log_sql`.
    #[ortho_config(default = default_sql_log_target())]
    pub sql_log_target: String,
    /// Bounded wait of the channel listener, in seconds.
    #[ortho_config(default = DEFAULT_POLL_INTERVAL_SECS)]
    pub poll_interval_secs: u64,
    /// Bounded receive of the datagram listener, in milliseconds.
    #[ortho_config(default = DEFAULT_RECEIVE_TIMEOUT_MILLIS)]
    pub receive_timeout_millis: u64,
    /// Pause between failed listener sessions, in seconds.
    #[ortho_config(default = DEFAULT_RECONNECT_BACKOFF_SECS)]
    pub reconnect_backoff_secs: u64,
    /// Bounded wait of the task coordinator, in seconds.
    #[ortho_config(default = DEFAULT_TRIGGER_WAIT_SECS)]
    pub trigger_wait_secs: u64,
    /// External program that performs test runs for the daemon binary.
    pub runner_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listener: default_listener_endpoint(),
            database_name: None,
            workers: DEFAULT_WORKERS,
            log_filter: default_log_filter(),
            log_format: default_log_format(),
            sql_log_target: default_sql_log_target(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            receive_timeout_millis: DEFAULT_RECEIVE_TIMEOUT_MILLIS,
            reconnect_backoff_secs: DEFAULT_RECONNECT_BACKOFF_SECS,
            trigger_wait_secs: DEFAULT_TRIGGER_WAIT_SECS,
            runner_command: None,
        }
    }
}

impl Config {
    /// Transport the daemon listens on.
    #[must_use]
    pub const fn listener(&self) -> &ListenerEndpoint {
        &self.listener
    }

    /// Database that test runs are scoped to, when configured.
    #[must_use]
    pub fn database_name(&self) -> Option<&str> {
        self.database_name.as_deref()
    }

    /// Worker processes run by the host.
    #[must_use]
    pub const fn workers(&self) -> u32 {
        self.workers
    }

    /// `EnvFilter` expression for the global subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Telemetry settings derived from this configuration.
    #[must_use]
    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            filter: self.log_filter.clone(),
            format: self.log_format,
            sql_target: self.sql_log_target.clone(),
        }
    }

    /// Bounded wait of the channel listener.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Bounded receive of the datagram listener.
    #[must_use]
    pub const fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_millis)
    }

    /// Pause between failed listener sessions.
    #[must_use]
    pub const fn reconnect_backoff(&self) -> Duration {
        Duration::from_secs(self.reconnect_backoff_secs)
    }

    /// Bounded wait of the task coordinator.
    #[must_use]
    pub const fn trigger_wait(&self) -> Duration {
        Duration::from_secs(self.trigger_wait_secs)
    }

    /// External test-runner program, when configured.
    #[must_use]
    pub fn runner_command(&self) -> Option<&str> {
        self.runner_command.as_deref()
    }
}
