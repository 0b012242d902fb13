use crate::endpoint::ListenerEndpoint;
use crate::logging::LogFormat;

/// Channel subscribed to when the endpoint URL does not name one.
pub const DEFAULT_CHANNEL: &str = "hot_test";

/// Database URL used by the default channel endpoint.
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/postgres";

/// Port bound by datagram endpoints that omit one.
pub const DEFAULT_DATAGRAM_PORT: u16 = 8070;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Tracing target whose verbosity the `log_sql` method toggles.
pub const DEFAULT_SQL_LOG_TARGET: &str = "sqlx";

/// Worker processes the host is expected to run.
pub const DEFAULT_WORKERS: u32 = 1;

/// Upper bound, in seconds, on one channel readiness wait.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Upper bound, in milliseconds, on one datagram receive.
pub const DEFAULT_RECEIVE_TIMEOUT_MILLIS: u64 = 1_000;

/// Pause, in seconds, between failed listener sessions.
pub const DEFAULT_RECONNECT_BACKOFF_SECS: u64 = 3;

/// Upper bound, in seconds, on one task coordinator wait.
pub const DEFAULT_TRIGGER_WAIT_SECS: u64 = 60;

/// Default listener: the `hot_test` channel on the local `postgres` database.
#[must_use]
pub fn default_listener_endpoint() -> ListenerEndpoint {
    ListenerEndpoint::channel(DEFAULT_DATABASE_URL, DEFAULT_CHANNEL)
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Owned tracing target toggled by `log_sql`.
#[must_use]
pub fn default_sql_log_target() -> String {
    DEFAULT_SQL_LOG_TARGET.to_owned()
}
