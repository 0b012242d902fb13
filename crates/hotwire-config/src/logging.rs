use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, for log collectors.
    #[default]
    Json,
    /// Human-readable single line output.
    Compact,
}

/// Errors encountered while parsing a [`LogFormat`] from text.
pub type LogFormatParseError = strum::ParseError;

/// Telemetry settings extracted from the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Base `EnvFilter` expression.
    pub filter: String,
    /// Output format.
    pub format: LogFormat,
    /// Target raised to `debug` while SQL logging is enabled and held at
    /// `info` while it is disabled.
    pub sql_target: String,
}

impl LogSettings {
    /// Filter expression with the SQL target raised to `debug`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hotwire_config::{LogFormat, LogSettings};
    ///
    /// let settings = LogSettings {
    ///     filter: "info".to_owned(),
    ///     format: LogFormat::Compact,
    ///     sql_target: "sqlx".to_owned(),
    /// };
    /// assert_eq!(settings.verbose_sql_filter(), "info,sqlx=debug");
    /// ```
    #[must_use]
    pub fn verbose_sql_filter(&self) -> String {
        self.with_sql_level("debug")
    }

    /// Filter expression with the SQL target held at `info`, whatever the
    /// base filter allows.
    #[must_use]
    pub fn quiet_sql_filter(&self) -> String {
        self.with_sql_level("info")
    }

    fn with_sql_level(&self, level: &str) -> String {
        if self.filter.trim().is_empty() {
            format!("{}={level}", self.sql_target)
        } else {
            format!("{},{}={level}", self.filter, self.sql_target)
        }
    }
}
