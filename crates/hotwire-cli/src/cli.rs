//! CLI argument definitions for the hotwire sender.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line interface for publishing control notifications.
#[derive(Parser, Debug)]
#[command(
    name = "hotwire",
    about = "Publishes control notifications to a running hotwire daemon",
    disable_help_subcommand = true
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Control methods the sender can invoke.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Asks the daemon to run a module's tests.
    RunTest {
        /// Module whose tests should run.
        #[arg(value_name = "MODULE")]
        module: String,
        /// Restricts the run to one test class.
        #[arg(long, value_name = "CLASS")]
        class: Option<String>,
        /// Restricts the run to one test method of `--class`.
        #[arg(long, value_name = "METHOD", requires = "class")]
        method: Option<String>,
        /// Explicit tag expression; overrides `--class` and `--method`.
        #[arg(long, value_name = "TAGS")]
        test_tags: Option<String>,
    },
    /// Raises or restores database statement logging.
    LogSql {
        /// Requested state.
        #[arg(value_enum)]
        state: SqlLogging,
    },
}

/// Requested state for `log-sql`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum SqlLogging {
    On,
    Off,
}

impl SqlLogging {
    pub(crate) const fn enabled(self) -> bool {
        matches!(self, Self::On)
    }
}
