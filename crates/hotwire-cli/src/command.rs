//! Translation of parsed commands into control notifications.

use hotwire_protocol::{LOG_SQL_METHOD, Notification, RUN_TEST_METHOD};
use serde_json::json;

use crate::cli::CliCommand;

/// Tag expression selecting a module, optionally narrowed to a class or
/// one of its methods.
pub(crate) fn default_test_tags(
    module: &str,
    class: Option<&str>,
    method: Option<&str>,
) -> String {
    match (class, method) {
        (Some(class), Some(method)) => format!("/{module}:{class}.{method}"),
        (Some(class), None) => format!("/{module}:{class}"),
        _ => format!("/{module}"),
    }
}

impl From<&CliCommand> for Notification {
    fn from(command: &CliCommand) -> Self {
        match command {
            CliCommand::RunTest {
                module,
                class,
                method,
                test_tags,
            } => {
                let tags = test_tags.clone().unwrap_or_else(|| {
                    default_test_tags(module, class.as_deref(), method.as_deref())
                });
                Self::new(RUN_TEST_METHOD).positional(vec![json!(module), json!(tags)])
            }
            CliCommand::LogSql { state } => {
                Self::new(LOG_SQL_METHOD).positional(vec![json!(state.enabled())])
            }
        }
    }
}
