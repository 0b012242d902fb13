//! Configuration loading helpers for the sender CLI.
//!
//! Configuration flags lead the argument list; everything from the first
//! other token onwards belongs to the command parser.

use std::ffi::{OsStr, OsString};

use hotwire_config::Config;
use ortho_config::OrthoConfig;

use crate::AppError;

/// Flags forwarded to the configuration loader.
const CONFIG_CLI_FLAGS: &[&str] = &["--config-path", "--listener"];

pub(crate) trait ConfigLoader {
    /// Loads configuration from the leading configuration flags.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn classify(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    let (flag, inline_value) = match text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (text.as_ref(), false),
    };
    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !inline_value,
        }
    } else {
        FlagAction::Stop
    }
}

/// Arguments split between the configuration loader and the command parser.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_arguments: Vec<OsString>,
}

/// Splits `args` after the leading configuration flags.
///
/// The program name is kept at the front of both halves.
pub(crate) fn split_config_arguments(args: &[OsString]) -> ArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ArgumentSplit::default();
    };
    let mut config_arguments = vec![program.clone()];
    let mut remaining = rest.iter();
    let mut command_arguments = vec![program.clone()];

    while let Some(argument) = remaining.next() {
        match classify(argument) {
            FlagAction::Include { needs_value } => {
                config_arguments.push(argument.clone());
                if needs_value {
                    config_arguments.extend(remaining.next().cloned());
                }
            }
            FlagAction::Stop => {
                command_arguments.push(argument.clone());
                command_arguments.extend(remaining.cloned());
                break;
            }
        }
    }

    ArgumentSplit {
        config_arguments,
        command_arguments,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[rstest]
    #[case("--listener", FlagAction::Include { needs_value: true })]
    #[case("--listener=udp://127.0.0.1:8070", FlagAction::Include { needs_value: false })]
    #[case("--config-path", FlagAction::Include { needs_value: true })]
    #[case("--class", FlagAction::Stop)]
    #[case("run-test", FlagAction::Stop)]
    fn classifies_flags(#[case] argument: &str, #[case] expected: FlagAction) {
        assert_eq!(classify(OsStr::new(argument)), expected);
    }

    #[test]
    fn leading_flags_go_to_the_loader() {
        let split = split_config_arguments(&os(&[
            "hotwire",
            "--listener",
            "udp://127.0.0.1:8070",
            "run-test",
            "sale",
            "--class",
            "TestOrder",
        ]));
        assert_eq!(
            split.config_arguments,
            os(&["hotwire", "--listener", "udp://127.0.0.1:8070"])
        );
        assert_eq!(
            split.command_arguments,
            os(&["hotwire", "run-test", "sale", "--class", "TestOrder"])
        );
    }

    #[test]
    fn flags_after_the_command_stay_with_it() {
        let split = split_config_arguments(&os(&["hotwire", "log-sql", "on", "--listener=x"]));
        assert_eq!(split.config_arguments, os(&["hotwire"]));
        assert_eq!(
            split.command_arguments,
            os(&["hotwire", "log-sql", "on", "--listener=x"])
        );
    }

    #[test]
    fn empty_arguments_split_to_nothing() {
        assert_eq!(split_config_arguments(&[]), ArgumentSplit::default());
    }
}
