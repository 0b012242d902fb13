//! Sender side of the hotwire control channel.
//!
//! The `hotwire` binary turns a command line such as
//! `hotwire run-test sale --class TestOrder` into a JSON-RPC 2.0
//! notification and publishes it on the endpoint the daemon listens on. No
//! reply is awaited: delivery is fire-and-forget, matching the daemon.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use hotwire_protocol::Notification;

mod cli;
mod command;
mod config;
mod errors;
mod transport;

use cli::Cli;
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
use config::split_config_arguments;
pub(crate) use errors::AppError;

/// Runs the CLI using the provided arguments and output stream.
///
/// Errors are written to `stderr` and reported through the exit code.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    match send(&args, stdout, loader) {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::CliUsage(error)) if !error.use_stderr() => {
            // Help and version output are successful invocations.
            let _ = write!(stdout, "{error}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn send<W, L>(args: &[OsString], stdout: &mut W, loader: &L) -> Result<(), AppError>
where
    W: Write,
    L: ConfigLoader,
{
    let split = split_config_arguments(args);
    let cli = Cli::try_parse_from(&split.command_arguments).map_err(AppError::CliUsage)?;
    let config = loader.load(&split.config_arguments)?;
    let notification = Notification::from(&cli.command);
    let payload = notification
        .to_json()
        .map_err(AppError::SerialiseNotification)?;
    let endpoint = config.listener();
    transport::publish(endpoint, &payload)?;
    writeln!(
        stdout,
        "sent {} to {}",
        notification.method(),
        endpoint.redacted()
    )
    .map_err(AppError::WriteOutput)
}

#[cfg(test)]
mod tests;
