//! CLI entrypoint for the hotwire sender.
//!
//! The binary delegates to [`hotwire_cli::run`], which loads configuration,
//! builds the requested notification, and publishes it on the configured
//! endpoint.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    hotwire_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
