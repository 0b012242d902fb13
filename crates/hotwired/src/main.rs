use std::process::ExitCode;

fn main() -> ExitCode {
    match hotwired::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("hotwired: {error}");
            ExitCode::FAILURE
        }
    }
}
