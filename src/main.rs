//! clp - changelog portal command-line entry point

use std::process::ExitCode;

use changelog_portal::cli;
use changelog_portal::ui::output;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
