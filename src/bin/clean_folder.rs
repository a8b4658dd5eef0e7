use clap::Parser;
use sortkit::cli::{CleanFolderArgs, run_jobs};
use sortkit::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = CleanFolderArgs::parse();

    // Per-folder failures are reported inside the run and do not change the exit code.
    match run_jobs(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {}", e));
            ExitCode::FAILURE
        }
    }
}
