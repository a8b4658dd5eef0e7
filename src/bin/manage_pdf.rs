use clap::Parser;
use sortkit::output::OutputFormatter;
use sortkit::pdf_cli::{PdfArgs, run};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = PdfArgs::parse();
    if let Err(e) = args.validate() {
        e.exit();
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {}", e));
            ExitCode::FAILURE
        }
    }
}
