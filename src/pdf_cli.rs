//! Command-line interface for `manage-pdf`.

use crate::output::OutputFormatter;
use crate::pdf::{self, PageRange, PdfResult};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Merge PDF files or split one PDF by page ranges.
#[derive(Debug, Parser)]
#[command(name = "manage-pdf", version, about = "PDF merge and split tool")]
pub struct PdfArgs {
    #[command(subcommand)]
    pub command: PdfCommand,
}

#[derive(Debug, Subcommand)]
pub enum PdfCommand {
    /// Concatenate input PDFs, in order, into one file
    Merge {
        /// Input PDF file paths
        #[arg(required = true, value_name = "INPUT")]
        inputs: Vec<PathBuf>,

        /// Output PDF file path
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Write one PDF per page range of the input
    Split {
        /// Input PDF file path
        input: PathBuf,

        /// Page ranges as start/end pairs, 0-based and end-exclusive
        /// (e.g. --ranges 0 5 5 10)
        #[arg(long, required = true, num_args = 1.., value_name = "N")]
        ranges: Vec<usize>,

        /// Directory receiving the numbered outputs
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
}

impl PdfArgs {
    /// Checks what clap cannot express, before any PDF is opened.
    pub fn validate(&self) -> Result<(), clap::Error> {
        if let PdfCommand::Split { ranges, .. } = &self.command
            && ranges.len() % 2 != 0
        {
            return Err(Self::command().error(
                ErrorKind::ValueValidation,
                format!(
                    "--ranges takes start/end pairs, got {} value(s)",
                    ranges.len()
                ),
            ));
        }
        Ok(())
    }
}

/// Executes a validated command.
pub fn run(args: &PdfArgs) -> PdfResult<()> {
    match &args.command {
        PdfCommand::Merge { inputs, output } => {
            let progress = OutputFormatter::create_progress_bar(inputs.len() as u64, "loading");
            let summary = pdf::merge_files(inputs, output, &progress);
            progress.finish_and_clear();
            let summary = summary?;

            OutputFormatter::success(&format!(
                "Merged {} file(s), {} page(s) into {}",
                summary.inputs,
                summary.pages,
                output.display()
            ));
        }
        PdfCommand::Split {
            input,
            ranges,
            output_dir,
        } => {
            let ranges = PageRange::from_pairs(ranges)?;
            let progress = OutputFormatter::create_progress_bar(ranges.len() as u64, "writing");
            let parts = pdf::split_file(input, &ranges, output_dir, &progress);
            progress.finish_and_clear();

            for part in parts? {
                OutputFormatter::success(&format!(
                    "{} ({} page(s))",
                    part.path.display(),
                    part.pages
                ));
            }
        }
    }
    Ok(())
}
