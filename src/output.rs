//! Terminal output shared by `clean-folder` and `manage-pdf`.
//!
//! Library code returns reports and errors; only the CLI layers print, and
//! they print through [`OutputFormatter`].

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Width of the separator under the summary table, past the name column.
const COUNT_COLUMN_WIDTH: usize = 10;

/// Styled status lines, progress bars and the per-category summary.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Green check mark, e.g. "Folder: Downloads has been cleaned".
    ///
    /// ```no_run
    /// use sortkit::output::OutputFormatter;
    /// OutputFormatter::success("Folder: Downloads has been cleaned");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Red cross on stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prefixes `message` with `[DRY RUN]`.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Bar over `total` PDF documents, labelled with `stage`.
    ///
    /// ```no_run
    /// use sortkit::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(3, "loading");
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64, stage: &str) -> ProgressBar {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} {prefix:>8} {wide_msg} [{bar:30.cyan/blue}] {pos}/{len}")
            .expect("Invalid progress bar template")
            .progress_chars("█▓░");
        ProgressBar::new(total)
            .with_style(style)
            .with_prefix(stage.to_string())
    }

    /// Prints per-category counts of a dry run, in mapping order.
    ///
    /// ```no_run
    /// use sortkit::output::OutputFormatter;
    ///
    /// let counts = vec![("texts".to_string(), 3), ("images".to_string(), 1)];
    /// OutputFormatter::summary_table(&counts, 4);
    /// ```
    pub fn summary_table(category_counts: &[(String, usize)], total_files: usize) {
        let name_width = category_counts
            .iter()
            .map(|(name, _)| name.len())
            .chain(std::iter::once("Category".len()))
            .max()
            .unwrap_or_default();
        let rule = "-".repeat(name_width + COUNT_COLUMN_WIDTH);

        println!("\n{}", "SUMMARY".bold());
        println!("{:<name_width$} | {}", "Category".bold(), "Files".bold());
        println!("{rule}");
        for (category, count) in category_counts {
            println!(
                "{:<name_width$} | {} {}",
                category,
                count.to_string().green(),
                file_word(*count)
            );
        }
        println!("{rule}");
        println!(
            "{:<name_width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            file_word(total_files)
        );
    }
}

fn file_word(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
