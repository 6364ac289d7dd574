//! Terminal output helpers

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::pipeline::Summary;

/// Status line for a completed step
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Neutral status line
pub fn info(message: &str) {
    println!("{} {}", style("·").blue().bold(), message);
}

/// Something worth noticing, not worth stopping for
pub fn warning(message: &str) {
    println!("{} {}", style("!").yellow().bold(), message);
}

/// Spinner shown while a blocking phase runs (collection fetch)
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("static spinner template"),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// End-of-run summary grouped by outcome kind
pub fn summary(summary: &Summary, elapsed: Duration) {
    let rows = [
        (summary.downloaded, "downloaded", style("✓").green()),
        (summary.updated, "updated", style("↻").cyan()),
        (summary.skipped_existing, "already present", style("=").dim()),
        (summary.no_version_found, "without a version", style("?").yellow()),
        (summary.failed, "failed", style("✗").red()),
    ];

    println!();
    println!(
        "{} {} projects in {}",
        style("Synced").bold(),
        summary.total(),
        human_duration(elapsed)
    );
    for (count, label, mark) in rows {
        if count > 0 {
            println!("  {} {:>3} {}", mark.bold(), count, label);
        }
    }
}

fn human_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs == 0 {
        format!("{}ms", elapsed.as_millis())
    } else if secs < 60 {
        format!("{:.1}s", elapsed.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
