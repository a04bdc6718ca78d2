//! Spinners and progress bars with plain fallback

use super::context::UiContext;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// A single long-running step
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            println!("{} {}", style("...").dim(), message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else {
            println!("{} {}", style("[OK]").green(), message);
        }
    }

    /// Stop with error message
    pub fn stop_error(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.error(message);
        } else {
            println!("{} {}", style("[FAIL]").red(), message);
        }
    }
}

/// Per-partition progress for bulk cache operations.
///
/// Shows an indicatif bar on a terminal and one line per partition otherwise.
pub struct PartitionProgress {
    bar: Option<ProgressBar>,
}

impl PartitionProgress {
    pub fn new(ctx: &UiContext, verb: &str, total: usize) -> Self {
        let bar = if ctx.use_fancy_output() {
            let bar = ProgressBar::new(total as u64);
            let template = format!(
                "  {{spinner:.blue}} {}  {{bar:20.blue/dim}} {{pos}}/{{len}} {{msg:.dim}}",
                verb
            );
            let bar_style = ProgressStyle::default_bar()
                .template(&template)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("━╸─");
            bar.set_style(bar_style);
            bar.enable_steady_tick(Duration::from_millis(120));
            Some(bar)
        } else {
            None
        };
        Self { bar }
    }

    /// Record one finished partition
    pub fn advance(&self, partition: &str, ok: bool) {
        match self.bar {
            Some(ref bar) => {
                bar.set_message(partition.to_string());
                bar.inc(1);
            }
            None if ok => println!("  {} {}", style("[OK]").green(), partition),
            None => println!("  {} {}", style("[FAIL]").red(), partition),
        }
    }

    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}
