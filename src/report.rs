//! Progress and status reporting.
//!
//! Components receive a `&dyn Reporter` instead of writing to the console
//! themselves, so the same code runs under the CLI, in tests, or headless.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::cell::RefCell;

pub trait Reporter {
    /// A one-off status line.
    fn message(&self, text: &str);

    /// Begin a run of `total` steps.
    fn start(&self, label: &str, total: usize);

    /// One step of the current run finished.
    fn step(&self, detail: &str);

    fn finish(&self);
}

/// Forwards everything to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn message(&self, text: &str) {
        log::info!("{}", text);
    }

    fn start(&self, label: &str, total: usize) {
        log::info!("{} ({} steps)", label, total);
    }

    fn step(&self, detail: &str) {
        log::debug!("{}", detail);
    }

    fn finish(&self) {}
}

/// Renders runs as terminal progress bars. Runs may nest; each nested run
/// gets its own line.
pub struct ProgressReporter {
    multi: MultiProgress,
    bars: RefCell<Vec<ProgressBar>>,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: RefCell::new(Vec::new()),
        }
    }
}

impl Reporter for ProgressReporter {
    fn message(&self, text: &str) {
        // Above active bars when there are any, plain stdout otherwise.
        if self.bars.borrow().is_empty() || self.multi.println(text).is_err() {
            println!("{}", text);
        }
    }

    fn start(&self, label: &str, total: usize) {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>7}/{len:7} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ");
        let bar = self.multi.add(ProgressBar::new(total as u64));
        bar.set_style(style);
        bar.set_message(label.to_string());
        self.bars.borrow_mut().push(bar);
    }

    fn step(&self, detail: &str) {
        log::debug!("{}", detail);
        if let Some(bar) = self.bars.borrow().last() {
            bar.inc(1);
        }
    }

    fn finish(&self) {
        if let Some(bar) = self.bars.borrow_mut().pop() {
            bar.finish_and_clear();
            self.multi.remove(&bar);
        }
    }
}
