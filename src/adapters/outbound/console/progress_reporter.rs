use crate::ports::outbound::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

const BAR_TEMPLATE: &str = "   {spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) - {msg}";

/// StderrProgressReporter adapter for reporting progress to stderr
///
/// This adapter implements the ProgressReporter port, writing progress
/// information to stderr so it doesn't interfere with the report on stdout.
/// The bar lives behind a mutex because annotation tasks advance it
/// concurrently.
pub struct StderrProgressReporter {
    progress_bar: Mutex<Option<ProgressBar>>,
}

impl StderrProgressReporter {
    pub fn new() -> Self {
        Self {
            progress_bar: Mutex::new(None),
        }
    }

    fn with_bar(&self, f: impl FnOnce(&mut Option<ProgressBar>)) {
        let mut guard = match self.progress_bar.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard);
    }
}

impl Default for StderrProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for StderrProgressReporter {
    fn start(&self, total: usize, label: &str) {
        self.with_bar(|slot| {
            if let Some(previous) = slot.take() {
                previous.finish_and_clear();
            }
            let bar = ProgressBar::new(total as u64);
            if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
                bar.set_style(style.progress_chars("=>-"));
            }
            bar.set_message(label.to_string());
            *slot = Some(bar);
        });
    }

    fn advance(&self, message: &str) {
        self.with_bar(|slot| {
            if let Some(bar) = slot.as_ref() {
                bar.set_message(message.to_string());
                bar.inc(1);
            }
        });
    }

    fn warn(&self, message: &str) {
        self.with_bar(|slot| match slot.as_ref() {
            Some(bar) => bar.println(format!("⚠️  {}", message)),
            None => eprintln!("⚠️  {}", message),
        });
    }

    fn finish(&self, summary: &str) {
        self.with_bar(|slot| {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        });
        eprintln!("✅ {}", summary);
    }
}
