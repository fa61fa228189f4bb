/// ProgressReporter port for long-running batch work.
///
/// Implementations must be `Send + Sync`: annotation tasks run concurrently
/// and advance the same reporter.
pub trait ProgressReporter: Send + Sync {
    /// Starts a phase with a known number of steps
    fn start(&self, total: usize, label: &str);

    /// Marks one step of the current phase as done
    fn advance(&self, message: &str);

    /// Reports a non-fatal problem without interrupting the phase
    fn warn(&self, message: &str);

    /// Ends the current phase with a summary line
    fn finish(&self, summary: &str);
}

/// Reporter that discards everything, for library callers with no UI
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgressReporter;

impl ProgressReporter for SilentProgressReporter {
    fn start(&self, _total: usize, _label: &str) {}
    fn advance(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn finish(&self, _summary: &str) {}
}
