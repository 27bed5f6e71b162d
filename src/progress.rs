// src/progress.rs
/// Progress reporting for long-running operations (batched fetches, jobs,
/// downloads). Frontends (GUI/CLI) implement this to surface status.
pub trait Progress: Send {
    /// Called at the start with the number of steps (if known).
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// `done` steps completed so far.
    fn advance(&mut self, _done: usize) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// Forwards status lines to the log (the CLI's stderr).
#[derive(Default)]
pub struct LogProgress {
    total: usize,
}

impl Progress for LogProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
    }
    fn log(&mut self, msg: &str) {
        logf!("{msg}");
    }
    fn advance(&mut self, done: usize) {
        logd!("{done}/{}", self.total);
    }
}
