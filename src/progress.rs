use indicatif::ProgressBar;

/// Collaborator through which the reconstruction engine reports progress and
/// polls for cooperative cancellation. The engine calls `set_maximum` and
/// `set_progress` at the start of each unit of work, ticks `increment` as the
/// work advances, and checks `is_cancelled` at least once per recursive
/// expansion call. Returning true from `is_cancelled` makes the engine stop
/// at the next check and surface `RazorError::Cancelled`; no partial results
/// are discarded by the expansion itself, so a working matrix grown in place
/// still holds every vertex appended before that check.
pub trait ProgressListener {
    fn set_maximum(&mut self, maximum: usize);

    fn set_progress(&mut self, progress: usize);

    fn increment(&mut self);

    fn is_cancelled(&self) -> bool {
        false
    }
}

/// A listener that ignores all progress reports and never cancels. Use this
/// when no progress reporting is wanted.
#[derive(Debug, Clone, Default)]
pub struct NoProgress;

impl ProgressListener for NoProgress {
    fn set_maximum(&mut self, _maximum: usize) {}

    fn set_progress(&mut self, _progress: usize) {}

    fn increment(&mut self) {}
}

impl ProgressListener for ProgressBar {
    fn set_maximum(&mut self, maximum: usize) {
        self.set_length(maximum as u64);
    }

    fn set_progress(&mut self, progress: usize) {
        self.set_position(progress as u64);
    }

    fn increment(&mut self) {
        self.inc(1);
    }
}
