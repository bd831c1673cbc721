//! Sweep progress notification

/// Receives one notification per completed sweep step
pub trait ProgressReporter {
    /// Step `step` (1-based) of `total` has finished
    fn step(&mut self, step: usize, total: usize);
}

impl<F> ProgressReporter for F
where
    F: FnMut(usize, usize),
{
    fn step(&mut self, step: usize, total: usize) {
        self(step, total)
    }
}

/// Reporter that ignores progress
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn step(&mut self, _step: usize, _total: usize) {}
}
