use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// How a filter invocation ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterOutcome {
    /// All phases ran to completion and the volume holds the result.
    Completed,
    /// Cancellation was requested. The volume is left in an intermediate
    /// state with scratch labels still present and must be discarded.
    Aborted,
}

impl FilterOutcome {
    /// Whether the invocation was cancelled.
    pub fn is_aborted(&self) -> bool {
        *self == FilterOutcome::Aborted
    }
}

/// Progress reporting and cancellation hooks for a running filter.
///
/// Reported fractions are monotonically non-decreasing within one
/// invocation, never exceed 1.0 and reach 1.0 on successful completion.
/// The stop predicate is polled once per z-slice; once it returns true the
/// filter returns [`FilterOutcome::Aborted`] without finishing the
/// remaining slices.
pub trait FilterMonitor {
    /// Receive an updated completion fraction in `[0, 1]`.
    fn update_progress(&mut self, fraction: f32);

    /// Whether cancellation has been requested.
    fn should_stop(&self) -> bool;
}

/// Monitor that discards progress and never requests a stop.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullMonitor;

impl FilterMonitor for NullMonitor {
    fn update_progress(&mut self, _fraction: f32) {}

    fn should_stop(&self) -> bool {
        false
    }
}

/// Cancellation flag shareable with the thread driving a filter.
///
/// Clone the handle, pass one copy to the filter as its monitor and keep
/// the other; calling [`AbortHandle::abort`] from any thread makes the
/// filter stop at the next z-slice boundary.
#[derive(Clone, Debug, Default)]
pub struct AbortHandle {
    flag: Arc<AtomicBool>,
}

impl AbortHandle {
    /// Create a handle with the flag cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn abort(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

impl FilterMonitor for AbortHandle {
    fn update_progress(&mut self, _fraction: f32) {}

    fn should_stop(&self) -> bool {
        self.is_aborted()
    }
}

/// Progress share of the first of two stages, weighted by radius so a
/// heavier stage owns a proportionally larger segment of the bar.
pub(crate) fn stage_span(first: u8, second: u8) -> f32 {
    let total = first as f32 + second as f32;
    if total > 0.0 {
        first as f32 / total
    } else {
        0.5
    }
}

/// Maps the local progress of one pass into a `[start, start + span]`
/// segment of the overall invocation, throttling reports to steps of at
/// least 0.02.
pub(crate) struct ProgressTracker {
    start: f32,
    span: f32,
    last: f32,
}

impl ProgressTracker {
    const STEP: f32 = 0.02;

    pub(crate) fn new(start: f32, span: f32) -> Self {
        Self {
            start,
            span,
            last: start,
        }
    }

    /// Report `local` completion of this segment if it advanced enough.
    pub(crate) fn advance(&mut self, monitor: &mut dyn FilterMonitor, local: f32) {
        let overall = (self.start + self.span * local.clamp(0.0, 1.0)).min(1.0);
        if self.last + Self::STEP < overall {
            self.last = overall;
            monitor.update_progress(overall);
        }
    }

    /// Report the end of the segment, bypassing the throttle. Does nothing
    /// if the end was already reported, so zero-span segments stay silent.
    pub(crate) fn finish(&mut self, monitor: &mut dyn FilterMonitor) {
        let mut end = (self.start + self.span).min(1.0);
        // rounding in the span split can leave the final segment one ulp
        // short of a full bar
        if end > 1.0 - f32::EPSILON {
            end = 1.0;
        }
        if end > self.last {
            self.last = end;
            monitor.update_progress(end);
        }
    }
}
