//! Viewport reveal collaborator.

use crate::range::Range;
use std::sync::{Arc, Mutex};

/// Best-effort request to scroll a range into view. Nothing waits on the outcome.
pub trait Viewport {
    /// Reveal `range`; `centering` is the preferred vertical position (0.0 top, 1.0 bottom).
    fn scroll_range_into_view(&mut self, range: &Range, centering: f32);
}

/// Viewport that ignores reveal requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopViewport;

impl Viewport for NoopViewport {
    fn scroll_range_into_view(&mut self, _range: &Range, _centering: f32) {}
}

/// Viewport that remembers every reveal request; handy for hosts that scroll lazily.
///
/// Clones share the same log, so a host can keep one handle and give another to the editor.
#[derive(Debug, Clone, Default)]
pub struct RecordingViewport {
    requests: Arc<Mutex<Vec<(Range, f32)>>>,
}

impl RecordingViewport {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<(Range, f32)> {
        match self.requests.lock() {
            Ok(requests) => requests.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Drain the recorded requests.
    pub fn take_requests(&self) -> Vec<(Range, f32)> {
        match self.requests.lock() {
            Ok(mut requests) => std::mem::take(&mut *requests),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Viewport for RecordingViewport {
    fn scroll_range_into_view(&mut self, range: &Range, centering: f32) {
        let entry = (range.clone(), centering);
        match self.requests.lock() {
            Ok(mut requests) => requests.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_log() {
        let recorder = RecordingViewport::new();
        let mut handle = recorder.clone();
        handle.scroll_range_into_view(&Range::from_coords(1, 0, 1, 2), 0.5);

        assert_eq!(recorder.requests().len(), 1);
        assert_eq!(recorder.take_requests()[0].1, 0.5);
        assert!(handle.requests().is_empty());
    }
}
