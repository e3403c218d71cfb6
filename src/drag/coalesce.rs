//! At-most-once-per-frame work coalescing

/// Keeps only the latest value offered between two frames
///
/// Bursts of input events collapse into a single piece of work done on the
/// next frame.
#[derive(Debug)]
pub struct FrameCoalescer<T> {
    pending: Option<T>,
}

impl<T> Default for FrameCoalescer<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> FrameCoalescer<T> {
    /// Store `value` for the next frame; `true` when a frame must be requested
    pub fn offer(&mut self, value: T) -> bool {
        self.pending.replace(value).is_none()
    }

    /// Latest value since the previous frame
    pub fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
