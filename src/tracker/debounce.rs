//! Frame-coalescing debouncer
//!
//! Any number of triggers between two frames collapse into one pending
//! run. The pending flag is released when the frame starts, before the work
//! runs, so a trigger that arrives during the work books a fresh frame.

/// Source of animation-frame callbacks
pub trait FrameClock {
    /// Ask for one frame callback; the host later calls back into the owner
    fn request_frame(&mut self);
}

#[derive(Debug, Default)]
pub struct FrameDebouncer {
    pending: bool,
}

impl FrameDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Book a frame unless one is already pending; returns whether one was booked
    pub fn schedule(&mut self, clock: &mut impl FrameClock) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        clock.request_frame();
        true
    }

    /// Frame callback entry: release the pending flag before any work runs
    ///
    /// Returns whether a run was pending; `false` means a stray frame.
    pub fn begin_frame(&mut self) -> bool {
        std::mem::replace(&mut self.pending, false)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

/// Clock that just counts requests; the caller decides when frames fire
#[derive(Debug, Default)]
pub struct ManualFrameClock {
    requested: usize,
    total: usize,
}

impl ManualFrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume outstanding frame requests; true if at least one was made
    pub fn take_frame(&mut self) -> bool {
        std::mem::replace(&mut self.requested, 0) > 0
    }

    /// Requests not yet consumed by [`take_frame`](Self::take_frame)
    pub fn outstanding(&self) -> usize {
        self.requested
    }

    /// Requests made over the clock's lifetime
    pub fn total_requests(&self) -> usize {
        self.total
    }
}

impl FrameClock for ManualFrameClock {
    fn request_frame(&mut self) {
        self.requested += 1;
        self.total += 1;
    }
}
