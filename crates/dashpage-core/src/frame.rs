//! Display-frame scheduling.
//!
//! The drag engine never writes to the view directly from a pointer event.
//! It requests a frame and applies its latest target when the host reports
//! that frame as due, the way `requestAnimationFrame` works in a browser.

use std::collections::VecDeque;

/// Handle for one requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// Source of per-frame callbacks.
pub trait FrameScheduler {
    /// Ask for a callback on the next paint opportunity.
    fn request_frame(&mut self) -> FrameToken;

    /// Withdraw a previously requested callback.
    fn cancel_frame(&mut self, token: FrameToken);
}

/// Scheduler driven explicitly by the caller.
///
/// Requests queue up until [`advance`](Self::advance) is called, which
/// returns every token due in that frame.
#[derive(Debug, Default)]
pub struct ManualFrameScheduler {
    next_token: u64,
    pending: VecDeque<FrameToken>,
    frames_run: u64,
}

impl ManualFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Number of frames advanced so far.
    pub fn frames_run(&self) -> u64 {
        self.frames_run
    }

    /// Start a new frame and hand out every due token.
    pub fn advance(&mut self) -> Vec<FrameToken> {
        self.frames_run += 1;
        self.pending.drain(..).collect()
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn request_frame(&mut self) -> FrameToken {
        self.next_token += 1;
        let token = FrameToken(self.next_token);
        self.pending.push_back(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        self.pending.retain(|t| *t != token);
    }
}
