use std::collections::VecDeque;

/// Handle for a pending "draw next frame" request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(u64);

impl FrameRequest {
    /// For schedulers that mint their own tokens.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Host-environment frame scheduling.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameRequest;

    /// Withdraws a request. Unknown or already-fired requests are ignored.
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Queue-backed scheduler for tests and headless runs. Frames fire only
/// when the owner pops them.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: u64,
    queue: VecDeque<FrameRequest>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The oldest outstanding request, removed from the queue.
    pub fn pop_due(&mut self) -> Option<FrameRequest> {
        self.queue.pop_front()
    }

    /// Outstanding requests, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = FrameRequest> + '_ {
        self.queue.iter().copied()
    }

    pub fn live(&self) -> usize {
        self.queue.len()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.next += 1;
        let request = FrameRequest(self.next);
        self.queue.push_back(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.queue.retain(|r| *r != request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_are_unique_and_fifo() {
        let mut s = ManualScheduler::new();
        let a = s.request_frame();
        let b = s.request_frame();
        assert_ne!(a, b);
        assert_eq!(s.pop_due(), Some(a));
        assert_eq!(s.pop_due(), Some(b));
        assert_eq!(s.pop_due(), None);
    }

    #[test]
    fn cancel_removes_only_that_request() {
        let mut s = ManualScheduler::new();
        let a = s.request_frame();
        let b = s.request_frame();
        s.cancel_frame(a);
        s.cancel_frame(FrameRequest::from_raw(99));
        assert_eq!(s.pending().collect::<Vec<_>>(), vec![b]);
    }
}
