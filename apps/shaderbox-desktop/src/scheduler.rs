use shaderbox_frame::{FrameRequest, FrameScheduler};

/// Maps frame requests onto window redraws.
///
/// At most one request is outstanding; the next `RedrawRequested` fires it.
pub struct RedrawScheduler {
    redraw: Box<dyn Fn()>,
    next: u64,
    pending: Option<FrameRequest>,
}

impl RedrawScheduler {
    pub fn new(redraw: impl Fn() + 'static) -> Self {
        Self {
            redraw: Box::new(redraw),
            next: 0,
            pending: None,
        }
    }

    /// The request this redraw answers, if the driver asked for one.
    pub fn fire(&mut self) -> Option<FrameRequest> {
        self.pending.take()
    }
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.next += 1;
        let request = FrameRequest::from_raw(self.next);
        self.pending = Some(request);
        (self.redraw)();
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn request_asks_for_redraw_and_fires_once() {
        let redraws = Rc::new(Cell::new(0));
        let counter = redraws.clone();
        let mut scheduler = RedrawScheduler::new(move || counter.set(counter.get() + 1));

        let request = scheduler.request_frame();
        assert_eq!(redraws.get(), 1);
        assert_eq!(scheduler.fire(), Some(request));
        assert_eq!(scheduler.fire(), None);
    }

    #[test]
    fn cancel_only_drops_matching_request() {
        let mut scheduler = RedrawScheduler::new(|| {});
        let old = scheduler.request_frame();
        let current = scheduler.request_frame();
        scheduler.cancel_frame(old);
        assert_eq!(scheduler.fire(), Some(current));

        let request = scheduler.request_frame();
        scheduler.cancel_frame(request);
        assert_eq!(scheduler.fire(), None);
    }
}
