use std::collections::VecDeque;
use std::time::Duration;

const WINDOW: usize = 120;

/// Rolling frame-time statistics for instrumentation.
#[derive(Debug, Clone, Default)]
pub struct FrameTimer {
    samples: VecDeque<Duration>,
    total_frames: u64,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, frame_time: Duration) {
        if self.samples.len() == WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(frame_time);
        self.total_frames += 1;
    }

    pub fn last(&self) -> Option<Duration> {
        self.samples.back().copied()
    }

    /// Mean over the recent window.
    pub fn average(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: Duration = self.samples.iter().sum();
        Some(sum / self.samples.len() as u32)
    }

    /// Frames per second implied by the recent average; `0.0` with no data.
    pub fn fps(&self) -> f64 {
        match self.average() {
            Some(avg) if !avg.is_zero() => 1.0 / avg.as_secs_f64(),
            _ => 0.0,
        }
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_timer() {
        let t = FrameTimer::new();
        assert_eq!(t.fps(), 0.0);
        assert!(t.last().is_none());
    }

    #[test]
    fn fps_from_average() {
        let mut t = FrameTimer::new();
        t.record(Duration::from_millis(10));
        t.record(Duration::from_millis(30));
        assert_eq!(t.average(), Some(Duration::from_millis(20)));
        assert!((t.fps() - 50.0).abs() < 1e-9);
        assert_eq!(t.last(), Some(Duration::from_millis(30)));
    }

    #[test]
    fn window_is_bounded() {
        let mut t = FrameTimer::new();
        for _ in 0..WINDOW {
            t.record(Duration::from_millis(100));
        }
        for _ in 0..WINDOW {
            t.record(Duration::from_millis(10));
        }
        assert_eq!(t.average(), Some(Duration::from_millis(10)));
        assert_eq!(t.total_frames(), 2 * WINDOW as u64);
    }
}
