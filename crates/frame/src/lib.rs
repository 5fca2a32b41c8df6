//! Frame loop: clock, frame scheduling and the animation driver.
//!
//! # Invariants
//! - At most one frame request is live at any time.
//! - `Clock::elapsed_seconds` never decreases once started.
//! - A frame body that fails is logged and reported; scheduling continues.
//! - A failing animation does not stop the others or the render.
//! - Per-tick animation steps are fixed increments, not scaled by frame time.

mod clock;
mod driver;
mod scheduler;
mod timer;

pub use clock::{Clock, ClockError, ManualTime, MonotonicTime, TimeSource};
pub use driver::{Animation, AnimationDriver, DriverState, FrameError, FrameOutcome};
pub use scheduler::{FrameRequest, FrameScheduler, ManualScheduler};
pub use timer::FrameTimer;
