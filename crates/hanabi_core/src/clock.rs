//! Where a scene gets the time from, and how it waits for the next frame.
//!
//! Real displays use [`SystemClock`] and [`FixedRateScheduler`]. Tests and offline renders use
//! [`ManualClock`] and [`SteppedScheduler`], which make a whole show deterministic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The number of microseconds in a second.
pub const MICROSECONDS_PER_SECOND: u64 = 1_000_000;

/// A source of the current time.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// The real wall clock.
#[derive(Clone, Copy, Debug, Default)]
#[non_exhaustive]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    /// The instant that represents zero elapsed time.
    origin: Instant,
    /// How far the clock has been moved forward, in microseconds.
    offset: Arc<AtomicU64>,
}

impl ManualClock {
    /// Instantiate
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let micros = u64::try_from(by.as_micros()).unwrap_or(u64::MAX);
        self.offset.fetch_add(micros, Ordering::SeqCst);
    }

    /// The total time the clock has been moved forward by.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        Duration::from_micros(self.offset.load(Ordering::SeqCst))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}

/// Something that blocks until it's time to render the next frame.
pub trait FrameScheduler {
    /// Block until the next frame is due.
    fn wait_for_next_frame(&mut self);
}

/// Sleep the current thread so that frames are rendered at a target rate.
#[derive(Debug)]
pub struct FixedRateScheduler {
    /// The target frame rate.
    frame_rate: u32,
    /// The time at which the previous frame was rendererd.
    last_frame_tick: Instant,
}

impl FixedRateScheduler {
    /// Instantiate
    #[must_use]
    pub fn new(frame_rate: u32) -> Self {
        Self {
            frame_rate: frame_rate.max(1),
            last_frame_tick: Instant::now(),
        }
    }

    /// The time between frames.
    #[must_use]
    pub fn frame_duration(&self) -> Duration {
        Duration::from_micros(MICROSECONDS_PER_SECOND.wrapping_div(self.frame_rate.into()))
    }
}

impl FrameScheduler for FixedRateScheduler {
    fn wait_for_next_frame(&mut self) {
        if let Some(wait) = self
            .frame_duration()
            .checked_sub(self.last_frame_tick.elapsed())
        {
            std::thread::sleep(wait);
        }
        self.last_frame_tick = Instant::now();
    }
}

/// Advance a [`ManualClock`] by exactly one frame every time a frame is requested. Doesn't
/// sleep, so a whole show can be rendered as fast as the CPU allows.
#[derive(Clone, Debug)]
pub struct SteppedScheduler {
    /// The clock shared with the scene.
    clock: ManualClock,
    /// How much time passes per frame.
    frame: Duration,
}

impl SteppedScheduler {
    /// Instantiate
    #[must_use]
    pub const fn new(clock: ManualClock, frame: Duration) -> Self {
        Self { clock, frame }
    }
}

impl FrameScheduler for SteppedScheduler {
    fn wait_for_next_frame(&mut self) {
        self.clock.advance(self.frame);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let copy = clock.clone();
        let before = copy.now();
        clock.advance(Duration::from_millis(16));
        assert_eq!(copy.now() - before, Duration::from_millis(16));
        assert_eq!(copy.elapsed(), Duration::from_millis(16));
    }

    #[test]
    fn stepped_scheduler_advances_one_frame() {
        let clock = ManualClock::new();
        let mut scheduler = SteppedScheduler::new(clock.clone(), Duration::from_millis(10));
        scheduler.wait_for_next_frame();
        scheduler.wait_for_next_frame();
        assert_eq!(clock.elapsed(), Duration::from_millis(20));
    }

    #[test]
    fn frame_duration_from_rate() {
        let scheduler = FixedRateScheduler::new(50);
        assert_eq!(scheduler.frame_duration(), Duration::from_millis(20));
        let scheduler = FixedRateScheduler::new(0);
        assert_eq!(scheduler.frame_duration(), Duration::from_secs(1));
        assert_eq!(
            Duration::from_micros(MICROSECONDS_PER_SECOND),
            Duration::from_secs(1)
        );
    }
}
