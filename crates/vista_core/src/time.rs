//! Frame timing and the global animation angle.
//!
//! The runner owns one [`FrameClock`] and calls `tick()` at the top of every
//! frame.  The resulting [`FrameTime`] drives [`Spin`], which accumulates the
//! rotation angle applied to animated instances.

use std::time::Instant;

/// Largest step a single frame may advance, in seconds.  Long stalls
/// (window drags, breakpoints) are clamped to this.
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// A snapshot of timing information for the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous frame, clamped to [`MAX_FRAME_DELTA`].
    pub delta: f32,
    /// Seconds since the clock started.
    pub elapsed: f64,
    /// Index of this frame (0 for the first one).
    pub frame: u64,
}

impl FrameTime {
    #[inline]
    pub fn fps(&self) -> f32 {
        if self.delta > 0.0 {
            1.0 / self.delta
        } else {
            0.0
        }
    }
}

/// Stateful timer that produces [`FrameTime`] snapshots.
pub struct FrameClock {
    start: Instant,
    last_tick: Instant,
    frame: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            frame: 0,
        }
    }

    /// Advance by one frame.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let time = self.snapshot(now);
        self.last_tick = now;
        self.frame += 1;
        time
    }

    /// Current snapshot without advancing the frame counter.
    pub fn peek(&self) -> FrameTime {
        self.snapshot(Instant::now())
    }

    fn snapshot(&self, now: Instant) -> FrameTime {
        FrameTime {
            delta: (now - self.last_tick).as_secs_f32().min(MAX_FRAME_DELTA),
            elapsed: (now - self.start).as_secs_f64(),
            frame: self.frame,
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Global rotation angle of the animated instances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    /// Radians per second.
    pub speed: f32,
    angle: f32,
}

impl Default for Spin {
    fn default() -> Self {
        Self::new(std::f32::consts::FRAC_PI_6)
    }
}

impl Spin {
    pub fn new(speed: f32) -> Self {
        Self { speed, angle: 0.0 }
    }

    /// Advances by `delta` seconds and returns the new angle, wrapped to
    /// `[0, 2π)` so precision does not degrade over long sessions.
    pub fn advance(&mut self, delta: f32) -> f32 {
        self.angle = (self.angle + self.speed * delta).rem_euclid(std::f32::consts::TAU);
        self.angle
    }

    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_counts_frames_and_clamps_delta() {
        let mut clock = FrameClock::new();
        let first = clock.tick();
        let second = clock.tick();
        assert_eq!(first.frame, 0);
        assert_eq!(second.frame, 1);
        assert!(second.delta <= MAX_FRAME_DELTA);
        assert!(second.elapsed >= first.elapsed);
        assert_eq!(clock.peek().frame, 2);
    }

    #[test]
    fn spin_accumulates_and_wraps() {
        let mut spin = Spin::new(1.0);
        assert!((spin.advance(0.5) - 0.5).abs() < 1e-6);
        assert!((spin.advance(0.5) - 1.0).abs() < 1e-6);
        let wrapped = spin.advance(std::f32::consts::TAU);
        assert!((wrapped - 1.0).abs() < 1e-4);
        assert!(wrapped < std::f32::consts::TAU);
    }

    #[test]
    fn default_speed_is_a_twelfth_turn_per_second() {
        let mut spin = Spin::default();
        assert!((spin.advance(1.0) - std::f32::consts::FRAC_PI_6).abs() < 1e-6);
    }
}
