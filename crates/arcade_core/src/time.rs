//! Fixed-timestep clock.
//!
//! Real frame time is fed in with `advance`; the simulation then pulls whole
//! `fixed_dt` slices out with `should_step` until less than one slice is
//! left. All bookkeeping is in `Duration` so the slice count for a given
//! sequence of frame deltas never depends on float rounding.

use std::time::Duration;

/// Length of one simulation slice (1/60 s, rounded to whole microseconds).
pub const FIXED_DT: Duration = Duration::from_micros(16_667);

/// A single real frame never feeds more than this into the accumulator.
pub const MAX_FRAME_DT: Duration = Duration::from_millis(250);

const SMOOTHING_WINDOW: usize = 60;

/// Moving average of the last `SMOOTHING_WINDOW` frame deltas.
struct FrameWindow {
    samples: [Duration; SMOOTHING_WINDOW],
    next: usize,
    sum: Duration,
}

impl FrameWindow {
    fn filled_with(dt: Duration) -> Self {
        Self {
            samples: [dt; SMOOTHING_WINDOW],
            next: 0,
            sum: dt * SMOOTHING_WINDOW as u32,
        }
    }

    fn push(&mut self, dt: Duration) {
        self.sum = self.sum - self.samples[self.next] + dt;
        self.samples[self.next] = dt;
        self.next = (self.next + 1) % SMOOTHING_WINDOW;
    }

    fn mean_secs(&self) -> f64 {
        self.sum.as_secs_f64() / SMOOTHING_WINDOW as f64
    }
}

pub struct TimeState {
    pub fixed_dt: Duration,
    pub max_frame_dt: Duration,
    /// Simulated time: the sum of all slices taken.
    pub total_time: Duration,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    /// This frame's delta after capping.
    pub real_dt: Duration,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
    pending: Duration,
    window: FrameWindow,
}

impl TimeState {
    pub fn new() -> Self {
        Self::with_fixed_dt(FIXED_DT)
    }

    pub fn with_fixed_dt(fixed_dt: Duration) -> Self {
        let window = FrameWindow::filled_with(fixed_dt);
        let mut time = Self {
            fixed_dt,
            max_frame_dt: MAX_FRAME_DT,
            total_time: Duration::ZERO,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: Duration::ZERO,
            smoothed_fps: 0.0,
            smoothed_frame_time_ms: 0.0,
            pending: Duration::ZERO,
            window,
        };
        time.refresh_smoothing();
        time
    }

    /// Start a frame that took `real_dt` of real time.
    pub fn advance(&mut self, real_dt: Duration) {
        if real_dt > self.max_frame_dt {
            log::warn!(
                "Frame of {:.1}ms capped to {}ms",
                real_dt.as_secs_f64() * 1000.0,
                self.max_frame_dt.as_millis()
            );
        }
        self.real_dt = real_dt.min(self.max_frame_dt);
        self.pending += self.real_dt;
        self.frame_count += 1;
        self.steps_this_frame = 0;

        self.window.push(self.real_dt);
        self.refresh_smoothing();
    }

    /// Take one slice if a whole one is pending.
    pub fn should_step(&mut self) -> bool {
        let Some(rest) = self.pending.checked_sub(self.fixed_dt) else {
            return false;
        };
        self.pending = rest;
        self.total_time += self.fixed_dt;
        self.fixed_step_count += 1;
        self.steps_this_frame += 1;
        true
    }

    /// Leftover fraction of a slice, in `[0, 1)`.
    pub fn interpolation_alpha(&self) -> f64 {
        self.pending.as_secs_f64() / self.fixed_dt.as_secs_f64()
    }

    pub fn end_frame(&mut self) {
        log::trace!(
            "frame {}: {} step(s), alpha {:.3}",
            self.frame_count,
            self.steps_this_frame,
            self.interpolation_alpha()
        );
    }

    fn refresh_smoothing(&mut self) {
        let mean = self.window.mean_secs();
        self.smoothed_frame_time_ms = mean * 1000.0;
        self.smoothed_fps = if mean > 0.0 { mean.recip() } else { 0.0 };
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps_for(time: &mut TimeState, real_dt: Duration) -> u32 {
        time.advance(real_dt);
        while time.should_step() {}
        time.steps_this_frame
    }

    #[test]
    fn partial_slices_carry_over() {
        let mut time = TimeState::new();
        assert_eq!(steps_for(&mut time, Duration::from_millis(10)), 0);
        assert_eq!(steps_for(&mut time, Duration::from_millis(10)), 1);
        assert_eq!(time.fixed_step_count, 1);
        assert_eq!(time.frame_count, 2);
    }

    #[test]
    fn slow_frame_catches_up_in_one_go() {
        let mut time = TimeState::new();
        assert_eq!(steps_for(&mut time, FIXED_DT * 3 + Duration::from_micros(5)), 3);
        assert_eq!(time.total_time, FIXED_DT * 3);
        assert!(time.interpolation_alpha() > 0.0);
    }

    #[test]
    fn stalled_frame_is_capped() {
        let mut time = TimeState::new();
        // 250 ms holds 14 whole slices of 16.667 ms.
        assert_eq!(steps_for(&mut time, Duration::from_secs(3)), 14);
        assert_eq!(time.real_dt, MAX_FRAME_DT);
    }

    #[test]
    fn ten_seconds_of_exact_frames() {
        let mut time = TimeState::new();
        for _ in 0..600 {
            assert_eq!(steps_for(&mut time, FIXED_DT), 1);
        }
        assert_eq!(time.total_time, FIXED_DT * 600);
        assert_eq!(time.interpolation_alpha(), 0.0);
    }

    #[test]
    fn smoothing_starts_at_the_fixed_rate_and_follows_frames() {
        let mut time = TimeState::new();
        assert!((time.smoothed_fps - 60.0).abs() < 0.01);

        for _ in 0..30 {
            time.advance(Duration::from_millis(20));
        }
        // Half the window at 20 ms, half still at 16.667 ms.
        assert!((time.smoothed_frame_time_ms - 18.3335).abs() < 0.001);

        for _ in 0..30 {
            time.advance(Duration::from_millis(20));
        }
        assert!((time.smoothed_frame_time_ms - 20.0).abs() < 0.001);
        assert!((time.smoothed_fps - 50.0).abs() < 0.01);
    }
}
