//! Exponential approach towards a target.
//!
//! The authored rates are "fraction of remaining distance per frame". In
//! [`SmoothingMode::PerFrame`] they are applied as-is every frame, which ties
//! convergence speed to the refresh rate. [`SmoothingMode::TimeScaled`]
//! rescales them by the elapsed time so a 120 Hz display converges as fast
//! as a 60 Hz one.

use glam::Vec3;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SmoothingMode {
    #[default]
    PerFrame,
    TimeScaled { reference_hz: f32 },
}

impl SmoothingMode {
    /// Effective fraction for this frame given the authored per-frame rate.
    #[inline]
    pub fn factor(self, rate: f32, dt_sec: f32) -> f32 {
        let rate = rate.clamp(0.0, 1.0);
        match self {
            SmoothingMode::PerFrame => rate,
            SmoothingMode::TimeScaled { reference_hz } => {
                let frames = (dt_sec.max(0.0) * reference_hz).min(MAX_CATCH_UP_FRAMES);
                1.0 - (1.0 - rate).powf(frames)
            }
        }
    }

    /// Number of reference frames `dt_sec` stands for.
    #[inline]
    pub fn frame_scale(self, dt_sec: f32) -> f32 {
        match self {
            SmoothingMode::PerFrame => 1.0,
            SmoothingMode::TimeScaled { reference_hz } => {
                (dt_sec.max(0.0) * reference_hz).min(MAX_CATCH_UP_FRAMES)
            }
        }
    }
}

/// Upper bound on frames of catch-up after a long stall.
const MAX_CATCH_UP_FRAMES: f32 = 30.0;

#[inline]
pub fn approach(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

#[inline]
pub fn approach_vec3(current: Vec3, target: Vec3, factor: f32) -> Vec3 {
    current + (target - current) * factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_scaled_matches_per_frame_at_reference_rate() {
        let mode = SmoothingMode::TimeScaled { reference_hz: 60.0 };
        let f = mode.factor(0.08, 1.0 / 60.0);
        assert!((f - 0.08).abs() < 1e-5);
    }

    #[test]
    fn time_scaled_two_half_frames_equal_one_full_frame() {
        let mode = SmoothingMode::TimeScaled { reference_hz: 60.0 };
        let half = mode.factor(0.1, 1.0 / 120.0);
        let mut v = 0.0;
        v = approach(v, 1.0, half);
        v = approach(v, 1.0, half);
        let full = approach(0.0, 1.0, mode.factor(0.1, 1.0 / 60.0));
        assert!((v - full).abs() < 1e-5);
    }

    #[test]
    fn approach_converges_monotonically_without_overshoot() {
        for &rate in &[0.03_f32, 0.06, 0.08, 0.5] {
            for &(start, target) in &[(0.0_f32, 0.22_f32), (1.0, 0.01)] {
                let mut v = start;
                let mut gap = (target - v).abs();
                for _ in 0..2000 {
                    v = approach(v, target, rate);
                    let next_gap = (target - v).abs();
                    assert!(next_gap <= gap);
                    // never crosses to the other side of the target
                    assert!((target - v) * (target - start) >= 0.0);
                    gap = next_gap;
                }
                assert!(gap < 1e-5, "rate {rate}: gap {gap}");
            }
        }
    }

    #[test]
    fn approach_vec3_closes_the_same_fraction_per_axis() {
        let v = approach_vec3(Vec3::ZERO, Vec3::new(1.0, -2.0, 4.0), 0.25);
        assert!((v - Vec3::new(0.25, -0.5, 1.0)).length() < 1e-6);
    }

    #[test]
    fn zero_dt_does_not_move() {
        let mode = SmoothingMode::TimeScaled { reference_hz: 60.0 };
        assert_eq!(mode.factor(0.5, 0.0), 0.0);
    }
}
