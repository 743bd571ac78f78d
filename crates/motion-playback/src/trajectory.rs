//! Straight-line joint-space trajectories with distance-scaled timing.
//!
//! A move is planned in two stages. [`PlaybackPlan::compute`] looks at the largest single
//! joint displacement and scales both the duration and the number of interpolation steps
//! against a reference distance: short hops finish quickly with fewer waypoints, long
//! sweeps use the full configured duration. [`interpolate`] then produces the evenly
//! weighted waypoints, whose first and last entries are exactly the start and the goal.

use crate::{MotionProfile, PlaybackError, Result};
use serde::Serialize;
use std::time::Duration;

/// Minimum fraction of the configured step count used for any move.
pub const MIN_STEP_SCALE: f64 = 0.1;

/// Timing of a single move, derived from its distance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlaybackPlan {
    /// Largest absolute joint displacement of the move.
    pub max_delta: f64,
    /// Fraction of the reference motion covered, clamped to `[0, 1]`.
    pub scale: f64,
    /// Number of interpolation steps (waypoints after the start).
    pub steps: usize,
    /// Total motion duration in seconds.
    pub duration_s: f64,
    /// Pause after each streamed waypoint, in seconds.
    pub delay_per_step_s: f64,
}

impl PlaybackPlan {
    pub fn compute(profile: &MotionProfile, current: &[f64], target: &[f64]) -> Result<Self> {
        check_dimensions(current, target)?;

        let max_delta = current
            .iter()
            .zip(target)
            .map(|(c, t)| (t - c).abs())
            .fold(0.0_f64, f64::max);

        let reference = if profile.reference_motion > 0.0 {
            profile.reference_motion
        } else if max_delta > 0.0 {
            max_delta
        } else {
            1.0
        };
        let scale = if reference != 0.0 {
            (max_delta / reference).min(1.0)
        } else {
            0.0
        };

        let duration_s = profile.min_duration_s.max(profile.base_duration_s * scale);
        let step_scale = scale.max(MIN_STEP_SCALE);
        // Half-way cases round to even, so 2.5 steps becomes 2.
        let scaled = (profile.steps as f64 * step_scale).round_ties_even();
        let steps = (scaled as usize).max(1);
        let delay_per_step_s = duration_s / steps.max(1) as f64;

        Ok(Self {
            max_delta,
            scale,
            steps,
            duration_s,
            delay_per_step_s,
        })
    }

    pub fn delay_per_step(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_per_step_s).unwrap_or_default()
    }

    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.duration_s).unwrap_or_default()
    }
}

/// Linearly interpolate from `current` to `target` in `steps` equal increments.
///
/// Returns `steps + 1` waypoints, or just `[current, target]` when `steps` is zero.
/// Every waypoint stays between its start and goal, and joints that do not move keep
/// their start value bit for bit.
pub fn interpolate(current: &[f64], target: &[f64], steps: usize) -> Result<Vec<Vec<f64>>> {
    check_dimensions(current, target)?;
    if steps == 0 {
        return Ok(vec![current.to_vec(), target.to_vec()]);
    }

    let mut path: Vec<Vec<f64>> = (0..steps)
        .map(|i| {
            let w = i as f64 / steps as f64;
            current
                .iter()
                .zip(target)
                .map(|(&c, &t)| lerp(c, t, w))
                .collect()
        })
        .collect();
    path.push(target.to_vec());
    Ok(path)
}

fn lerp(c: f64, t: f64, w: f64) -> f64 {
    if c == t {
        return c;
    }
    (c + w * (t - c)).clamp(c.min(t), c.max(t))
}

fn check_dimensions(current: &[f64], target: &[f64]) -> Result<()> {
    if current.len() != target.len() {
        return Err(PlaybackError::DimensionMismatch {
            current: current.len(),
            target: target.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> MotionProfile {
        MotionProfile {
            base_duration_s: 2.0,
            min_duration_s: 0.6,
            reference_motion: 1.0,
            steps: 30,
        }
    }

    #[test]
    fn test_endpoints_are_exact() {
        let start = [0.1, -0.7, 1.3];
        let end = [2.9, 0.3, -1.1];
        for steps in [1, 2, 3, 7, 30, 101] {
            let path = interpolate(&start, &end, steps).unwrap();
            assert_eq!(path.len(), steps + 1);
            assert_eq!(path[0], start.to_vec());
            assert_eq!(path[steps], end.to_vec());
        }
    }

    #[test]
    fn test_zero_steps_is_a_jump() {
        let path = interpolate(&[0.0, 0.0], &[1.0, 1.0], 0).unwrap();
        assert_eq!(path, vec![vec![0.0, 0.0], vec![1.0, 1.0]]);
    }

    #[test]
    fn test_waypoints_are_monotonic() {
        let path = interpolate(&[0.0, 1.0], &[1.0, -1.0], 10).unwrap();
        for pair in path.windows(2) {
            assert!(pair[1][0] >= pair[0][0]);
            assert!(pair[1][1] <= pair[0][1]);
        }
        assert!((path[5][0] - 0.5).abs() < 1e-12);
        assert!(path[5][1].abs() < 1e-12);
    }

    #[test]
    fn test_stationary_path() {
        let here = [0.4, 0.4, 0.4];
        let path = interpolate(&here, &here, 5).unwrap();
        assert!(path.iter().all(|p| p == &here.to_vec()));
    }

    #[test]
    fn test_stationary_joints_never_drift() {
        for k in 1..200 {
            let c = k as f64 * 0.0173;
            for steps in [3, 7, 30] {
                let path = interpolate(&[c, -c], &[c, -c], steps).unwrap();
                for p in &path {
                    assert_eq!(p, &vec![c, -c], "value {c} with {steps} steps");
                }
            }
        }
    }

    #[test]
    fn test_waypoints_stay_between_endpoints() {
        for k in 1..100 {
            let c = k as f64 * 0.0173;
            let t = c + k as f64 * 0.0311;
            for steps in [3, 7, 30] {
                for p in interpolate(&[c, t], &[t, c], steps).unwrap() {
                    assert!(p[0] >= c && p[0] <= t);
                    assert!(p[1] >= c && p[1] <= t);
                }
            }
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        assert!(matches!(
            interpolate(&[0.0], &[0.0, 1.0], 3),
            Err(PlaybackError::DimensionMismatch {
                current: 1,
                target: 2
            })
        ));
        assert!(matches!(
            PlaybackPlan::compute(&profile(), &[0.0, 0.0, 0.0], &[0.0]),
            Err(PlaybackError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_zero_distance_plan() {
        let plan = PlaybackPlan::compute(&profile(), &[0.3, 0.3], &[0.3, 0.3]).unwrap();
        assert_eq!(plan.max_delta, 0.0);
        assert_eq!(plan.scale, 0.0);
        assert_eq!(plan.steps, 3);
        assert_eq!(plan.duration_s, 0.6);
        assert!((plan.delay_per_step_s - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_zero_distance_never_below_one_step() {
        let mut p = profile();
        p.steps = 4;
        let plan = PlaybackPlan::compute(&p, &[0.0], &[0.0]).unwrap();
        assert_eq!(plan.steps, 1);
    }

    #[test]
    fn test_half_reference_distance() {
        let plan = PlaybackPlan::compute(&profile(), &[0.0, 0.0], &[0.5, -0.25]).unwrap();
        assert_eq!(plan.max_delta, 0.5);
        assert_eq!(plan.scale, 0.5);
        assert_eq!(plan.steps, 15);
        assert!((plan.duration_s - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_long_move_uses_full_profile() {
        let plan = PlaybackPlan::compute(&profile(), &[0.0], &[3.0]).unwrap();
        assert_eq!(plan.scale, 1.0);
        assert_eq!(plan.steps, 30);
        assert_eq!(plan.duration_s, 2.0);
        assert!((plan.delay_per_step_s - 2.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_short_move_clamped_to_min_duration() {
        let plan = PlaybackPlan::compute(&profile(), &[0.0], &[0.1]).unwrap();
        assert_eq!(plan.duration_s, 0.6);
        assert_eq!(plan.steps, 3);
    }

    #[test]
    fn test_steps_round_half_to_even() {
        let mut p = profile();
        p.steps = 25;
        // 25 * 0.1 = 2.5 steps
        let plan = PlaybackPlan::compute(&p, &[0.0], &[0.0]).unwrap();
        assert_eq!(plan.steps, 2);
    }

    #[test]
    fn test_non_positive_reference_uses_own_distance() {
        let mut p = profile();
        p.reference_motion = 0.0;
        let plan = PlaybackPlan::compute(&p, &[0.0], &[0.05]).unwrap();
        assert_eq!(plan.scale, 1.0);
        assert_eq!(plan.steps, 30);

        let still = PlaybackPlan::compute(&p, &[0.0], &[0.0]).unwrap();
        assert_eq!(still.scale, 0.0);
    }

    #[test]
    fn test_delay_as_duration() {
        let plan = PlaybackPlan::compute(&profile(), &[0.0], &[3.0]).unwrap();
        assert_eq!(plan.duration(), Duration::from_secs(2));
        assert!(plan.delay_per_step() > Duration::from_millis(66));
        assert!(plan.delay_per_step() < Duration::from_millis(67));
    }
}
