//! Move timing with a trapezoidal velocity profile
//!
//! Each move starts and ends at rest. The cruise velocity and acceleration
//! are bounded by the axis that reaches its limit first along the move
//! direction: with unit direction `u`,
//! `v = min(feed, maxfeed_i / |u_i|)` and `a = min(accel_i / |u_i|)`.
//! Junction blending between moves is not modelled.
//!
//! Limits that are missing, zero, negative or non-finite leave their axis
//! unconstrained. A rapid with no limited axis in motion runs at the active
//! feed.

use gcodemeter_core::{AxisKind, MachineLimits};

/// Displacements below this are treated as no motion
const MOTION_EPSILON: f64 = 1e-9;

/// Length of a move and the axis kind it was measured in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Displacement {
    /// Millimetres for linear moves, degrees for rotary-only moves
    pub distance: f64,
    /// True when any linear axis moves
    pub linear: bool,
}

/// Time for a rest-to-rest move of `distance` at `velocity` (units/s)
///
/// Without an acceleration limit the move runs at constant velocity.
pub fn trapezoid_time(distance: f64, velocity: f64, acceleration: Option<f64>) -> f64 {
    if distance <= 0.0 || velocity <= 0.0 || !velocity.is_finite() {
        return 0.0;
    }
    match acceleration {
        Some(accel) if accel > 0.0 && accel.is_finite() => {
            // Distance needed to reach cruise speed and stop again
            if distance >= velocity * velocity / accel {
                distance / velocity + velocity / accel
            } else {
                2.0 * (distance / accel).sqrt()
            }
        }
        _ => distance / velocity,
    }
}

fn usable(limit: Option<f64>) -> Option<f64> {
    limit.filter(|v| v.is_finite() && *v > 0.0)
}

/// Per-axis limits resolved once for a pass
#[derive(Debug, Clone)]
pub struct Kinematics {
    kinds: Vec<AxisKind>,
    max_feed: Vec<Option<f64>>,
    acceleration: Vec<Option<f64>>,
}

impl Kinematics {
    pub fn new(limits: &MachineLimits) -> Self {
        let count = limits.axes.len();
        Self {
            kinds: limits.axes.iter().map(|&a| AxisKind::of(a)).collect(),
            max_feed: (0..count).map(|i| usable(limits.max_feed_for(i))).collect(),
            acceleration: (0..count)
                .map(|i| usable(limits.acceleration_for(i)))
                .collect(),
        }
    }

    pub fn kind(&self, index: usize) -> Option<AxisKind> {
        self.kinds.get(index).copied()
    }

    /// Length of a move given per-axis deltas
    ///
    /// Measured over linear axes when any of them moves, otherwise over
    /// rotary axes. `None` when nothing moves.
    pub fn displacement(&self, deltas: &[f64]) -> Option<Displacement> {
        let norm = |kind: AxisKind| -> f64 {
            deltas
                .iter()
                .zip(&self.kinds)
                .filter(|(_, k)| **k == kind)
                .map(|(d, _)| d * d)
                .sum::<f64>()
                .sqrt()
        };

        let linear = norm(AxisKind::Linear);
        if linear > MOTION_EPSILON {
            return Some(Displacement {
                distance: linear,
                linear: true,
            });
        }
        let rotary = norm(AxisKind::Rotary);
        (rotary > MOTION_EPSILON).then_some(Displacement {
            distance: rotary,
            linear: false,
        })
    }

    /// Seconds for a straight move
    ///
    /// `feed` is in units/min of the displacement. Rapids run at the
    /// binding feed limit when limits exist, otherwise at `feed`.
    pub fn straight_move_time(
        &self,
        deltas: &[f64],
        displacement: Displacement,
        feed: f64,
        rapid: bool,
    ) -> f64 {
        let distance = displacement.distance;
        let mut velocity = if rapid { f64::INFINITY } else { feed / 60.0 };
        let mut acceleration: Option<f64> = None;

        for (i, delta) in deltas.iter().enumerate() {
            let share = delta.abs() / distance;
            if share <= MOTION_EPSILON {
                continue;
            }
            if let Some(max) = self.max_feed.get(i).copied().flatten() {
                velocity = velocity.min(max / 60.0 / share);
            }
            if let Some(accel) = self.acceleration.get(i).copied().flatten() {
                let limit = accel / share;
                acceleration = Some(acceleration.map_or(limit, |a| a.min(limit)));
            }
        }
        if velocity.is_infinite() {
            velocity = feed / 60.0;
        }

        trapezoid_time(distance, velocity, acceleration)
    }

    /// Seconds for an arc of `length`, bounded by its in-plane axes
    pub fn arc_move_time(&self, length: f64, plane_axes: &[usize], feed: f64, rapid: bool) -> f64 {
        let mut velocity = if rapid { f64::INFINITY } else { feed / 60.0 };
        let mut acceleration: Option<f64> = None;

        for &i in plane_axes {
            if let Some(max) = self.max_feed.get(i).copied().flatten() {
                velocity = velocity.min(max / 60.0);
            }
            if let Some(accel) = self.acceleration.get(i).copied().flatten() {
                acceleration = Some(acceleration.map_or(accel, |a| a.min(accel)));
            }
        }
        if velocity.is_infinite() {
            velocity = feed / 60.0;
        }

        trapezoid_time(length, velocity, acceleration)
    }
}
