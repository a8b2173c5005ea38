//! Inverted-pendulum physics
//!
//! A rigid stick pivots at its center under user torque; a point-mass ball
//! rolls along it under the gravity component parallel to the stick. One call
//! to [`step`] advances exactly one fixed timestep. The function is pure:
//! identical (state, torque, profile) triples always yield identical output.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::profile::DifficultyProfile;

/// Per-attempt simulation state. Constructed neutral at game start, mutated
/// once per tick, discarded on reset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendulumState {
    /// Stick rotation, radians, clamped to ±π/3
    pub stick_angle: f32,
    pub stick_angular_velocity: f32,
    /// Ball offset along the stick, -1 (left tip) to 1 (right tip)
    pub ball_position: f32,
    pub ball_velocity: f32,
    /// Gravity-coupling multiplier, ≥ 1, raised by the ramp over time
    pub sensitivity: f32,
    /// Wall time spent in the running sub-state (drives the score)
    pub elapsed_active_ms: f64,
}

impl Default for PendulumState {
    fn default() -> Self {
        Self {
            stick_angle: 0.0,
            stick_angular_velocity: 0.0,
            ball_position: 0.0,
            ball_velocity: 0.0,
            sensitivity: 1.0,
            elapsed_active_ms: 0.0,
        }
    }
}

impl PendulumState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ball has reached a stick tip
    pub fn lost(&self) -> bool {
        self.ball_position.abs() >= 1.0
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_active_ms / 1000.0
    }

    /// Survival score: ten points per second, truncated. Monotonic in
    /// elapsed time; zero for an attempt that never engaged.
    pub fn score(&self) -> i64 {
        (self.elapsed_secs() * 10.0).floor() as i64
    }
}

/// Result of one physics step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub state: PendulumState,
    /// Edge-triggered: true on the step that crossed |position| = 1
    pub lost: bool,
}

/// Advance one fixed timestep.
///
/// A state that already lost is frozen: the input state is returned
/// unchanged with the loss flag still set.
pub fn step(
    state: &PendulumState,
    control_torque: f32,
    profile: &DifficultyProfile,
) -> StepOutcome {
    if state.lost() {
        return StepOutcome {
            state: *state,
            lost: true,
        };
    }

    let stick_len_m = profile.stick_length / RENDER_UNITS_PER_METER;
    let stick_inertia = (1.0 / 12.0) * STICK_MASS * stick_len_m * stick_len_m;
    let angular_acceleration = control_torque / stick_inertia.max(MIN_STICK_INERTIA);

    let mut angular_velocity = state.stick_angular_velocity + angular_acceleration * SIM_DT;
    angular_velocity *= ANGULAR_DAMPING;
    let stick_angle =
        (state.stick_angle + angular_velocity * SIM_DT).clamp(-MAX_STICK_ANGLE, MAX_STICK_ANGLE);

    let gravity_along_stick = GRAVITY * stick_angle.sin();
    let ball_acceleration = gravity_along_stick * state.sensitivity * BALL_COUPLING;

    let mut ball_velocity = state.ball_velocity + ball_acceleration * SIM_DT;
    ball_velocity *= BALL_DAMPING;
    let ball_position = state.ball_position + ball_velocity * SIM_DT;

    let next = PendulumState {
        stick_angle,
        stick_angular_velocity: angular_velocity,
        ball_position,
        ball_velocity,
        sensitivity: state.sensitivity,
        elapsed_active_ms: state.elapsed_active_ms,
    };
    StepOutcome {
        lost: next.lost(),
        state: next,
    }
}
