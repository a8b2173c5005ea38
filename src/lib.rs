//! Mini Arcade - simulation core for a set of browser mini-games
//!
//! Core modules:
//! - `sim`: Deterministic pendulum simulation (input arbitration, physics, ramp)
//! - `phase`: Generic attempt lifecycle state machine with owned timers
//! - `games`: Per-game behavior behind a single capability trait
//! - `session`: Score records and the fire-and-forget recording boundary
//! - `platform`: Browser/native platform abstraction (time, logging)

pub mod games;
pub mod phase;
pub mod platform;
pub mod profile;
pub mod sched;
pub mod session;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use phase::{Phase, PhaseError, PhaseMachine};
pub use profile::{Difficulty, DifficultyProfile};
pub use session::{GameType, ScoreRecord, SessionSink};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, frame-rate independent)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Gravitational acceleration (m/s²)
    pub const GRAVITY: f32 = 9.81;
    /// Stick mass (kg)
    pub const STICK_MASS: f32 = 0.02;
    /// Render-space units per meter (stick lengths are given in pixels)
    pub const RENDER_UNITS_PER_METER: f32 = 100.0;
    /// Floor on stick inertia to keep angular acceleration finite
    pub const MIN_STICK_INERTIA: f32 = 0.001;
    /// Multiplicative angular velocity damping per step (friction)
    pub const ANGULAR_DAMPING: f32 = 0.95;
    /// Multiplicative ball velocity damping per step (rolling friction)
    pub const BALL_DAMPING: f32 = 0.97;
    /// Coupling between gravity-along-stick and ball acceleration
    pub const BALL_COUPLING: f32 = 0.4;
    /// Hard clamp on stick tilt (radians)
    pub const MAX_STICK_ANGLE: f32 = std::f32::consts::FRAC_PI_3;

    /// Sensitivity increment per ramp interval
    pub const SENSITIVITY_STEP: f32 = 0.2;
    /// Touch torque scale relative to the keyboard max torque
    pub const TOUCH_TORQUE_FACTOR: f32 = 3.0;

    /// Left-key hold acceleration: rate and cap
    pub const LEFT_KEY_ACCEL_RATE: f32 = 0.5;
    pub const LEFT_KEY_ACCEL_CAP: f32 = 1.5;
    /// Right-key hold acceleration: rate and cap (intentionally not symmetric
    /// with the left key; see DESIGN.md)
    pub const RIGHT_KEY_ACCEL_RATE: f32 = 0.8;
    pub const RIGHT_KEY_ACCEL_CAP: f32 = 2.0;

    /// Pre-game countdown ticks and cadence
    pub const COUNTDOWN_TICKS: u32 = 3;
    pub const COUNTDOWN_INTERVAL_MS: f64 = 1000.0;

    /// Memory stage clock cadence (seconds granularity)
    pub const STAGE_TICK_MS: f64 = 1000.0;
    /// Typing clock cadence (tenths of a second)
    pub const TYPING_TICK_MS: f64 = 100.0;
    /// Evaluating reveal duration before results (memory game)
    pub const EVALUATE_REVEAL_MS: f64 = 2000.0;
}

/// Clamp a normalized input coordinate to [-1, 1]; NaN collapses to 0
#[inline]
pub fn clamp_norm(x: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.clamp(-1.0, 1.0) }
}
