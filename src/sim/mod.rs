//! Deterministic balance simulation
//!
//! All gameplay physics lives here. This module must stay pure and
//! deterministic:
//! - Fixed timestep only
//! - No wall-clock reads inside a physics step
//! - No rendering or platform dependencies

pub mod clock;
pub mod input;
pub mod pendulum;
pub mod ramp;

pub use clock::LoopDriver;
pub use input::{ControlSample, DirKey, RawInput, SourceKind, arbitrate};
pub use pendulum::{PendulumState, StepOutcome, step};
pub use ramp::SensitivityRamp;
