//! Input arbitration
//!
//! Resolves the most recent raw pointer/touch/keyboard signals into one
//! normalized control torque per tick. Precedence: active touch overrides
//! keyboard, keyboard overrides pointer. Malformed coordinates are clamped to
//! [-1, 1] rather than rejected.

use serde::{Deserialize, Serialize};

use crate::clamp_norm;
use crate::consts::*;
use crate::profile::DifficultyProfile;

/// Which input channel produced the winning sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    Pointer,
    Touch,
    Keyboard,
    None,
}

/// One arbitrated control value for a single tick. Transient; recomputed
/// every tick from raw input state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSample {
    pub torque: f32,
    pub source: SourceKind,
}

impl ControlSample {
    pub const NEUTRAL: ControlSample = ControlSample {
        torque: 0.0,
        source: SourceKind::None,
    };

    /// Whether this sample counts as the player engaging (starts the lazy
    /// attempt clock). Holding a key or touching counts even at zero torque;
    /// a pointer only counts when it actually tilts the stick.
    pub fn engaged(&self) -> bool {
        match self.source {
            SourceKind::None => false,
            SourceKind::Pointer => self.torque != 0.0,
            SourceKind::Touch | SourceKind::Keyboard => true,
        }
    }
}

/// Direction keys the balance game listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirKey {
    ArrowLeft,
    KeyA,
    ArrowRight,
    KeyD,
}

impl DirKey {
    fn index(self) -> usize {
        match self {
            DirKey::ArrowLeft => 0,
            DirKey::KeyA => 1,
            DirKey::ArrowRight => 2,
            DirKey::KeyD => 3,
        }
    }

    fn is_left(self) -> bool {
        matches!(self, DirKey::ArrowLeft | DirKey::KeyA)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct KeyState {
    down: bool,
    pressed_at_ms: f64,
}

/// Most recent raw signals from the host's event plumbing
#[derive(Debug, Clone, Default)]
pub struct RawInput {
    pointer_x: Option<f32>,
    touch_x: f32,
    touch_active: bool,
    keys: [KeyState; 4],
}

impl RawInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalized pointer x in [-1, 1]; out-of-range values are clamped
    pub fn set_pointer(&mut self, x: f32) {
        self.pointer_x = Some(clamp_norm(x));
    }

    pub fn touch_start(&mut self, x: f32) {
        self.touch_active = true;
        self.touch_x = clamp_norm(x);
    }

    pub fn touch_move(&mut self, x: f32) {
        if self.touch_active {
            self.touch_x = clamp_norm(x);
        }
    }

    pub fn touch_end(&mut self) {
        self.touch_active = false;
        self.touch_x = 0.0;
    }

    /// Key press edge; repeated down events while held do not restart the
    /// press-duration clock
    pub fn key_down(&mut self, key: DirKey, now_ms: f64) {
        let k = &mut self.keys[key.index()];
        if !k.down {
            k.down = true;
            k.pressed_at_ms = now_ms;
        }
    }

    pub fn key_up(&mut self, key: DirKey) {
        self.keys[key.index()].down = false;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn any_key_down(&self) -> bool {
        self.keys.iter().any(|k| k.down)
    }

    /// Press duration of the first held key on one side, in seconds
    fn press_secs(&self, left: bool, now_ms: f64) -> Option<f32> {
        [DirKey::ArrowLeft, DirKey::KeyA, DirKey::ArrowRight, DirKey::KeyD]
            .into_iter()
            .filter(|k| k.is_left() == left)
            .map(|k| self.keys[k.index()])
            .find(|k| k.down)
            .map(|k| ((now_ms - k.pressed_at_ms).max(0.0) / 1000.0) as f32)
    }
}

/// Resolve raw input into one control sample, clamped to the profile's
/// torque range.
///
/// Keyboard torque scales with continuous press duration. The left and right
/// acceleration curves differ (rate 0.5 cap 1.5 vs rate 0.8 cap 2.0); that
/// asymmetry is preserved from the original tuning.
pub fn arbitrate(raw: &RawInput, profile: &DifficultyProfile, now_ms: f64) -> ControlSample {
    let (mut torque, source) = if raw.touch_active {
        (
            clamp_norm(raw.touch_x) * profile.max_torque * TOUCH_TORQUE_FACTOR,
            SourceKind::Touch,
        )
    } else if raw.any_key_down() {
        let mut t = 0.0;
        if let Some(held) = raw.press_secs(true, now_ms) {
            let accel = (held * LEFT_KEY_ACCEL_RATE).min(LEFT_KEY_ACCEL_CAP);
            t -= profile.base_torque * (1.0 + accel);
        }
        if let Some(held) = raw.press_secs(false, now_ms) {
            let accel = (held * RIGHT_KEY_ACCEL_RATE).min(RIGHT_KEY_ACCEL_CAP);
            t += profile.base_torque * (1.0 + accel);
        }
        (t, SourceKind::Keyboard)
    } else if let Some(x) = raw.pointer_x {
        (clamp_norm(x) * profile.max_torque, SourceKind::Pointer)
    } else {
        return ControlSample::NEUTRAL;
    };

    torque = torque.clamp(-profile.max_torque, profile.max_torque);
    ControlSample { torque, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Difficulty;

    fn profile() -> DifficultyProfile {
        DifficultyProfile::for_difficulty(Difficulty::Easy)
    }

    #[test]
    fn test_no_input_is_neutral() {
        let raw = RawInput::new();
        let s = arbitrate(&raw, &profile(), 0.0);
        assert_eq!(s, ControlSample::NEUTRAL);
        assert!(!s.engaged());
    }

    #[test]
    fn test_touch_overrides_keyboard() {
        let mut raw = RawInput::new();
        raw.key_down(DirKey::ArrowRight, 0.0);
        raw.touch_start(-0.5);
        let s = arbitrate(&raw, &profile(), 100.0);
        assert_eq!(s.source, SourceKind::Touch);
        assert!(s.torque < 0.0);
    }

    #[test]
    fn test_keyboard_overrides_pointer() {
        let mut raw = RawInput::new();
        raw.set_pointer(1.0);
        raw.key_down(DirKey::KeyA, 0.0);
        let s = arbitrate(&raw, &profile(), 0.0);
        assert_eq!(s.source, SourceKind::Keyboard);
        assert!(s.torque < 0.0);
    }

    #[test]
    fn test_torque_clamped_to_profile_max() {
        let p = profile();
        let mut raw = RawInput::new();
        // Touch torque is 3x the keyboard max before clamping
        raw.touch_start(1.0);
        let s = arbitrate(&raw, &p, 0.0);
        assert_eq!(s.torque, p.max_torque);

        raw.touch_start(-1.0);
        let s = arbitrate(&raw, &p, 0.0);
        assert_eq!(s.torque, -p.max_torque);
    }

    #[test]
    fn test_malformed_coordinates_clamped_not_rejected() {
        let p = profile();
        let mut raw = RawInput::new();
        raw.set_pointer(42.0);
        let s = arbitrate(&raw, &p, 0.0);
        assert_eq!(s.torque, p.max_torque);

        raw.set_pointer(f32::NAN);
        let s = arbitrate(&raw, &p, 0.0);
        assert_eq!(s.torque, 0.0);
        assert!(!s.engaged());
    }

    #[test]
    fn test_hold_acceleration_asymmetry() {
        let p = profile();
        // 10 seconds held: both sides saturate their caps
        let mut left = RawInput::new();
        left.key_down(DirKey::ArrowLeft, 0.0);
        let lt = arbitrate(&left, &p, 10_000.0).torque.abs();

        let mut right = RawInput::new();
        right.key_down(DirKey::ArrowRight, 0.0);
        let rt = arbitrate(&right, &p, 10_000.0).torque.abs();

        // base*(1+1.5) vs base*(1+2.0), both under the 0.4 clamp for easy
        assert!((lt - p.base_torque * 2.5).abs() < 1e-6);
        assert!((rt - p.base_torque * 3.0).abs() < 1e-6);
        assert!(rt > lt);
    }

    #[test]
    fn test_opposing_keys_partially_cancel() {
        let p = profile();
        let mut raw = RawInput::new();
        raw.key_down(DirKey::ArrowLeft, 0.0);
        raw.key_down(DirKey::ArrowRight, 0.0);
        // Equal hold times: right accelerates faster, so net torque is positive
        let s = arbitrate(&raw, &p, 5_000.0);
        assert_eq!(s.source, SourceKind::Keyboard);
        assert!(s.torque > 0.0);
        assert!(s.torque < p.base_torque);
    }

    #[test]
    fn test_repeat_keydown_does_not_restart_hold_clock() {
        let p = profile();
        let mut raw = RawInput::new();
        raw.key_down(DirKey::ArrowRight, 0.0);
        raw.key_down(DirKey::ArrowRight, 4_000.0); // auto-repeat
        let s = arbitrate(&raw, &p, 5_000.0);
        let accel = (5.0 * RIGHT_KEY_ACCEL_RATE).min(RIGHT_KEY_ACCEL_CAP);
        assert!((s.torque - p.base_torque * (1.0 + accel)).abs() < 1e-6);
    }

    #[test]
    fn test_pointer_at_center_not_engaged() {
        let mut raw = RawInput::new();
        raw.set_pointer(0.0);
        let s = arbitrate(&raw, &profile(), 0.0);
        assert_eq!(s.source, SourceKind::Pointer);
        assert!(!s.engaged());

        raw.set_pointer(0.3);
        assert!(arbitrate(&raw, &profile(), 0.0).engaged());
    }
}
