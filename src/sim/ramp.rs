//! Sensitivity ramp
//!
//! While the balance game is active, a coarse wall-clock timer raises the
//! ball's gravity coupling by a fixed step at the profile's interval. The
//! ramp owns exactly one scheduler task; cancelling twice is safe, and the
//! handle is taken on cancel so a stale fire can never touch a later attempt.

use crate::consts::SENSITIVITY_STEP;
use crate::phase::PhaseMachine;
use crate::sched::{TaskHandle, TimerKind};
use crate::sim::pendulum::PendulumState;

#[derive(Debug, Clone, Copy, Default)]
pub struct SensitivityRamp {
    task: Option<TaskHandle>,
}

impl SensitivityRamp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin ramping. A second start while running is a no-op, so the timer
    /// can never be doubled up.
    pub fn start(&mut self, machine: &mut PhaseMachine, interval_ms: u32, now_ms: f64) {
        if self.task.is_none() {
            self.task = Some(machine.schedule_repeating(
                TimerKind::SensitivityRamp,
                f64::from(interval_ms),
                now_ms,
            ));
            log::debug!("sensitivity ramp started, interval {interval_ms}ms");
        }
    }

    /// Stop ramping. Idempotent; must be called when the phase leaves Active.
    pub fn cancel(&mut self, machine: &mut PhaseMachine) {
        if let Some(handle) = self.task.take() {
            machine.cancel(handle);
            log::debug!("sensitivity ramp cancelled");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Whether a fired timer belongs to this ramp
    pub fn owns(&self, handle: TaskHandle) -> bool {
        self.task == Some(handle)
    }

    /// Apply one increment to the attempt state
    pub fn apply(state: &mut PendulumState) {
        state.sensitivity += SENSITIVITY_STEP;
        log::debug!("sensitivity now {:.1}x", state.sensitivity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_is_single_shot() {
        let mut machine = PhaseMachine::new();
        machine.begin_active().unwrap();
        let mut ramp = SensitivityRamp::new();
        ramp.start(&mut machine, 1000, 0.0);
        ramp.start(&mut machine, 1000, 0.0);
        assert_eq!(machine.pending_timers(), 1);
    }

    #[test]
    fn test_cancel_idempotent() {
        let mut machine = PhaseMachine::new();
        machine.begin_active().unwrap();
        let mut ramp = SensitivityRamp::new();
        ramp.start(&mut machine, 1000, 0.0);
        ramp.cancel(&mut machine);
        ramp.cancel(&mut machine);
        assert!(!ramp.is_running());
        assert_eq!(machine.pending_timers(), 0);
    }

    #[test]
    fn test_increment_step() {
        let mut state = PendulumState::new();
        SensitivityRamp::apply(&mut state);
        SensitivityRamp::apply(&mut state);
        assert!((state.sensitivity - 1.4).abs() < 1e-6);
    }
}
