//! Generic attempt lifecycle state machine
//!
//! Ready → [Countdown] → Active → [Evaluating] → Results → (reset) → Ready.
//! Transitions are one-directional except the explicit reset and the Active
//! self-loop while ticking. The machine owns the scheduler: any exit from an
//! interactive phase synchronously cancels every pending timer, so no
//! orphaned callback can mutate a superseded attempt.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sched::{Fired, Scheduler, TaskHandle, TimerKind};

/// Discrete stage of one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Phase {
    /// Initial; no attempt state allocated
    #[default]
    Ready,
    /// Fixed tick-down before Active (some games omit this)
    Countdown { ticks_remaining: u32 },
    /// Simulation/interaction accepted
    Active,
    /// Optional non-interactive grading pause
    Evaluating,
    /// Terminal per attempt; only exit is reset
    Results,
}

/// Illegal lifecycle request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseError {
    /// Attempt already ran Active once; reset first
    AlreadyStarted,
    /// Requested transition is not legal from the current phase
    InvalidTransition { from: Phase },
}

impl fmt::Display for PhaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseError::AlreadyStarted => write!(f, "attempt already started; reset required"),
            PhaseError::InvalidTransition { from } => {
                write!(f, "invalid phase transition from {from:?}")
            }
        }
    }
}

impl std::error::Error for PhaseError {}

/// What the host/game learns from one poll
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhaseEvent {
    /// Countdown advanced; `remaining` is the value to display (2, 1, 0)
    CountdownTick { remaining: u32 },
    /// Countdown reached zero and the machine entered Active
    EnteredActive,
    /// A game-owned timer came due while Active/Evaluating
    Timer(Fired),
}

/// Lifecycle state machine with owned timers
#[derive(Debug, Clone, Default)]
pub struct PhaseMachine {
    phase: Phase,
    sched: Scheduler,
    countdown_task: Option<TaskHandle>,
    attempt_started: bool,
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    /// Number of timers currently pending (test/diagnostic)
    pub fn pending_timers(&self) -> usize {
        self.sched.pending()
    }

    /// Ready → Countdown. The countdown advances through `poll`.
    pub fn begin_countdown(
        &mut self,
        ticks: u32,
        interval_ms: f64,
        now_ms: f64,
    ) -> Result<(), PhaseError> {
        if self.attempt_started {
            return Err(PhaseError::AlreadyStarted);
        }
        if self.phase != Phase::Ready {
            return Err(PhaseError::InvalidTransition { from: self.phase });
        }
        self.phase = Phase::Countdown {
            ticks_remaining: ticks,
        };
        self.countdown_task = Some(self.sched.schedule_repeating(
            TimerKind::CountdownTick,
            interval_ms,
            now_ms,
        ));
        Ok(())
    }

    /// Ready → Active for games that skip the countdown.
    ///
    /// This is the structural double-start guard: a second call without an
    /// intervening reset fails, so two overlapping timer sets cannot exist.
    pub fn begin_active(&mut self) -> Result<(), PhaseError> {
        if self.attempt_started {
            return Err(PhaseError::AlreadyStarted);
        }
        if self.phase != Phase::Ready {
            return Err(PhaseError::InvalidTransition { from: self.phase });
        }
        self.enter_active();
        Ok(())
    }

    fn enter_active(&mut self) {
        self.phase = Phase::Active;
        self.attempt_started = true;
        log::debug!("phase -> Active");
    }

    /// Active → Evaluating. Cancels all Active-phase timers first.
    pub fn begin_evaluating(&mut self) -> Result<(), PhaseError> {
        if self.phase != Phase::Active {
            return Err(PhaseError::InvalidTransition { from: self.phase });
        }
        self.sched.cancel_all();
        self.phase = Phase::Evaluating;
        log::debug!("phase -> Evaluating");
        Ok(())
    }

    /// Active/Evaluating → Results. Cancels every pending timer.
    pub fn finish(&mut self) -> Result<(), PhaseError> {
        match self.phase {
            Phase::Active | Phase::Evaluating => {
                self.sched.cancel_all();
                self.countdown_task = None;
                self.phase = Phase::Results;
                log::debug!("phase -> Results");
                Ok(())
            }
            _ => Err(PhaseError::InvalidTransition { from: self.phase }),
        }
    }

    /// Any phase → Ready. Cancels all timers; the machine is afterwards
    /// indistinguishable from a fresh construction.
    pub fn reset(&mut self) {
        self.sched.cancel_all();
        self.countdown_task = None;
        self.phase = Phase::Ready;
        self.attempt_started = false;
        log::debug!("phase -> Ready (reset)");
    }

    /// Schedule a one-shot game timer
    pub fn schedule(&mut self, kind: TimerKind, delay_ms: f64, now_ms: f64) -> TaskHandle {
        self.sched.schedule(kind, delay_ms, now_ms)
    }

    /// Schedule a repeating game timer
    pub fn schedule_repeating(
        &mut self,
        kind: TimerKind,
        period_ms: f64,
        now_ms: f64,
    ) -> TaskHandle {
        self.sched.schedule_repeating(kind, period_ms, now_ms)
    }

    /// Idempotent cancel of a game timer
    pub fn cancel(&mut self, handle: TaskHandle) {
        self.sched.cancel(handle);
    }

    /// Advance timers. Countdown ticks are consumed internally; reaching zero
    /// enters Active and reports `EnteredActive`. All other fires are handed
    /// back to the owning game.
    pub fn poll(&mut self, now_ms: f64) -> Vec<PhaseEvent> {
        let fired = self.sched.poll(now_ms);
        let mut events = Vec::with_capacity(fired.len());
        for f in fired {
            if f.kind == TimerKind::CountdownTick && Some(f.handle) == self.countdown_task {
                if let Phase::Countdown { ticks_remaining } = self.phase {
                    let remaining = ticks_remaining.saturating_sub(1);
                    events.push(PhaseEvent::CountdownTick { remaining });
                    if remaining == 0 {
                        self.sched.cancel(f.handle);
                        self.countdown_task = None;
                        self.enter_active();
                        events.push(PhaseEvent::EnteredActive);
                    } else {
                        self.phase = Phase::Countdown {
                            ticks_remaining: remaining,
                        };
                    }
                }
            } else {
                events.push(PhaseEvent::Timer(f));
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_active_entry() {
        let mut m = PhaseMachine::new();
        assert_eq!(m.phase(), Phase::Ready);
        m.begin_active().unwrap();
        assert_eq!(m.phase(), Phase::Active);
    }

    #[test]
    fn test_double_start_rejected() {
        let mut m = PhaseMachine::new();
        m.begin_active().unwrap();
        m.finish().unwrap();
        assert_eq!(m.begin_active(), Err(PhaseError::AlreadyStarted));
        assert_eq!(
            m.begin_countdown(3, 1000.0, 0.0),
            Err(PhaseError::AlreadyStarted)
        );
        m.reset();
        m.begin_active().unwrap();
    }

    #[test]
    fn test_countdown_ticks_into_active() {
        let mut m = PhaseMachine::new();
        m.begin_countdown(3, 1000.0, 0.0).unwrap();
        assert_eq!(m.phase(), Phase::Countdown { ticks_remaining: 3 });

        let ev = m.poll(1000.0);
        assert_eq!(ev, vec![PhaseEvent::CountdownTick { remaining: 2 }]);
        let ev = m.poll(2000.0);
        assert_eq!(ev, vec![PhaseEvent::CountdownTick { remaining: 1 }]);
        let ev = m.poll(3000.0);
        assert_eq!(
            ev,
            vec![
                PhaseEvent::CountdownTick { remaining: 0 },
                PhaseEvent::EnteredActive
            ]
        );
        assert_eq!(m.phase(), Phase::Active);
        // Countdown timer must not survive Active entry
        assert_eq!(m.pending_timers(), 0);
    }

    #[test]
    fn test_results_only_exits_via_reset() {
        let mut m = PhaseMachine::new();
        m.begin_active().unwrap();
        m.finish().unwrap();
        assert_eq!(m.phase(), Phase::Results);
        assert!(m.finish().is_err());
        assert!(m.begin_evaluating().is_err());
        m.reset();
        assert_eq!(m.phase(), Phase::Ready);
    }

    #[test]
    fn test_exits_cancel_timers() {
        let mut m = PhaseMachine::new();
        m.begin_active().unwrap();
        m.schedule_repeating(TimerKind::StageTick, 100.0, 0.0);
        m.schedule(TimerKind::PhaseTimeout, 5000.0, 0.0);
        assert_eq!(m.pending_timers(), 2);

        m.begin_evaluating().unwrap();
        assert_eq!(m.pending_timers(), 0);

        m.schedule(TimerKind::PhaseTimeout, 2000.0, 0.0);
        m.finish().unwrap();
        assert_eq!(m.pending_timers(), 0);
    }

    #[test]
    fn test_mid_active_reset_cancels_timers() {
        let mut m = PhaseMachine::new();
        m.begin_active().unwrap();
        m.schedule_repeating(TimerKind::SensitivityRamp, 1000.0, 0.0);
        m.reset();
        assert_eq!(m.pending_timers(), 0);
        assert!(m.poll(60_000.0).is_empty());
    }

    #[test]
    fn test_reset_machine_equals_fresh() {
        let mut m = PhaseMachine::new();
        m.begin_countdown(3, 1000.0, 0.0).unwrap();
        m.poll(1000.0);
        m.reset();

        let fresh = PhaseMachine::new();
        assert_eq!(m.phase(), fresh.phase());
        assert_eq!(m.pending_timers(), fresh.pending_timers());
    }
}
