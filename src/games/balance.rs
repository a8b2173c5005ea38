//! Inverted-pendulum balance game
//!
//! No countdown: Active begins immediately, but the attempt clock and the
//! sensitivity ramp start lazily on the first engaged input. Loss is the
//! ball reaching a stick tip; score is ten points per survived second.

use serde_json::{Map, Value};

use crate::consts::SIM_DT;
use crate::phase::{PhaseError, PhaseEvent, PhaseMachine};
use crate::profile::{Difficulty, DifficultyProfile};
use crate::session::{GameType, ScoreRecord};
use crate::sim::{self, LoopDriver, PendulumState, RawInput, SensitivityRamp};

use super::MiniGame;

pub struct BalanceGame {
    difficulty: Difficulty,
    profile: DifficultyProfile,
    input: RawInput,
    pendulum: PendulumState,
    ramp: SensitivityRamp,
    driver: LoopDriver,
    /// Waiting → running sub-state: flips on first engaged input
    running: bool,
    paused: bool,
}

impl BalanceGame {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            profile: DifficultyProfile::for_difficulty(difficulty),
            input: RawInput::new(),
            pendulum: PendulumState::new(),
            ramp: SensitivityRamp::new(),
            driver: LoopDriver::new(),
            running: false,
            paused: false,
        }
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    /// Raw input state, fed by the host's event plumbing
    pub fn input_mut(&mut self) -> &mut RawInput {
        &mut self.input
    }

    /// Snapshot for the render sink
    pub fn pendulum(&self) -> &PendulumState {
        &self.pendulum
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Suspend the attempt: the loop stops and the ramp is cancelled so no
    /// timer can mutate state while paused. Idempotent.
    pub fn pause(&mut self, machine: &mut PhaseMachine) {
        if machine.is_active() && !self.paused {
            self.paused = true;
            self.driver.cancel();
            self.ramp.cancel(machine);
        }
    }

    /// Resume a paused attempt; the ramp restarts with its full interval.
    pub fn resume(&mut self, machine: &mut PhaseMachine, now_ms: f64) {
        if self.paused {
            self.paused = false;
            self.driver.start();
            if self.running {
                self.ramp
                    .start(machine, self.profile.sensitivity_interval_ms, now_ms);
            }
        }
    }

    fn teardown(&mut self, machine: &mut PhaseMachine) {
        self.ramp.cancel(machine);
        self.driver.cancel();
    }
}

impl MiniGame for BalanceGame {
    fn game_type(&self) -> GameType {
        GameType::Balance
    }

    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn init(&mut self, machine: &mut PhaseMachine, _now_ms: f64) -> Result<(), PhaseError> {
        machine.begin_active()?;
        self.pendulum = PendulumState::new();
        self.input.clear();
        self.running = false;
        self.paused = false;
        self.driver.start();
        log::info!(
            "balance attempt started ({}, stick {}px)",
            self.difficulty.as_str(),
            self.profile.stick_length
        );
        Ok(())
    }

    fn tick(&mut self, machine: &mut PhaseMachine, now_ms: f64) {
        if !machine.is_active() || self.paused {
            return;
        }
        let Some(_dt) = self.driver.tick(now_ms) else {
            return;
        };

        // Input sampling happens-before integration happens-before the
        // terminal check, all within this tick.
        let sample = sim::arbitrate(&self.input, &self.profile, now_ms);
        if !self.running && sample.engaged() {
            self.running = true;
            self.ramp
                .start(machine, self.profile.sensitivity_interval_ms, now_ms);
            log::debug!("player engaged via {:?}", sample.source);
        }

        let outcome = sim::step(&self.pendulum, sample.torque, &self.profile);
        self.pendulum = outcome.state;
        if self.running {
            self.pendulum.elapsed_active_ms += f64::from(SIM_DT) * 1000.0;
        }

        if outcome.lost {
            self.teardown(machine);
            // Legal from Active; the machine cancels any remaining timers
            let _ = machine.finish();
            log::info!(
                "balance over: {:.1}s survived at {:.1}x",
                self.pendulum.elapsed_secs(),
                self.pendulum.sensitivity
            );
        }
    }

    fn on_event(&mut self, event: &PhaseEvent, machine: &mut PhaseMachine, _now_ms: f64) {
        if let PhaseEvent::Timer(fired) = event {
            if self.ramp.owns(fired.handle) && machine.is_active() {
                SensitivityRamp::apply(&mut self.pendulum);
            }
        }
    }

    fn score(&self) -> ScoreRecord {
        let mut auxiliary = Map::new();
        auxiliary.insert("timeSurvived".into(), Value::from(self.pendulum.elapsed_secs()));
        auxiliary.insert(
            "maxSensitivity".into(),
            Value::from(f64::from(self.pendulum.sensitivity)),
        );
        auxiliary.insert(
            "stickLength".into(),
            Value::from(f64::from(self.profile.stick_length)),
        );
        auxiliary.insert(
            "finalBallPosition".into(),
            Value::from(f64::from(self.pendulum.ball_position)),
        );
        ScoreRecord {
            game_type: GameType::Balance,
            difficulty: self.difficulty,
            score: self.pendulum.score(),
            duration: self.pendulum.elapsed_secs().floor() as u32,
            accuracy: 100,
            auxiliary,
        }
    }

    fn reset(&mut self, machine: &mut PhaseMachine) {
        self.teardown(machine);
        machine.reset();
        self.pendulum = PendulumState::new();
        self.input.clear();
        self.running = false;
        self.paused = false;
    }

    fn cleanup(&mut self, machine: &mut PhaseMachine) {
        self.teardown(machine);
        machine.reset();
    }
}
