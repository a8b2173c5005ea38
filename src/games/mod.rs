//! Per-game behavior behind one capability trait
//!
//! Each mini-game implements [`MiniGame`] (init, tick, terminal check,
//! scoring, reset, cleanup); [`GameSession`] owns one game plus its phase
//! machine and is the single writer of both. On the transition into Results
//! the session emits exactly one score record to the external sink,
//! fire-and-forget.

pub mod balance;
pub mod memory;
pub mod origami;
pub mod typing;

pub use balance::BalanceGame;
pub use memory::{MemoryGame, Shape};
pub use origami::{FoldDirection, FoldStep, OrigamiGame, Pattern, StepKind};
pub use typing::TypingGame;

use crate::phase::{Phase, PhaseError, PhaseEvent, PhaseMachine};
use crate::profile::Difficulty;
use crate::session::{GameType, ScoreRecord, SessionSink};

/// Capability set every mini-game provides. Selected once at construction;
/// the session never switches games mid-attempt.
pub trait MiniGame {
    fn game_type(&self) -> GameType;

    fn difficulty(&self) -> Difficulty;

    /// Start one attempt: move the machine out of Ready (directly to Active
    /// or via countdown) and allocate fresh per-attempt state.
    fn init(&mut self, machine: &mut PhaseMachine, now_ms: f64) -> Result<(), PhaseError>;

    /// Per-frame advance. Called once per host frame after timer events.
    fn tick(&mut self, machine: &mut PhaseMachine, now_ms: f64);

    /// React to a countdown or game timer event.
    fn on_event(&mut self, event: &PhaseEvent, machine: &mut PhaseMachine, now_ms: f64);

    /// Whether the attempt reached its terminal condition.
    fn terminal_check(&self, machine: &PhaseMachine) -> bool {
        machine.phase() == Phase::Results
    }

    /// Build the immutable score record from terminal state. Pure: depends
    /// only on values recorded during the attempt, never the wall clock.
    fn score(&self) -> ScoreRecord;

    /// Cancel attempt timers and discard attempt state; machine returns to
    /// Ready so a new attempt can start.
    fn reset(&mut self, machine: &mut PhaseMachine);

    /// Release attempt-scoped resources without rearming (teardown).
    fn cleanup(&mut self, machine: &mut PhaseMachine);
}

/// One running game instance plus its recording boundary
pub struct GameSession<G: MiniGame, S: SessionSink> {
    game: G,
    machine: PhaseMachine,
    sink: S,
    recorded: bool,
}

impl<G: MiniGame, S: SessionSink> GameSession<G, S> {
    pub fn new(game: G, sink: S) -> Self {
        Self {
            game,
            machine: PhaseMachine::new(),
            sink,
            recorded: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    /// Mutable access to the game together with its machine, for
    /// game-specific input (recall cells, typed words, fold attempts).
    pub fn parts_mut(&mut self) -> (&mut G, &mut PhaseMachine) {
        (&mut self.game, &mut self.machine)
    }

    /// Begin an attempt
    pub fn start(&mut self, now_ms: f64) -> Result<(), PhaseError> {
        self.game.init(&mut self.machine, now_ms)
    }

    /// Host frame callback: timers fire first, then one game tick, then the
    /// terminal transition is observed. Ordering within the frame is
    /// input → integration → terminal check → record.
    pub fn frame(&mut self, now_ms: f64) {
        let events = self.machine.poll(now_ms);
        for event in &events {
            self.game.on_event(event, &mut self.machine, now_ms);
        }
        self.game.tick(&mut self.machine, now_ms);

        if self.machine.phase() == Phase::Results && !self.recorded {
            self.recorded = true;
            let record = self.game.score();
            log::info!(
                "{} attempt finished: score {}",
                record.game_type.as_str(),
                record.score
            );
            // Best-effort delivery; a failed save never alters game state
            if let Err(e) = self.sink.record(&record) {
                log::warn!("{e}");
            }
        }
    }

    /// Explicit reset back to Ready; cancels every timer belonging to the
    /// current attempt before discarding its state.
    pub fn reset(&mut self) {
        self.game.reset(&mut self.machine);
        self.recorded = false;
    }

    /// Tear the session down (navigating away)
    pub fn cleanup(&mut self) {
        self.game.cleanup(&mut self.machine);
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
