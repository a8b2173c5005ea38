//! Step-folding origami game
//!
//! The player works through a pattern's fold sequence; each attempted fold is
//! matched against the current instruction. Correct folds advance and bank
//! `floor(100 / totalSteps)` points, wrong ones cost accuracy but never
//! advance. There is no round clock: the attempt ends when the last step
//! lands, and speed only matters through the completion-time bonus.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::phase::{PhaseError, PhaseEvent, PhaseMachine};
use crate::profile::Difficulty;
use crate::session::{GameType, ScoreRecord};

use super::MiniGame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind {
    Fold,
    Unfold,
    Collapse,
    PetalFold,
    Twist,
    Shape,
    Final,
}

/// Crease orientation for fold/unfold steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoldDirection {
    Horizontal,
    Vertical,
    Diagonal1,
    Diagonal2,
}

/// One instruction in a pattern's fold sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoldStep {
    pub kind: StepKind,
    pub direction: Option<FoldDirection>,
    /// Crease position as a fraction of the paper edge, where it applies
    pub position: Option<f32>,
    pub instruction: &'static str,
}

impl FoldStep {
    const fn fold(direction: FoldDirection, position: f32, instruction: &'static str) -> Self {
        Self {
            kind: StepKind::Fold,
            direction: Some(direction),
            position: Some(position),
            instruction,
        }
    }

    const fn action(kind: StepKind, instruction: &'static str) -> Self {
        Self {
            kind,
            direction: None,
            position: None,
            instruction,
        }
    }

    /// Whether an attempted fold satisfies this instruction
    pub fn matches(&self, kind: StepKind, direction: Option<FoldDirection>) -> bool {
        self.kind == kind && self.direction == direction
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pattern {
    pub name: &'static str,
    pub steps: &'static [FoldStep],
}

use FoldDirection::*;

static PAPER_BOAT: Pattern = Pattern {
    name: "Paper Boat",
    steps: &[
        FoldStep::fold(Horizontal, 0.5, "Fold the paper in half horizontally"),
        FoldStep::fold(Vertical, 0.25, "Fold the top corners to the center"),
        FoldStep::fold(Vertical, 0.75, "Fold the other corners to the center"),
        FoldStep {
            kind: StepKind::Unfold,
            direction: Some(Horizontal),
            position: None,
            instruction: "Open the boat by pulling the sides apart",
        },
    ],
};

static SIMPLE_CRANE_BASE: Pattern = Pattern {
    name: "Simple Crane Base",
    steps: &[
        FoldStep::fold(Diagonal1, 0.5, "Fold diagonally from top-left to bottom-right"),
        FoldStep::fold(Diagonal2, 0.5, "Fold diagonally from top-right to bottom-left"),
        FoldStep::fold(Horizontal, 0.5, "Fold horizontally through the center"),
        FoldStep::action(
            StepKind::Collapse,
            "Push the sides together to form the preliminary base",
        ),
    ],
};

static TRADITIONAL_CRANE: Pattern = Pattern {
    name: "Traditional Crane",
    steps: &[
        FoldStep::fold(Diagonal1, 0.5, "Make a diagonal valley fold"),
        FoldStep::fold(Diagonal2, 0.5, "Make the opposite diagonal valley fold"),
        FoldStep::fold(Horizontal, 0.5, "Fold horizontally and unfold"),
        FoldStep::fold(Vertical, 0.5, "Fold vertically and unfold"),
        FoldStep::action(
            StepKind::Collapse,
            "Bring the corners together to form bird base",
        ),
        FoldStep::action(StepKind::PetalFold, "Make petal folds on both sides"),
    ],
};

static COMPLEX_ROSE: Pattern = Pattern {
    name: "Complex Rose",
    steps: &[
        FoldStep::fold(Diagonal1, 0.5, "Valley fold diagonally"),
        FoldStep::fold(Diagonal2, 0.5, "Valley fold the other diagonal"),
        FoldStep::fold(Horizontal, 0.33, "Fold horizontally at 1/3"),
        FoldStep::fold(Horizontal, 0.67, "Fold horizontally at 2/3"),
        FoldStep::action(StepKind::Twist, "Twist the center 45 degrees"),
        FoldStep::action(StepKind::PetalFold, "Create petal folds around the center"),
        FoldStep::action(StepKind::Shape, "Shape the petals by curving edges"),
        FoldStep::action(StepKind::Final, "Final shaping and positioning"),
    ],
};

impl Pattern {
    /// Patterns offered at one difficulty
    pub fn catalog(difficulty: Difficulty) -> &'static [&'static Pattern] {
        static EASY: [&Pattern; 2] = [&PAPER_BOAT, &SIMPLE_CRANE_BASE];
        static MEDIUM: [&Pattern; 1] = [&TRADITIONAL_CRANE];
        static HARD: [&Pattern; 1] = [&COMPLEX_ROSE];
        match difficulty {
            Difficulty::Easy => &EASY,
            Difficulty::Medium => &MEDIUM,
            Difficulty::Hard => &HARD,
        }
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }
}

pub struct OrigamiGame {
    difficulty: Difficulty,
    seed: u64,
    pattern: &'static Pattern,
    current_step: usize,
    step_score: i64,
    mistakes: u32,
    started_at_ms: f64,
    /// Captured when the last step lands, so scoring never reads the clock
    finished_elapsed_secs: Option<u32>,
}

impl OrigamiGame {
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        Self {
            difficulty,
            seed,
            pattern: Pattern::catalog(difficulty)[0],
            current_step: 0,
            step_score: 0,
            mistakes: 0,
            started_at_ms: 0.0,
            finished_elapsed_secs: None,
        }
    }

    pub fn pattern(&self) -> &'static Pattern {
        self.pattern
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// The instruction the player should perform next
    pub fn current_instruction(&self) -> Option<&'static str> {
        self.pattern
            .steps
            .get(self.current_step)
            .map(|s| s.instruction)
    }

    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    pub fn is_complete(&self) -> bool {
        self.finished_elapsed_secs.is_some()
    }

    /// Accuracy never drops below zero even when mistakes exceed the step
    /// count
    fn accuracy(&self) -> u32 {
        let total = self.pattern.total_steps() as i64;
        let acc = (total - i64::from(self.mistakes)) * 100 / total;
        acc.max(0) as u32
    }

    /// One attempted fold. A match banks points and advances; the final step
    /// completes the attempt. A miss costs accuracy and leaves the paper
    /// untouched.
    pub fn attempt_fold(
        &mut self,
        machine: &mut PhaseMachine,
        kind: StepKind,
        direction: Option<FoldDirection>,
        now_ms: f64,
    ) {
        if !machine.is_active() || self.is_complete() {
            return;
        }
        let Some(step) = self.pattern.steps.get(self.current_step) else {
            return;
        };
        if step.matches(kind, direction) {
            self.step_score += 100 / self.pattern.total_steps() as i64;
            self.current_step += 1;
            if self.current_step == self.pattern.total_steps() {
                let elapsed = ((now_ms - self.started_at_ms) / 1000.0).floor().max(0.0) as u32;
                self.finished_elapsed_secs = Some(elapsed);
                let _ = machine.finish();
                log::info!("{} completed in {elapsed}s", self.pattern.name);
            }
        } else {
            self.mistakes += 1;
            log::debug!(
                "wrong fold at step {}: got {kind:?}/{direction:?}",
                self.current_step + 1
            );
        }
    }
}

impl MiniGame for OrigamiGame {
    fn game_type(&self) -> GameType {
        GameType::Origami
    }

    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn init(&mut self, machine: &mut PhaseMachine, now_ms: f64) -> Result<(), PhaseError> {
        machine.begin_active()?;
        let mut rng = Pcg32::seed_from_u64(self.seed);
        let catalog = Pattern::catalog(self.difficulty);
        self.pattern = catalog[rng.random_range(0..catalog.len())];
        self.current_step = 0;
        self.step_score = 0;
        self.mistakes = 0;
        self.started_at_ms = now_ms;
        self.finished_elapsed_secs = None;
        log::info!(
            "origami attempt started: {} ({} steps)",
            self.pattern.name,
            self.pattern.total_steps()
        );
        Ok(())
    }

    fn tick(&mut self, _machine: &mut PhaseMachine, _now_ms: f64) {}

    fn on_event(&mut self, _event: &PhaseEvent, _machine: &mut PhaseMachine, _now_ms: f64) {}

    fn score(&self) -> ScoreRecord {
        let elapsed = self.finished_elapsed_secs.unwrap_or(0);
        let accuracy = self.accuracy();
        let time_bonus = i64::from(100u32.saturating_sub(elapsed));
        // The accuracy term is a penalty: perfect play contributes zero
        let score = self.step_score + time_bonus + (i64::from(accuracy) - 100);

        let mut auxiliary = Map::new();
        auxiliary.insert("pattern".into(), Value::from(self.pattern.name));
        auxiliary.insert("mistakes".into(), Value::from(self.mistakes));
        auxiliary.insert("stepsCompleted".into(), Value::from(self.current_step));
        ScoreRecord {
            game_type: GameType::Origami,
            difficulty: self.difficulty,
            score,
            duration: elapsed,
            accuracy,
            auxiliary,
        }
    }

    fn reset(&mut self, machine: &mut PhaseMachine) {
        machine.reset();
        self.current_step = 0;
        self.step_score = 0;
        self.mistakes = 0;
        self.finished_elapsed_secs = None;
    }

    fn cleanup(&mut self, machine: &mut PhaseMachine) {
        self.reset(machine);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::GameSession;
    use crate::phase::Phase;
    use crate::session::MemorySink;

    fn session(difficulty: Difficulty, seed: u64) -> GameSession<OrigamiGame, MemorySink> {
        GameSession::new(OrigamiGame::new(difficulty, seed), MemorySink::default())
    }

    /// Perform the pattern's own steps in order, `now_ms` fixed
    fn fold_through(s: &mut GameSession<OrigamiGame, MemorySink>, now_ms: f64) {
        let steps: Vec<(StepKind, Option<FoldDirection>)> = s
            .game()
            .pattern()
            .steps
            .iter()
            .map(|st| (st.kind, st.direction))
            .collect();
        for (kind, direction) in steps {
            let (game, machine) = s.parts_mut();
            game.attempt_fold(machine, kind, direction, now_ms);
        }
    }

    #[test]
    fn test_perfect_run_scores_per_formula() {
        let mut s = session(Difficulty::Easy, 4);
        s.start(0.0).unwrap();
        let total = s.game().pattern().total_steps();
        assert_eq!(total, 4);

        // Completed ten seconds in, no mistakes
        fold_through(&mut s, 10_000.0);
        assert_eq!(s.phase(), Phase::Results);
        s.frame(10_000.0);

        let rec = &s.sink().records[0];
        // 4 * floor(100/4) + (100 - 10) + (100 - 100) = 190
        assert_eq!(rec.score, 190);
        assert_eq!(rec.accuracy, 100);
        assert_eq!(rec.duration, 10);
    }

    #[test]
    fn test_mistakes_cost_accuracy_not_progress() {
        let mut s = session(Difficulty::Easy, 4);
        s.start(0.0).unwrap();
        {
            let (game, machine) = s.parts_mut();
            // Wrong action against the first step
            game.attempt_fold(machine, StepKind::Collapse, None, 500.0);
            assert_eq!(game.current_step(), 0);
            assert_eq!(game.mistakes(), 1);
        }
        fold_through(&mut s, 1_000.0);
        s.frame(1_000.0);

        let rec = &s.sink().records[0];
        // One mistake on a 4-step pattern: accuracy floor(3/4 * 100)
        assert_eq!(rec.accuracy, 75);
        // 100 + (100 - 1) + (75 - 100)
        assert_eq!(rec.score, 174);
    }

    #[test]
    fn test_slow_completion_forfeits_time_bonus() {
        let mut s = session(Difficulty::Medium, 8);
        s.start(0.0).unwrap();
        assert_eq!(s.game().pattern().name, "Traditional Crane");

        fold_through(&mut s, 200_000.0);
        s.frame(200_000.0);
        let rec = &s.sink().records[0];
        // 6 * floor(100/6) = 96; bonus clamps at zero past 100s
        assert_eq!(rec.score, 96);
        assert_eq!(rec.duration, 200);
    }

    #[test]
    fn test_accuracy_floors_at_zero() {
        let mut s = session(Difficulty::Easy, 4);
        s.start(0.0).unwrap();
        for _ in 0..10 {
            let (game, machine) = s.parts_mut();
            game.attempt_fold(machine, StepKind::Final, None, 0.0);
        }
        fold_through(&mut s, 0.0);
        s.frame(0.0);
        let rec = &s.sink().records[0];
        assert_eq!(rec.accuracy, 0);
        // 100 + 100 + (0 - 100)
        assert_eq!(rec.score, 100);
    }

    #[test]
    fn test_seeded_pattern_choice_and_folds_after_completion_dropped() {
        let mut a = session(Difficulty::Easy, 11);
        let mut b = session(Difficulty::Easy, 11);
        a.start(0.0).unwrap();
        b.start(0.0).unwrap();
        assert_eq!(a.game().pattern().name, b.game().pattern().name);

        fold_through(&mut a, 1_000.0);
        a.frame(1_000.0);
        let step = a.game().current_step();
        {
            let (game, machine) = a.parts_mut();
            game.attempt_fold(machine, StepKind::Fold, Some(Horizontal), 2_000.0);
        }
        assert_eq!(a.game().current_step(), step);
        assert_eq!(a.sink().records.len(), 1);
    }

    #[test]
    fn test_reset_allows_new_attempt() {
        let mut s = session(Difficulty::Hard, 1);
        s.start(0.0).unwrap();
        assert_eq!(s.game().pattern().total_steps(), 8);
        {
            let (game, machine) = s.parts_mut();
            game.attempt_fold(machine, StepKind::Fold, Some(Diagonal1), 100.0);
        }
        s.reset();
        assert_eq!(s.phase(), Phase::Ready);
        assert_eq!(s.game().current_step(), 0);
        s.start(5_000.0).unwrap();
        assert_eq!(s.phase(), Phase::Active);
        assert!(!s.game().is_complete());
    }
}
