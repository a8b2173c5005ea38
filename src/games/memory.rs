//! Shape-grid memory game
//!
//! Countdown 3-2-1, then the grid is revealed for the memorize window,
//! hidden for the recall window, graded during a short Evaluating reveal,
//! and scored. The grid is drawn from a seeded RNG at Active entry so
//! attempts are reproducible.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::*;
use crate::phase::{Phase, PhaseError, PhaseEvent, PhaseMachine};
use crate::profile::{Difficulty, DifficultyProfile};
use crate::sched::{TaskHandle, TimerKind};
use crate::session::{GameType, ScoreRecord};

use super::MiniGame;

/// The four shapes a cell can hold; recall input is the 1-based shape number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Star,
    Square,
    Circle,
    Triangle,
}

pub const SHAPES: [Shape; 4] = [Shape::Star, Shape::Square, Shape::Circle, Shape::Triangle];

impl Shape {
    /// 1-based number the player types to name this shape
    pub fn number(&self) -> u8 {
        match self {
            Shape::Star => 1,
            Shape::Square => 2,
            Shape::Circle => 3,
            Shape::Triangle => 4,
        }
    }
}

/// Interactive sub-stage within Active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Memorize,
    Recall,
}

pub struct MemoryGame {
    difficulty: Difficulty,
    grid_size: usize,
    memorize_secs: u32,
    recall_secs: u32,
    seed: u64,
    grid: Vec<Shape>,
    inputs: Vec<Option<u8>>,
    stage: Stage,
    /// Seconds left in the current stage
    time_left: u32,
    stage_task: Option<TaskHandle>,
    /// Set at evaluation: (correct cells, recall seconds remaining)
    graded: Option<(usize, u32)>,
}

impl MemoryGame {
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        Self {
            difficulty,
            grid_size: DifficultyProfile::memory_grid_size(difficulty),
            memorize_secs: DifficultyProfile::memory_memorize_secs(difficulty),
            recall_secs: DifficultyProfile::memory_recall_secs(difficulty),
            seed,
            grid: Vec::new(),
            inputs: Vec::new(),
            stage: Stage::Memorize,
            time_left: 0,
            stage_task: None,
            graded: None,
        }
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    fn total_cells(&self) -> usize {
        self.grid_size * self.grid_size
    }

    /// Revealed grid (render sink reads this during memorize/evaluating)
    pub fn grid(&self) -> &[Shape] {
        &self.grid
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn is_recalling(&self) -> bool {
        self.stage == Stage::Recall
    }

    /// Record the player's answer for one cell during recall. Values outside
    /// 1..=4 are stored as given and simply grade as incorrect. When every
    /// cell is filled, grading starts early.
    pub fn submit(&mut self, machine: &mut PhaseMachine, cell: usize, value: u8, now_ms: f64) {
        if !machine.is_active() || self.stage != Stage::Recall || cell >= self.inputs.len() {
            return;
        }
        self.inputs[cell] = Some(value);
        if self.inputs.iter().all(Option::is_some) {
            self.evaluate(machine, now_ms);
        }
    }

    fn shuffle_grid(&mut self) {
        let mut rng = Pcg32::seed_from_u64(self.seed);
        let total = self.total_cells();
        self.grid = (0..total)
            .map(|_| SHAPES[rng.random_range(0..SHAPES.len())])
            .collect();
        self.inputs = vec![None; total];
    }

    fn evaluate(&mut self, machine: &mut PhaseMachine, now_ms: f64) {
        let correct = self
            .grid
            .iter()
            .zip(&self.inputs)
            .filter(|(shape, input)| **input == Some(shape.number()))
            .count();
        self.graded = Some((correct, self.time_left));
        self.stage_task = None;
        // begin_evaluating cancels the stage clock; only the reveal timer
        // survives into Evaluating
        if machine.begin_evaluating().is_ok() {
            machine.schedule(TimerKind::PhaseTimeout, EVALUATE_REVEAL_MS, now_ms);
            log::info!(
                "memory graded: {correct}/{} with {}s left",
                self.total_cells(),
                self.time_left
            );
        }
    }
}

impl MiniGame for MemoryGame {
    fn game_type(&self) -> GameType {
        GameType::Memory
    }

    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn init(&mut self, machine: &mut PhaseMachine, now_ms: f64) -> Result<(), PhaseError> {
        machine.begin_countdown(COUNTDOWN_TICKS, COUNTDOWN_INTERVAL_MS, now_ms)?;
        self.grid.clear();
        self.inputs.clear();
        self.graded = None;
        log::info!(
            "memory attempt started ({}x{} grid)",
            self.grid_size,
            self.grid_size
        );
        Ok(())
    }

    fn tick(&mut self, _machine: &mut PhaseMachine, _now_ms: f64) {
        // All progression is timer-driven; nothing to integrate per frame
    }

    fn on_event(&mut self, event: &PhaseEvent, machine: &mut PhaseMachine, now_ms: f64) {
        match event {
            PhaseEvent::EnteredActive => {
                self.shuffle_grid();
                self.stage = Stage::Memorize;
                self.time_left = self.memorize_secs;
                self.stage_task =
                    Some(machine.schedule_repeating(TimerKind::StageTick, STAGE_TICK_MS, now_ms));
            }
            PhaseEvent::Timer(fired) => match fired.kind {
                TimerKind::StageTick if self.stage_task == Some(fired.handle) => {
                    self.time_left = self.time_left.saturating_sub(1);
                    if self.time_left == 0 {
                        match self.stage {
                            Stage::Memorize => {
                                // Grid hides; same cadence keeps ticking
                                self.stage = Stage::Recall;
                                self.time_left = self.recall_secs;
                            }
                            Stage::Recall => self.evaluate(machine, now_ms),
                        }
                    }
                }
                TimerKind::PhaseTimeout if machine.phase() == Phase::Evaluating => {
                    let _ = machine.finish();
                }
                _ => {}
            },
            PhaseEvent::CountdownTick { .. } => {}
        }
    }

    fn score(&self) -> ScoreRecord {
        let (correct, time_left) = self.graded.unwrap_or((0, 0));
        let total = self.total_cells();
        let time_bonus = i64::from(time_left);
        let score = correct as i64 * 25 + time_bonus.max(0);
        let accuracy = if total > 0 {
            ((correct as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };
        let duration = self.memorize_secs + self.recall_secs - time_left;

        let mut auxiliary = Map::new();
        auxiliary.insert("gridSize".into(), Value::from(self.grid_size));
        auxiliary.insert("correctCells".into(), Value::from(correct));
        auxiliary.insert("totalCells".into(), Value::from(total));
        auxiliary.insert("timeBonus".into(), Value::from(time_bonus));
        ScoreRecord {
            game_type: GameType::Memory,
            difficulty: self.difficulty,
            score,
            duration,
            accuracy,
            auxiliary,
        }
    }

    fn reset(&mut self, machine: &mut PhaseMachine) {
        machine.reset();
        self.stage_task = None;
        self.grid.clear();
        self.inputs.clear();
        self.graded = None;
        self.stage = Stage::Memorize;
        self.time_left = 0;
    }

    fn cleanup(&mut self, machine: &mut PhaseMachine) {
        self.reset(machine);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::GameSession;
    use crate::session::MemorySink;

    fn run_countdown(s: &mut GameSession<MemoryGame, MemorySink>) -> f64 {
        s.start(0.0).unwrap();
        let mut now = 0.0;
        for _ in 0..3 {
            now += 1000.0;
            s.frame(now);
        }
        assert_eq!(s.phase(), Phase::Active);
        now
    }

    #[test]
    fn test_countdown_then_memorize() {
        let mut s = GameSession::new(MemoryGame::new(Difficulty::Easy, 7), MemorySink::default());
        s.start(0.0).unwrap();
        assert_eq!(s.phase(), Phase::Countdown { ticks_remaining: 3 });
        s.frame(1000.0);
        s.frame(2000.0);
        assert_eq!(s.phase(), Phase::Countdown { ticks_remaining: 1 });
        s.frame(3000.0);
        assert_eq!(s.phase(), Phase::Active);
        assert_eq!(s.game().grid().len(), 4);
        assert_eq!(s.game().time_left(), 5);
        assert!(!s.game().is_recalling());
    }

    #[test]
    fn test_grid_shuffle_is_seeded() {
        let mut a = GameSession::new(MemoryGame::new(Difficulty::Hard, 42), MemorySink::default());
        let mut b = GameSession::new(MemoryGame::new(Difficulty::Hard, 42), MemorySink::default());
        run_countdown(&mut a);
        run_countdown(&mut b);
        assert_eq!(a.game().grid(), b.game().grid());

        let mut c = GameSession::new(MemoryGame::new(Difficulty::Hard, 43), MemorySink::default());
        run_countdown(&mut c);
        assert_ne!(a.game().grid(), c.game().grid());
    }

    #[test]
    fn test_all_correct_scores_per_formula() {
        // Easy: 2x2 grid, 5s memorize, 30s recall
        let mut s = GameSession::new(MemoryGame::new(Difficulty::Easy, 1), MemorySink::default());
        let mut now = run_countdown(&mut s);

        // Sit through the memorize window
        for _ in 0..5 {
            now += 1000.0;
            s.frame(now);
        }
        assert!(s.game().is_recalling());
        assert_eq!(s.game().time_left(), 30);

        // Ten seconds into recall, answer everything correctly
        for _ in 0..10 {
            now += 1000.0;
            s.frame(now);
        }
        let answers: Vec<u8> = s.game().grid().iter().map(Shape::number).collect();
        for (cell, value) in answers.into_iter().enumerate() {
            let (game, machine) = s.parts_mut();
            game.submit(machine, cell, value, now);
        }
        assert_eq!(s.phase(), Phase::Evaluating);

        // Reveal pause, then results
        now += EVALUATE_REVEAL_MS;
        s.frame(now);
        assert_eq!(s.phase(), Phase::Results);

        let rec = &s.sink().records[0];
        // 4 correct * 25 + floor(20s left) = 120
        assert_eq!(rec.score, 4 * 25 + 20);
        assert_eq!(rec.accuracy, 100);
        // duration = memorize + recall - timeLeft = 5 + 30 - 20
        assert_eq!(rec.duration, 15);
    }

    #[test]
    fn test_recall_expiry_grades_partial_input() {
        let mut s = GameSession::new(MemoryGame::new(Difficulty::Easy, 9), MemorySink::default());
        let mut now = run_countdown(&mut s);
        for _ in 0..5 {
            now += 1000.0;
            s.frame(now);
        }
        // Answer a single cell, correctly
        let first = s.game().grid()[0].number();
        {
            let (game, machine) = s.parts_mut();
            game.submit(machine, 0, first, now);
        }
        // Let the full recall window expire
        for _ in 0..30 {
            now += 1000.0;
            s.frame(now);
        }
        assert_eq!(s.phase(), Phase::Evaluating);
        now += EVALUATE_REVEAL_MS;
        s.frame(now);

        let rec = &s.sink().records[0];
        // 1 correct, no time bonus
        assert_eq!(rec.score, 25);
        assert_eq!(rec.accuracy, 25);
        assert_eq!(rec.duration, 35);
    }

    #[test]
    fn test_submit_ignored_outside_recall() {
        let mut s = GameSession::new(MemoryGame::new(Difficulty::Easy, 3), MemorySink::default());
        let now = run_countdown(&mut s);
        // Still memorizing: input must be dropped
        {
            let (game, machine) = s.parts_mut();
            game.submit(machine, 0, 1, now);
        }
        assert_eq!(s.phase(), Phase::Active);
        assert!(s.game().inputs.iter().all(Option::is_none));
    }

    #[test]
    fn test_reset_mid_recall_cancels_stage_clock() {
        let mut s = GameSession::new(MemoryGame::new(Difficulty::Easy, 3), MemorySink::default());
        let mut now = run_countdown(&mut s);
        for _ in 0..5 {
            now += 1000.0;
            s.frame(now);
        }
        assert!(s.game().is_recalling());
        s.reset();
        assert_eq!(s.phase(), Phase::Ready);
        assert!(s.game().grid().is_empty());
        // A minute later nothing fires
        s.frame(now + 60_000.0);
        assert_eq!(s.phase(), Phase::Ready);
        assert!(s.sink().records.is_empty());
    }
}
