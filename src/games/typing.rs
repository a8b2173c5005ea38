//! Speed-typing game
//!
//! A fixed round clock (0.1 s resolution, matching the on-screen tenths
//! display) counts down while the player types the prompted word. Words are
//! drawn from a seeded RNG so a replayed seed produces the same prompt
//! sequence. Score is words-per-minute weighted by accuracy.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde_json::{Map, Value};

use crate::consts::TYPING_TICK_MS;
use crate::phase::{PhaseError, PhaseEvent, PhaseMachine};
use crate::profile::{Difficulty, DifficultyProfile};
use crate::sched::{TaskHandle, TimerKind};
use crate::session::{GameType, ScoreRecord};

use super::MiniGame;

/// Built-in prompt bank, used when the host supplies no word list
const WORD_BANK: &[&str] = &[
    "apple", "bridge", "candle", "dragon", "eagle", "forest", "garden", "hammer", "island",
    "jungle", "kettle", "ladder", "mirror", "needle", "orange", "pencil", "quartz", "ribbon",
    "silver", "temple", "umbrella", "valley", "window", "yellow", "zephyr", "anchor", "basket",
    "copper", "desert", "ember", "falcon", "glacier", "harbor", "ivory", "jigsaw", "knight",
    "lantern", "meadow", "nectar", "oyster",
];

pub struct TypingGame {
    difficulty: Difficulty,
    round_secs: u32,
    words: Vec<String>,
    rng: Pcg32,
    seed: u64,
    current_word: String,
    words_typed: u32,
    correct_words: u32,
    /// Tenths of a second remaining in the round
    time_left_tenths: u32,
    clock_task: Option<TaskHandle>,
}

impl TypingGame {
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        Self::with_words(
            difficulty,
            seed,
            WORD_BANK.iter().map(|w| (*w).to_string()).collect(),
        )
    }

    /// Host-supplied word list (must be non-empty; an empty list falls back
    /// to the built-in bank)
    pub fn with_words(difficulty: Difficulty, seed: u64, words: Vec<String>) -> Self {
        let words = if words.is_empty() {
            WORD_BANK.iter().map(|w| (*w).to_string()).collect()
        } else {
            words
        };
        Self {
            difficulty,
            round_secs: DifficultyProfile::typing_round_secs(difficulty),
            words,
            rng: Pcg32::seed_from_u64(seed),
            seed,
            current_word: String::new(),
            words_typed: 0,
            correct_words: 0,
            time_left_tenths: 0,
            clock_task: None,
        }
    }

    pub fn round_secs(&self) -> u32 {
        self.round_secs
    }

    /// The word currently prompted
    pub fn current_word(&self) -> &str {
        &self.current_word
    }

    pub fn words_typed(&self) -> u32 {
        self.words_typed
    }

    pub fn correct_words(&self) -> u32 {
        self.correct_words
    }

    /// Seconds remaining, with one decimal of resolution
    pub fn time_left_secs(&self) -> f64 {
        f64::from(self.time_left_tenths) / 10.0
    }

    fn next_word(&mut self) {
        let i = self.rng.random_range(0..self.words.len());
        self.current_word = self.words[i].clone();
    }

    /// Accept one submitted word. Comparison is exact (case and all); a miss
    /// still advances to the next prompt, mirroring the round flow.
    pub fn submit_word(&mut self, machine: &PhaseMachine, typed: &str) {
        if !machine.is_active() || self.clock_task.is_none() {
            return;
        }
        self.words_typed += 1;
        if typed == self.current_word {
            self.correct_words += 1;
        } else {
            log::debug!("miss: {typed:?} for {:?}", self.current_word);
        }
        self.next_word();
    }

    fn wpm(&self) -> u32 {
        ((f64::from(self.correct_words) / f64::from(self.round_secs)) * 60.0).round() as u32
    }

    fn accuracy(&self) -> u32 {
        if self.words_typed == 0 {
            100
        } else {
            ((f64::from(self.correct_words) / f64::from(self.words_typed)) * 100.0).round() as u32
        }
    }
}

impl MiniGame for TypingGame {
    fn game_type(&self) -> GameType {
        GameType::SpeedTyping
    }

    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn init(&mut self, machine: &mut PhaseMachine, now_ms: f64) -> Result<(), PhaseError> {
        machine.begin_active()?;
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.words_typed = 0;
        self.correct_words = 0;
        self.time_left_tenths = self.round_secs * 10;
        self.next_word();
        self.clock_task =
            Some(machine.schedule_repeating(TimerKind::StageTick, TYPING_TICK_MS, now_ms));
        log::info!("typing round started: {}s", self.round_secs);
        Ok(())
    }

    fn tick(&mut self, _machine: &mut PhaseMachine, _now_ms: f64) {}

    fn on_event(&mut self, event: &PhaseEvent, machine: &mut PhaseMachine, _now_ms: f64) {
        if let PhaseEvent::Timer(fired) = event {
            if fired.kind == TimerKind::StageTick && self.clock_task == Some(fired.handle) {
                self.time_left_tenths = self.time_left_tenths.saturating_sub(1);
                if self.time_left_tenths == 0 {
                    self.clock_task = None;
                    let _ = machine.finish();
                    log::info!(
                        "typing round over: {} correct of {}",
                        self.correct_words,
                        self.words_typed
                    );
                }
            }
        }
    }

    fn score(&self) -> ScoreRecord {
        let wpm = self.wpm();
        let accuracy = self.accuracy();
        let score = (f64::from(wpm) * f64::from(accuracy) / 100.0 * 10.0).round() as i64;

        let mut auxiliary = Map::new();
        auxiliary.insert("wpm".into(), Value::from(wpm));
        auxiliary.insert("wordsTyped".into(), Value::from(self.words_typed));
        auxiliary.insert("correctWords".into(), Value::from(self.correct_words));
        ScoreRecord {
            game_type: GameType::SpeedTyping,
            difficulty: self.difficulty,
            score,
            duration: self.round_secs,
            accuracy,
            auxiliary,
        }
    }

    fn reset(&mut self, machine: &mut PhaseMachine) {
        machine.reset();
        self.clock_task = None;
        self.current_word.clear();
        self.words_typed = 0;
        self.correct_words = 0;
        self.time_left_tenths = 0;
    }

    fn cleanup(&mut self, machine: &mut PhaseMachine) {
        self.reset(machine);
    }
}
