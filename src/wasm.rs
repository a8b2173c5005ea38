//! Browser bindings
//!
//! Thin wrappers the page's JS drives directly: it forwards DOM events and
//! its requestAnimationFrame clock into a session, and reads back the small
//! snapshots it needs to draw. All game logic stays on the Rust side.

use wasm_bindgen::prelude::*;

use crate::games::{
    BalanceGame, FoldDirection, GameSession, MemoryGame, OrigamiGame, StepKind, TypingGame,
};
use crate::platform;
use crate::profile::Difficulty;
use crate::session::LogSink;
use crate::sim::DirKey;

/// Set up logging and the panic hook; call once before constructing games
#[wasm_bindgen]
pub fn init() {
    platform::init_logging();
    log::info!("mini-arcade core initialized");
}

fn parse_key(code: &str) -> Option<DirKey> {
    match code {
        "ArrowLeft" => Some(DirKey::ArrowLeft),
        "KeyA" => Some(DirKey::KeyA),
        "ArrowRight" => Some(DirKey::ArrowRight),
        "KeyD" => Some(DirKey::KeyD),
        _ => None,
    }
}

fn phase_name(session_phase: crate::phase::Phase) -> String {
    use crate::phase::Phase;
    match session_phase {
        Phase::Ready => "ready".into(),
        Phase::Countdown { ticks_remaining } => format!("countdown:{ticks_remaining}"),
        Phase::Active => "active".into(),
        Phase::Evaluating => "evaluating".into(),
        Phase::Results => "results".into(),
    }
}

fn start_err(e: crate::phase::PhaseError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct Balance {
    session: GameSession<BalanceGame, LogSink>,
}

#[wasm_bindgen]
impl Balance {
    #[wasm_bindgen(constructor)]
    pub fn new(difficulty: Option<String>) -> Balance {
        let difficulty = Difficulty::from_menu(difficulty.as_deref());
        Balance {
            session: GameSession::new(BalanceGame::new(difficulty), LogSink),
        }
    }

    pub fn start(&mut self, now_ms: f64) -> Result<(), JsValue> {
        self.session.start(now_ms).map_err(start_err)
    }

    pub fn frame(&mut self, now_ms: f64) {
        self.session.frame(now_ms);
    }

    pub fn pointer(&mut self, x: f32) {
        let (game, _) = self.session.parts_mut();
        game.input_mut().set_pointer(x);
    }

    pub fn touch_start(&mut self, x: f32) {
        let (game, _) = self.session.parts_mut();
        game.input_mut().touch_start(x);
    }

    pub fn touch_move(&mut self, x: f32) {
        let (game, _) = self.session.parts_mut();
        game.input_mut().touch_move(x);
    }

    pub fn touch_end(&mut self) {
        let (game, _) = self.session.parts_mut();
        game.input_mut().touch_end();
    }

    pub fn key_down(&mut self, code: &str, now_ms: f64) {
        if let Some(key) = parse_key(code) {
            let (game, _) = self.session.parts_mut();
            game.input_mut().key_down(key, now_ms);
        }
    }

    pub fn key_up(&mut self, code: &str) {
        if let Some(key) = parse_key(code) {
            let (game, _) = self.session.parts_mut();
            game.input_mut().key_up(key);
        }
    }

    pub fn pause(&mut self) {
        let (game, machine) = self.session.parts_mut();
        game.pause(machine);
    }

    pub fn resume(&mut self, now_ms: f64) {
        let (game, machine) = self.session.parts_mut();
        game.resume(machine, now_ms);
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub fn phase(&self) -> String {
        phase_name(self.session.phase())
    }

    pub fn stick_angle(&self) -> f32 {
        self.session.game().pendulum().stick_angle
    }

    pub fn ball_position(&self) -> f32 {
        self.session.game().pendulum().ball_position
    }

    pub fn sensitivity(&self) -> f32 {
        self.session.game().pendulum().sensitivity
    }

    pub fn stick_length(&self) -> f32 {
        self.session.game().profile().stick_length
    }

    pub fn score(&self) -> f64 {
        self.session.game().pendulum().score() as f64
    }
}

#[wasm_bindgen]
pub struct Memory {
    session: GameSession<MemoryGame, LogSink>,
}

#[wasm_bindgen]
impl Memory {
    #[wasm_bindgen(constructor)]
    pub fn new(difficulty: Option<String>, seed: u64) -> Memory {
        let difficulty = Difficulty::from_menu(difficulty.as_deref());
        Memory {
            session: GameSession::new(MemoryGame::new(difficulty, seed), LogSink),
        }
    }

    pub fn start(&mut self, now_ms: f64) -> Result<(), JsValue> {
        self.session.start(now_ms).map_err(start_err)
    }

    pub fn frame(&mut self, now_ms: f64) {
        self.session.frame(now_ms);
    }

    /// Answer one cell with a shape number (1..=4)
    pub fn submit(&mut self, cell: usize, value: u8, now_ms: f64) {
        let (game, machine) = self.session.parts_mut();
        game.submit(machine, cell, value, now_ms);
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub fn phase(&self) -> String {
        phase_name(self.session.phase())
    }

    pub fn grid_size(&self) -> usize {
        self.session.game().grid_size()
    }

    /// Shape numbers of the revealed grid, row-major
    pub fn grid(&self) -> Vec<u8> {
        self.session.game().grid().iter().map(|s| s.number()).collect()
    }

    pub fn time_left(&self) -> u32 {
        self.session.game().time_left()
    }

    pub fn is_recalling(&self) -> bool {
        self.session.game().is_recalling()
    }
}

#[wasm_bindgen]
pub struct Typing {
    session: GameSession<TypingGame, LogSink>,
}

#[wasm_bindgen]
impl Typing {
    #[wasm_bindgen(constructor)]
    pub fn new(difficulty: Option<String>, seed: u64) -> Typing {
        let difficulty = Difficulty::from_menu(difficulty.as_deref());
        Typing {
            session: GameSession::new(TypingGame::new(difficulty, seed), LogSink),
        }
    }

    pub fn start(&mut self, now_ms: f64) -> Result<(), JsValue> {
        self.session.start(now_ms).map_err(start_err)
    }

    pub fn frame(&mut self, now_ms: f64) {
        self.session.frame(now_ms);
    }

    pub fn submit_word(&mut self, typed: &str) {
        let (game, machine) = self.session.parts_mut();
        game.submit_word(machine, typed);
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub fn phase(&self) -> String {
        phase_name(self.session.phase())
    }

    pub fn current_word(&self) -> String {
        self.session.game().current_word().to_string()
    }

    pub fn time_left_secs(&self) -> f64 {
        self.session.game().time_left_secs()
    }

    pub fn words_typed(&self) -> u32 {
        self.session.game().words_typed()
    }

    pub fn correct_words(&self) -> u32 {
        self.session.game().correct_words()
    }
}

#[wasm_bindgen]
pub struct Origami {
    session: GameSession<OrigamiGame, LogSink>,
}

#[wasm_bindgen]
impl Origami {
    #[wasm_bindgen(constructor)]
    pub fn new(difficulty: Option<String>, seed: u64) -> Origami {
        let difficulty = Difficulty::from_menu(difficulty.as_deref());
        Origami {
            session: GameSession::new(OrigamiGame::new(difficulty, seed), LogSink),
        }
    }

    pub fn start(&mut self, now_ms: f64) -> Result<(), JsValue> {
        self.session.start(now_ms).map_err(start_err)
    }

    pub fn frame(&mut self, now_ms: f64) {
        self.session.frame(now_ms);
    }

    /// Attempt a fold named by kind ("fold", "unfold", "collapse",
    /// "petal_fold", "twist", "shape", "final") and optional direction
    /// ("horizontal", "vertical", "diagonal1", "diagonal2")
    pub fn attempt_fold(&mut self, kind: &str, direction: Option<String>, now_ms: f64) {
        let kind = match kind {
            "fold" => StepKind::Fold,
            "unfold" => StepKind::Unfold,
            "collapse" => StepKind::Collapse,
            "petal_fold" => StepKind::PetalFold,
            "twist" => StepKind::Twist,
            "shape" => StepKind::Shape,
            "final" => StepKind::Final,
            other => {
                log::debug!("unknown fold kind {other:?}");
                return;
            }
        };
        let direction = match direction.as_deref() {
            None => None,
            Some("horizontal") => Some(FoldDirection::Horizontal),
            Some("vertical") => Some(FoldDirection::Vertical),
            Some("diagonal1") => Some(FoldDirection::Diagonal1),
            Some("diagonal2") => Some(FoldDirection::Diagonal2),
            Some(other) => {
                log::debug!("unknown fold direction {other:?}");
                return;
            }
        };
        let (game, machine) = self.session.parts_mut();
        game.attempt_fold(machine, kind, direction, now_ms);
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub fn phase(&self) -> String {
        phase_name(self.session.phase())
    }

    pub fn pattern_name(&self) -> String {
        self.session.game().pattern().name.to_string()
    }

    pub fn total_steps(&self) -> usize {
        self.session.game().pattern().total_steps()
    }

    pub fn current_step(&self) -> usize {
        self.session.game().current_step()
    }

    pub fn current_instruction(&self) -> Option<String> {
        self.session.game().current_instruction().map(str::to_string)
    }

    pub fn mistakes(&self) -> u32 {
        self.session.game().mistakes()
    }
}
