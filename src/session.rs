//! Score records and the session-recording boundary
//!
//! A finished attempt produces exactly one immutable [`ScoreRecord`], handed
//! to an external sink. Delivery is fire-and-forget: a sink failure is logged
//! and never surfaces to the player-facing state machine.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::profile::Difficulty;

/// Which mini-game produced a record (wire names match the backend enum)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameType {
    #[serde(rename = "balance")]
    Balance,
    #[serde(rename = "memoryGame")]
    Memory,
    #[serde(rename = "speedTyping")]
    SpeedTyping,
    #[serde(rename = "origami")]
    Origami,
}

impl GameType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::Balance => "balance",
            GameType::Memory => "memoryGame",
            GameType::SpeedTyping => "speedTyping",
            GameType::Origami => "origami",
        }
    }
}

/// Finalized summary of one attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    #[serde(rename = "gameType")]
    pub game_type: GameType,
    pub difficulty: Difficulty,
    pub score: i64,
    /// Whole seconds of play
    pub duration: u32,
    /// 0..=100
    pub accuracy: u32,
    /// Game-specific metrics (max sensitivity, wpm, pattern name, ...)
    #[serde(rename = "gameData")]
    pub auxiliary: Map<String, Value>,
}

/// Sink delivery failure; recoverable locally, never retried by the core
#[derive(Debug, Clone)]
pub struct SessionError(pub String);

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session record delivery failed: {}", self.0)
    }
}

impl std::error::Error for SessionError {}

/// External session recorder boundary
pub trait SessionSink {
    fn record(&mut self, record: &ScoreRecord) -> Result<(), SessionError>;
}

/// Sink that serializes records into the log (default for hosts without a
/// backend connection)
#[derive(Debug, Default)]
pub struct LogSink;

impl SessionSink for LogSink {
    fn record(&mut self, record: &ScoreRecord) -> Result<(), SessionError> {
        match serde_json::to_string(record) {
            Ok(json) => {
                log::info!("session record: {json}");
                Ok(())
            }
            Err(e) => Err(SessionError(e.to_string())),
        }
    }
}

/// Capturing sink for tests
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<ScoreRecord>,
    /// When set, every delivery fails (exercises the fire-and-forget path)
    pub fail: bool,
}

impl SessionSink for MemorySink {
    fn record(&mut self, record: &ScoreRecord) -> Result<(), SessionError> {
        if self.fail {
            return Err(SessionError("simulated outage".into()));
        }
        self.records.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(GameType::Memory.as_str(), "memoryGame");
        assert_eq!(GameType::SpeedTyping.as_str(), "speedTyping");
        let json = serde_json::to_string(&GameType::Balance).unwrap();
        assert_eq!(json, "\"balance\"");
    }

    #[test]
    fn test_record_round_trip() {
        let mut aux = Map::new();
        aux.insert("maxSensitivity".into(), Value::from(1.8));
        let rec = ScoreRecord {
            game_type: GameType::Balance,
            difficulty: Difficulty::Easy,
            score: 120,
            duration: 12,
            accuracy: 100,
            auxiliary: aux,
        };
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("\"gameType\":\"balance\""));
        let back: ScoreRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
    }
}
