//! Difficulty selection and per-difficulty tuning
//!
//! A profile is chosen once before game construction and is immutable for the
//! lifetime of the attempt. An unknown difficulty string falls back to Easy.

use serde::{Deserialize, Serialize};

/// Difficulty levels offered by the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Parse a menu selection; anything unrecognized maps to the default
    pub fn from_menu(s: Option<&str>) -> Self {
        match s.map(str::to_lowercase).as_deref() {
            Some("easy") => Difficulty::Easy,
            Some("medium") | Some("med") => Difficulty::Medium,
            Some("hard") => Difficulty::Hard,
            _ => {
                log::debug!("unknown difficulty {s:?}, using default");
                Difficulty::default()
            }
        }
    }
}

/// Balance-game tuning constants for one difficulty
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Stick length in render-space units (pixels)
    pub stick_length: f32,
    /// Wall-clock interval between sensitivity increments
    pub sensitivity_interval_ms: u32,
    /// Keyboard torque before hold acceleration
    pub base_torque: f32,
    /// Clamp applied to the arbitrated torque
    pub max_torque: f32,
}

impl DifficultyProfile {
    /// Tuning table: shorter sticks get weaker torque to compensate
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                stick_length: 200.0,
                sensitivity_interval_ms: 10_000,
                base_torque: 0.08,
                max_torque: 0.4,
            },
            Difficulty::Medium => Self {
                stick_length: 130.0,
                sensitivity_interval_ms: 7_000,
                base_torque: 0.05,
                max_torque: 0.25,
            },
            Difficulty::Hard => Self {
                stick_length: 75.0,
                sensitivity_interval_ms: 5_000,
                base_torque: 0.03,
                max_torque: 0.15,
            },
        }
    }

    /// Grid edge for the memory game (2x2, 3x3, 4x4)
    pub fn memory_grid_size(difficulty: Difficulty) -> usize {
        match difficulty {
            Difficulty::Easy => 2,
            Difficulty::Medium => 3,
            Difficulty::Hard => 4,
        }
    }

    /// Seconds the memory grid stays revealed
    pub fn memory_memorize_secs(difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => 5,
            Difficulty::Medium => 4,
            Difficulty::Hard => 3,
        }
    }

    /// Seconds allowed for recall input
    pub fn memory_recall_secs(difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => 30,
            Difficulty::Medium => 25,
            Difficulty::Hard => 20,
        }
    }

    /// Round length for the typing game
    pub fn typing_round_secs(difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => 60,
            Difficulty::Medium => 45,
            Difficulty::Hard => 30,
        }
    }
}
