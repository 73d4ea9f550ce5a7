//! Tunable gameplay constants.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Reference frame length: per-frame speeds in the behavior tables are
/// expressed in pixels per 60 Hz frame and scaled by `FrameDt::steps`.
pub const BASE_FRAME_MS: f32 = 1000.0 / 60.0;

/// Hard clamp on the simulation delta so one slow frame can never tunnel
/// bullets through enemies or double-run spawn rolls.
pub const MAX_FRAME_MS: f32 = 50.0;

/// Invincibility window after losing a life, before upgrade bonuses.
pub const INVINCIBLE_MS: f32 = 1200.0;

/// Play-field in screen coordinates: origin top-left, y grows downward,
/// the player sits near the bottom edge. The renderer owns the mapping to
/// whatever the actual canvas is.
#[derive(Resource, Debug, Clone, Copy)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self { width: 480.0, height: 800.0 }
    }
}

impl Playfield {
    /// Enemies below this line are despawned without damage or reward.
    #[inline]
    pub fn bottom_cull(&self) -> f32 {
        self.height + 80.0
    }
}

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Nightmare,
}

/// Per-difficulty knobs. `level_mult` scales the mission-level thresholds,
/// `score_mult` scales kill rewards; they are deliberately independent.
#[derive(Debug, Clone, Copy)]
pub struct DifficultyConfig {
    pub lives: i32,
    pub enemy_speed: f32,
    pub spawn_rate: f32,
    pub score_mult: f32,
    pub boss_hp_mult: f32,
    pub powerup_rate: f32,
    pub level_mult: f32,
}

impl Difficulty {
    pub fn config(self) -> DifficultyConfig {
        match self {
            Difficulty::Easy => DifficultyConfig {
                lives: 6,
                enemy_speed: 0.55,
                spawn_rate: 0.010,
                score_mult: 1.0,
                boss_hp_mult: 0.5,
                powerup_rate: 0.012,
                level_mult: 0.7,
            },
            Difficulty::Normal => DifficultyConfig {
                lives: 4,
                enemy_speed: 0.80,
                spawn_rate: 0.014,
                score_mult: 1.5,
                boss_hp_mult: 0.8,
                powerup_rate: 0.006,
                level_mult: 1.0,
            },
            Difficulty::Hard => DifficultyConfig {
                lives: 2,
                enemy_speed: 1.2,
                spawn_rate: 0.020,
                score_mult: 2.0,
                boss_hp_mult: 1.1,
                powerup_rate: 0.003,
                level_mult: 1.3,
            },
            Difficulty::Nightmare => DifficultyConfig {
                lives: 1,
                enemy_speed: 1.7,
                spawn_rate: 0.028,
                score_mult: 3.0,
                boss_hp_mult: 1.6,
                powerup_rate: 0.0,
                level_mult: 1.6,
            },
        }
    }

    /// Lives can exceed the starting count (life-steal drops, regen) but
    /// only up to this cap.
    pub fn life_cap(self) -> i32 {
        self.config().lives + 2
    }
}

/// Mission-XP needed to advance past `level`.
pub fn level_threshold(level: u32, difficulty: Difficulty) -> u64 {
    let l = level as f32;
    ((800.0 + l * 350.0 + l * l * 40.0) * difficulty.config().level_mult).floor() as u64
}
