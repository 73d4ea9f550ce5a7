//! Persistent progression snapshot.
//!
//! The simulation owns the in-memory truth; the host owns storage. On boot
//! the host hands us one JSON string (decoded leniently — a corrupted save
//! must never prevent a run), and we hand encoded snapshots back through an
//! injected save hook, throttled so a kill streak does not hammer storage.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::bonus::{SkillLevels, UpgradeLevels};

/// Ship XP needed to go from `ship_level` to the next.
pub fn ship_level_threshold(ship_level: u32) -> u64 {
    ship_level as u64 * 1200
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressStore {
    pub coins: u64,
    pub ship_xp: u64,
    pub ship_level: u32,
    pub upgrades: UpgradeLevels,
    pub skills: SkillLevels,
    pub best_score: u64,
    pub total_kills: u64,
    pub total_bosses: u64,
    pub max_combo_ever: u32,
}

impl Default for ProgressStore {
    fn default() -> Self {
        Self {
            coins: 0,
            ship_xp: 0,
            ship_level: 1,
            upgrades: UpgradeLevels::default(),
            skills: SkillLevels::default(),
            best_score: 0,
            total_kills: 0,
            total_bosses: 0,
            max_combo_ever: 0,
        }
    }
}

/// Result of crossing a ship-level threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipLevelUp {
    pub new_level: u32,
    pub bonus_coins: u64,
}

impl ProgressStore {
    /// Lenient decode: malformed data degrades to defaults instead of
    /// refusing to start a run.
    pub fn from_json(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(store) => store,
            Err(err) => {
                warn!("progress snapshot unreadable, starting fresh: {err}");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Credit ship XP (already xp-multiplied by the caller) and handle at
    /// most one level-up, awarding the coin bonus.
    pub fn add_ship_xp(&mut self, amount: u64) -> Option<ShipLevelUp> {
        self.ship_xp += amount;
        let needed = ship_level_threshold(self.ship_level);
        if self.ship_xp < needed {
            return None;
        }
        self.ship_xp -= needed;
        self.ship_level += 1;
        let bonus_coins = 80 + self.ship_level as u64 * 10;
        self.coins += bonus_coins;
        Some(ShipLevelUp { new_level: self.ship_level, bonus_coins })
    }

    /// Skill points earned by ship levels, minus points already spent.
    pub fn skill_points_available(&self) -> u32 {
        (self.ship_level.saturating_sub(1)).saturating_sub(self.skills.total())
    }

    /// Learn one level of a skill if a point is available. The caller must
    /// invalidate the bonus bundle on success.
    pub fn try_learn(&mut self, learn: impl FnOnce(&mut SkillLevels) -> &mut u8) -> bool {
        if self.skill_points_available() == 0 {
            return false;
        }
        let lvl = learn(&mut self.skills);
        if *lvl >= SkillLevels::MAX_LEVEL {
            return false;
        }
        *lvl += 1;
        true
    }
}

type SaveFn = Box<dyn Fn(&str) + Send + Sync>;

/// Host-injected sink for encoded snapshots. Unset in tests and headless
/// runs; saving is then a no-op.
#[derive(Resource, Default)]
pub struct SaveHook(pub Option<SaveFn>);

/// Minimum milliseconds between snapshot writes.
pub const SAVE_INTERVAL_MS: f32 = 3000.0;

#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct SaveThrottle {
    pub since_last_ms: f32,
    pub dirty: bool,
}

pub fn throttled_save(
    dt: Res<crate::plugins::core::FrameDt>,
    mut throttle: ResMut<SaveThrottle>,
    store: Res<ProgressStore>,
    hook: Res<SaveHook>,
) {
    throttle.since_last_ms += dt.ms;
    if !throttle.dirty || throttle.since_last_ms < SAVE_INTERVAL_MS {
        return;
    }
    throttle.dirty = false;
    throttle.since_last_ms = 0.0;
    if let Some(save) = &hook.0 {
        save(&store.to_json());
    }
}

/// Forced write when a run ends, regardless of the throttle.
pub fn force_save(mut throttle: ResMut<SaveThrottle>, store: Res<ProgressStore>, hook: Res<SaveHook>) {
    throttle.dirty = false;
    throttle.since_last_ms = 0.0;
    if let Some(save) = &hook.0 {
        save(&store.to_json());
    }
}
