//! Core plugin: shared resources, the tick ordering backbone and the
//! clamped frame delta.
//!
//! Every gameplay system hangs off one of the [`TickSet`] stages below.
//! The chain encodes the global per-tick order the simulation relies on:
//! input before firing, enemy updates before collisions, collisions before
//! the kill path, the kill path before spawning and progression. Systems in
//! other plugins place themselves with `.in_set(...)` and never order against
//! foreign systems directly.

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::common::state::{GameState, Paused, sim_active};
use crate::common::tunables::{Difficulty, MAX_FRAME_MS, Playfield};

/// One stage of the simulation tick, in execution order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    /// Frame delta sampling + bonus-bundle refresh.
    Frame,
    /// Input gathering and player movement.
    Input,
    /// Countdown timers: invincibility, buffs, combo decay, skill cooldowns.
    Timers,
    /// Weapon fire producers (bullet requests, rail activation).
    Fire,
    /// Bullet allocation + per-bullet update + rail burn.
    Bullets,
    /// Power-up fall, magnet attraction, collection.
    Powerups,
    /// Enemy behavior switch, boss/mini-boss/armada delegates, off-field cull.
    Enemies,
    /// Spatial grid rebuild.
    Grid,
    /// Collision passes: bullets x enemies, detonations, hazards/contact vs player.
    Collide,
    /// Centralized player damage path.
    Damage,
    /// Centralized kill path.
    Kill,
    /// Visual effect decay, hazard motion, quality monitor.
    Effects,
    /// Regular enemy + mini-boss spawn rolls.
    Spawn,
    /// Mission level thresholds, decade events, save throttling.
    Progress,
    /// Bullet pool commits and deferred despawns.
    Cleanup,
}

/// Clamped simulation delta for this frame, in milliseconds.
///
/// Movement code works in 60 Hz steps (`steps()`), timers in raw
/// milliseconds; both freeze together when the tick does not run.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct FrameDt {
    pub ms: f32,
}

impl FrameDt {
    #[inline]
    pub fn steps(self) -> f32 {
        self.ms / crate::common::tunables::BASE_FRAME_MS
    }
}

/// Seedable simulation RNG. Scenario tests construct it with a fixed seed;
/// the real game seeds from entropy.
#[derive(Resource)]
pub struct SimRng(pub StdRng);

impl Default for SimRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

/// Per-run scoring and progression counters, reset on every run start.
#[derive(Resource, Debug, Clone, Default)]
pub struct RunStats {
    pub score: u64,
    pub lives: i32,
    pub level: u32,
    pub level_progress: u64,
    /// Mission XP earned while a boss is alive; flushed on boss death,
    /// discarded if the fight is abandoned.
    pub pending_level_progress: u64,
    pub kills: u64,
    pub bosses_killed: u32,
    pub coins_earned: u64,
}

impl RunStats {
    /// Route mission XP: withheld during a boss fight, live otherwise.
    pub fn add_mission_xp(&mut self, amount: u64, boss_active: bool) {
        if boss_active {
            self.pending_level_progress += amount;
        } else {
            self.level_progress += amount;
        }
    }
}

fn sample_frame_dt(time: Res<Time>, mut dt: ResMut<FrameDt>) {
    dt.ms = (time.delta_secs() * 1000.0).min(MAX_FRAME_MS);
}

pub fn plugin(app: &mut App) {
    app.insert_resource(Playfield::default())
        .insert_resource(Difficulty::default())
        .insert_resource(Paused::default())
        .insert_resource(FrameDt::default())
        .insert_resource(SimRng::default())
        .insert_resource(RunStats::default())
        .insert_resource(ClearColor(Color::srgb(0.02, 0.02, 0.06)));

    app.configure_sets(
        Update,
        (
            TickSet::Frame,
            TickSet::Input,
            TickSet::Timers,
            TickSet::Fire,
            TickSet::Bullets,
            TickSet::Powerups,
            TickSet::Enemies,
            TickSet::Grid,
            TickSet::Collide,
            TickSet::Damage,
            TickSet::Kill,
            TickSet::Effects,
            TickSet::Spawn,
            TickSet::Progress,
            TickSet::Cleanup,
        )
            .chain(),
    );

    app.add_systems(
        Update,
        sample_frame_dt.in_set(TickSet::Frame).run_if(sim_active),
    );

    app.add_systems(OnEnter(GameState::InGame), reset_run);
}

/// Reset run-scoped counters when a new run begins. Lives are finalized by
/// the progression plugin once the bonus bundle is known; everything else
/// starts from zero. Entity cleanup is handled by
/// `DespawnOnExit(GameState::InGame)` on every run-scoped entity, so no
/// stale state leaks between runs.
pub fn reset_run(difficulty: Res<Difficulty>, mut stats: ResMut<RunStats>, mut paused: ResMut<Paused>) {
    *stats = RunStats {
        lives: difficulty.config().lives,
        level: 1,
        ..RunStats::default()
    };
    paused.0 = false;
}
