//! Progression plugin: bonus resolution, skills, mission levels and the
//! persistence snapshot.

use bevy::prelude::*;

use crate::common::state::{GameState, sim_active};
use crate::common::tunables::{Difficulty, level_threshold};
use crate::plugins::core::{RunStats, TickSet};
use crate::plugins::feedback::{FeedbackHooks, NotifyTone, SoundKind};

pub mod bonus;
pub mod persist;
pub mod skills;

pub use bonus::{BonusBundle, BonusDirty, SkillLevels, UpgradeId, UpgradeLevels};
pub use persist::{ProgressStore, SaveHook, SaveThrottle};
pub use skills::{ActiveEffects, RegenTimer, SkillState};

/// The set-piece owed at a decade boundary, consumed by the boss and armada
/// spawners on the following tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetPiece {
    Boss,
    Armada,
}

#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct StageDirector {
    pub pending: Option<SetPiece>,
}

/// Advance the mission level whenever accumulated XP crosses the threshold.
/// Crossing a multiple-of-ten level queues the decade set-piece: even decade
/// a boss, odd decade an armada.
pub fn mission_progress(
    difficulty: Res<Difficulty>,
    mut stats: ResMut<RunStats>,
    mut director: ResMut<StageDirector>,
    hooks: Res<FeedbackHooks>,
) {
    loop {
        let threshold = level_threshold(stats.level, *difficulty);
        if stats.level_progress < threshold {
            break;
        }
        stats.level_progress = 0;
        stats.level += 1;
        hooks.sound(SoundKind::LevelUp);
        hooks.notify(&format!("LEVEL {}", stats.level), NotifyTone::LevelUp);

        if stats.level % 10 == 0 {
            let decade = stats.level / 10;
            director.pending = Some(if decade % 2 == 0 { SetPiece::Boss } else { SetPiece::Armada });
        }
    }
}

pub fn reset_progression(
    store: Res<ProgressStore>,
    mut effects: ResMut<ActiveEffects>,
    mut skill_state: ResMut<SkillState>,
    mut regen: ResMut<RegenTimer>,
    mut director: ResMut<StageDirector>,
    mut dirty: ResMut<BonusDirty>,
    mut bundle: ResMut<BonusBundle>,
    mut stats: ResMut<RunStats>,
) {
    *effects = ActiveEffects::default();
    *skill_state = SkillState::default();
    *regen = RegenTimer::default();
    *director = StageDirector::default();

    // Menu-time purchases may have left the cache stale, and the effect
    // reset above is itself a resolver input change; recompute now so the
    // start-of-run reads below see current values.
    *bundle = bonus::compute_bonus(&store.upgrades, &store.skills, &effects);
    dirty.0 = false;

    stats.lives += bundle.extra_life;
    if bundle.has_start_shield {
        effects.shield_ms = 9999.0;
    }
}

pub fn plugin(app: &mut App) {
    app.insert_resource(ProgressStore::default())
        .insert_resource(BonusBundle::default())
        .insert_resource(BonusDirty(true))
        .insert_resource(ActiveEffects::default())
        .insert_resource(SkillState::default())
        .insert_resource(RegenTimer::default())
        .insert_resource(StageDirector::default())
        .insert_resource(SaveHook::default())
        .insert_resource(SaveThrottle::default());

    app.add_systems(
        Update,
        bonus::refresh_bonus.in_set(TickSet::Frame).run_if(sim_active),
    );
    app.add_systems(
        Update,
        (skills::tick_effects, skills::tick_skills, skills::tick_regen)
            .chain()
            .in_set(TickSet::Timers)
            .run_if(sim_active),
    );
    app.add_systems(
        Update,
        (mission_progress, persist::throttled_save)
            .chain()
            .in_set(TickSet::Progress)
            .run_if(sim_active),
    );

    // Run-start ordering: core::reset_run seeds the base lives before the
    // bonus-derived extras are applied here.
    app.add_systems(
        OnEnter(GameState::InGame),
        reset_progression.after(crate::plugins::core::reset_run),
    );
    app.add_systems(OnExit(GameState::InGame), persist::force_save);
}
