//! The kill path: the single authority over kill rewards.
//!
//! Anything that drops an enemy's hp to zero converges here. Score, mission
//! XP, coins, ship XP, combo, drops, splitter fragments, boss victory and
//! the persistent counters all happen in this one pass, exactly once per
//! enemy — the `PendingDespawn` marker makes a second visit impossible.

use bevy::prelude::*;
use rand::Rng;

use crate::common::tunables::Difficulty;
use crate::plugins::bosses::{Boss, BossActive, BossBrain, MiniBoss};
use crate::plugins::core::{FrameDt, RunStats, SimRng};
use crate::plugins::effects::{QualitySettings, VisualEffect, spawn_explosion};
use crate::plugins::enemies::components::{Enemy, EnemyKind, MoveSpeed, kind_config};
use crate::plugins::enemies::spawn::spawn_splitter_fragments;
use crate::plugins::feedback::{FeedbackHooks, HapticKind, NotifyTone, SoundKind};
use crate::plugins::powerups::spawn_powerup;
use crate::plugins::progression::{ActiveEffects, BonusBundle, ProgressStore, SaveThrottle};

use super::components::{Extents, Hp, PendingDespawn};

pub const COMBO_MAX: u32 = 20;
pub const COMBO_IDLE_MS: f32 = 2500.0;

/// Kill-streak multiplier in [1, 20]. Decays to exactly 1 after the idle
/// window passes without a kill.
#[derive(Resource, Debug, Clone, Copy)]
pub struct Combo {
    pub value: u32,
    pub timer_ms: f32,
    pub best: u32,
}

impl Default for Combo {
    fn default() -> Self {
        Self { value: 1, timer_ms: 0.0, best: 1 }
    }
}

impl Combo {
    pub fn register_kill(&mut self) {
        self.value = (self.value + 1).min(COMBO_MAX);
        self.best = self.best.max(self.value);
        self.timer_ms = COMBO_IDLE_MS;
    }

    pub fn tick(&mut self, dt_ms: f32) {
        if self.timer_ms > 0.0 {
            self.timer_ms -= dt_ms;
        } else if self.value > 1 {
            self.value = 1;
        }
    }
}

pub fn tick_combo(dt: Res<FrameDt>, mut combo: ResMut<Combo>) {
    combo.tick(dt.ms);
}

/// Per-kind drop-rate factor on top of the difficulty's base rate.
fn drop_factor(kind: EnemyKind) -> f32 {
    match kind {
        EnemyKind::Tank => 3.0,
        EnemyKind::Splitter => 2.5,
        EnemyKind::Shooter => 2.0,
        EnemyKind::Boss => 5.0,
        _ => 1.0,
    }
}

fn coin_base(kind: EnemyKind) -> f32 {
    match kind {
        EnemyKind::Boss => 8.0,
        EnemyKind::MiniBoss => 3.0,
        _ => 0.5,
    }
}

fn ship_xp_base(kind: EnemyKind) -> u64 {
    match kind {
        EnemyKind::Boss => 50,
        EnemyKind::MiniBoss => 15,
        _ => 5,
    }
}

#[allow(clippy::too_many_arguments)]
pub fn process_kills(
    mut commands: Commands,
    difficulty: Res<Difficulty>,
    mut stats: ResMut<RunStats>,
    mut combo: ResMut<Combo>,
    mut store: ResMut<ProgressStore>,
    mut throttle: ResMut<SaveThrottle>,
    bundle: Res<BonusBundle>,
    effects: Res<ActiveEffects>,
    mut boss_active: ResMut<BossActive>,
    mut rng: ResMut<SimRng>,
    quality: Res<QualitySettings>,
    hooks: Res<FeedbackHooks>,
    q_visuals: Query<(), With<VisualEffect>>,
    mut q_dead: Query<
        (
            Entity,
            &EnemyKind,
            &Transform,
            &Extents,
            &MoveSpeed,
            &mut Hp,
            Option<&Boss>,
            Option<&mut BossBrain>,
            Option<&MiniBoss>,
        ),
        (With<Enemy>, Without<PendingDespawn>),
    >,
) {
    let cfg = difficulty.config();
    let mut live_visuals = q_visuals.iter().count();

    for (entity, kind, tf, extents, speed, mut hp, boss, boss_brain, mini) in &mut q_dead {
        if !hp.dead() {
            continue;
        }
        let pos = tf.translation.truncate();

        // Phoenix cheats death exactly once: restored to 60% and enraged,
        // with no rewards paid out.
        if let (Some(boss), Some(mut brain)) = (boss, boss_brain) {
            if brain.phoenix_rebirth_available() {
                brain.mark_phoenix_reborn();
                hp.hp = (hp.max as f32 * 0.6).floor() as i32;
                spawn_explosion(
                    &mut commands,
                    &mut rng.0,
                    &mut live_visuals,
                    quality.particle_budget,
                    pos,
                    boss.color,
                    40,
                );
                hooks.sound(SoundKind::Explode);
                hooks.notify("PHOENIX REBORN", NotifyTone::Boss);
                continue;
            }
        }

        commands.entity(entity).insert(PendingDespawn);

        let level = stats.level as u64;
        let is_boss = *kind == EnemyKind::Boss;

        // Boss victory bookkeeping happens before the reward math so the
        // boss's own points land in live progress, then the withheld XP
        // from the fight flushes on top.
        if is_boss {
            boss_active.0 = None;
            stats.bosses_killed += 1;
            store.total_bosses += 1;
            let bonus = 500 * level;
            stats.score += bonus;
            stats.level_progress += bonus;
            if let Some(boss) = boss {
                hooks.notify(&format!("{} DESTROYED", boss.name), NotifyTone::Boss);
            }
        }

        // Rewards use the streak as it stood when the kill landed; the
        // increment below feeds the next one.
        let streak = combo.value;
        let base = kind_config(*kind).xp as u64;
        let points = (base as f32 * level as f32 * cfg.score_mult * streak as f32).floor() as u64;
        stats.score += points;
        stats.add_mission_xp(points, boss_active.0.is_some());

        let streak_bonus = if streak > 5 { 2.0 } else { 1.0 };
        let mut coins =
            (coin_base(*kind) * level as f32 * streak_bonus * bundle.coin_mult).floor() as u64;
        if effects.double_coin_ms > 0.0 {
            coins *= 2;
        }
        store.coins += coins;
        stats.coins_earned += coins;

        let ship_xp = (ship_xp_base(*kind) * level) as f32 * bundle.xp_mult;
        if let Some(level_up) = store.add_ship_xp(ship_xp.floor() as u64) {
            hooks.sound(SoundKind::LevelUp);
            hooks.notify(
                &format!("SHIP LVL {} (+{} coins)", level_up.new_level, level_up.bonus_coins),
                NotifyTone::Gold,
            );
        }

        combo.register_kill();
        store.max_combo_ever = store.max_combo_ever.max(combo.best);

        stats.kills += 1;
        store.total_kills += 1;
        throttle.dirty = true;

        if bundle.vampirism_chance > 0.0
            && rng.0.gen_range(0.0..1.0) < bundle.vampirism_chance
            && stats.lives < difficulty.life_cap()
        {
            stats.lives += 1;
            hooks.notify("VAMPIRISM +1 LIFE", NotifyTone::Info);
        }

        if *kind == EnemyKind::Splitter {
            spawn_splitter_fragments(&mut commands, pos, *extents, speed.0);
        }

        if mini.is_some() {
            // Mini-bosses always pay out a drop.
            spawn_powerup(&mut commands, &mut rng.0, pos, None);
        } else {
            let chance = cfg.powerup_rate * drop_factor(*kind) * bundle.drop_luck_mult;
            if chance > 0.0 && rng.0.gen_range(0.0..1.0) < chance {
                spawn_powerup(&mut commands, &mut rng.0, pos, None);
            }
        }

        spawn_explosion(
            &mut commands,
            &mut rng.0,
            &mut live_visuals,
            quality.particle_budget,
            pos,
            Color::srgb(1.0, 0.42, 0.0),
            if is_boss { 60 } else { 28 },
        );
        hooks.sound(SoundKind::Explode);
        hooks.haptic(if is_boss { HapticKind::Heavy } else { HapticKind::Light });
        if streak > 1 {
            hooks.notify(&format!("+{points} x{streak}"), NotifyTone::Gold);
        } else {
            hooks.notify(&format!("+{points}"), NotifyTone::Gold);
        }

        // Flush withheld mission XP once the field is boss-free again.
        if is_boss {
            stats.level_progress += stats.pending_level_progress;
            stats.pending_level_progress = 0;
        }
    }
}

/// Structural removal, deferred to the cleanup stage.
pub fn despawn_marked(mut commands: Commands, q: Query<Entity, With<PendingDespawn>>) {
    for e in &q {
        commands.entity(e).despawn();
    }
}

/// Run-end bookkeeping: candidate best score and combo into the persistent
/// store, before the forced save flush.
pub fn finalize_run(mut store: ResMut<ProgressStore>, stats: Res<RunStats>, combo: Res<Combo>) {
    store.best_score = store.best_score.max(stats.score);
    store.max_combo_ever = store.max_combo_ever.max(combo.best);
}
