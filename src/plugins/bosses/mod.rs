//! Bosses plugin: registry-driven boss and mini-boss AI.
//!
//! The drivers here are thin: they assemble a context from the world, call
//! the registry update function, then apply whatever the brain emitted
//! (hazard shots, minions, direct player hits). Phase transitions and the
//! entrance grace are handled outside the brains so every boss gets them
//! uniformly.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use rand::Rng;

use crate::common::state::{GameState, sim_active};
use crate::common::tunables::{Difficulty, Playfield};
use crate::plugins::combat::components::{Extents, Hp, PendingDespawn};
use crate::plugins::core::{FrameDt, RunStats, SimRng, TickSet};
use crate::plugins::effects::{HazardShot, spawn_boss_shot};
use crate::plugins::enemies::components::{Enemy, EnemyBrain, EnemyKind, MoveSpeed};
use crate::plugins::enemies::spawn::{EnemySeed, insert_enemy};
use crate::plugins::enemies::ArmadaState;
use crate::plugins::feedback::{FeedbackHooks, HapticKind, NotifyTone, SoundKind};
use crate::plugins::player::{Player, PlayerHit};
use crate::plugins::progression::{SetPiece, StageDirector};

pub mod miniboss;
pub mod registry;

pub use miniboss::{MiniBoss, MiniBossBrain, MiniBossId, MiniBossRegistry, miniboss_hp};
pub use registry::{
    Boss, BossBrain, BossCtx, BossId, BossPhases, BossRegistry, BossSpec, SpawnInvincible,
};

/// Handle to the live boss, if any. Exposed so the intro-animation layer can
/// find the boss and clear its grace flag, and so other systems can gate on
/// boss mode without scanning.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct BossActive(pub Option<Entity>);

/// Per-frame probability factor for the mini-boss roll.
const MINIBOSS_RATE: f32 = 0.0012;

/// Levels adjacent to a decade boundary are reserved for the full
/// set-pieces; mini-bosses stay out of them.
pub fn miniboss_allowed_at(level: u32) -> bool {
    !matches!(level % 10, 0 | 9)
}

/// Host-facing helper: the intro animation calls this when it finishes, to
/// lift the entrance grace.
pub fn clear_spawn_invincibility(world: &mut World) {
    let Some(boss) = world.resource::<BossActive>().0 else {
        return;
    };
    if let Ok(mut e) = world.get_entity_mut(boss) {
        e.remove::<SpawnInvincible>();
    }
}

/// Grace fallback: an intro layer that never calls back is a host bug, but
/// it must not leave the boss permanently invincible.
fn tick_spawn_invincible(
    mut commands: Commands,
    dt: Res<FrameDt>,
    mut q: Query<(Entity, &mut SpawnInvincible)>,
) {
    for (e, mut grace) in &mut q {
        grace.fallback_ms -= dt.ms;
        if grace.fallback_ms <= 0.0 {
            warn!("boss intro never cleared the entrance grace; clearing via fallback");
            commands.entity(e).remove::<SpawnInvincible>();
        }
    }
}

/// Consume a queued boss set-piece: pick uniformly among unlocked types and
/// spawn at the top center.
fn launch_boss(
    mut commands: Commands,
    mut director: ResMut<StageDirector>,
    mut boss_active: ResMut<BossActive>,
    registry: Res<BossRegistry>,
    field: Res<Playfield>,
    difficulty: Res<Difficulty>,
    stats: Res<RunStats>,
    mut rng: ResMut<SimRng>,
    hooks: Res<FeedbackHooks>,
) {
    if director.pending != Some(SetPiece::Boss) || boss_active.0.is_some() {
        return;
    }
    director.pending = None;

    let Some(spec) = registry.pick(&mut rng.0, stats.level) else {
        debug!("no boss unlocked at level {}, skipping set-piece", stats.level);
        return;
    };

    let hp = BossRegistry::hp_for(stats.level, difficulty.config().boss_hp_mult);
    let e = insert_enemy(
        &mut commands,
        EnemySeed {
            kind: EnemyKind::Boss,
            pos: Vec2::new(field.width * 0.5, -80.0),
            extents: Extents::new(spec.hw, spec.hh),
            speed: 0.8 + stats.level as f32 * 0.05,
            hp,
            brain: EnemyBrain::Boss,
        },
    );
    commands.entity(e).insert((
        Boss { id: spec.id, name: spec.name, color: spec.color },
        (spec.init)(&mut rng.0),
        BossPhases::default(),
        SpawnInvincible::default(),
        Sprite {
            color: spec.color,
            custom_size: Some(Vec2::new(spec.hw * 2.0, spec.hh * 2.0)),
            ..default()
        },
    ));
    boss_active.0 = Some(e);

    hooks.sound(SoundKind::Boss);
    hooks.haptic(HapticKind::Heavy);
    hooks.notify(&format!("{} INBOUND", spec.name), NotifyTone::Boss);
}

/// Probabilistic mini-boss entrance during normal play.
fn maybe_spawn_miniboss(
    mut commands: Commands,
    dt: Res<FrameDt>,
    registry: Res<MiniBossRegistry>,
    field: Res<Playfield>,
    difficulty: Res<Difficulty>,
    stats: Res<RunStats>,
    boss_active: Res<BossActive>,
    armada: Res<ArmadaState>,
    q_minibosses: Query<(), With<MiniBoss>>,
    mut rng: ResMut<SimRng>,
    hooks: Res<FeedbackHooks>,
) {
    if boss_active.0.is_some() || armada.active || !q_minibosses.is_empty() {
        return;
    }
    if !miniboss_allowed_at(stats.level) {
        return;
    }
    if rng.0.gen_range(0.0..1.0) >= MINIBOSS_RATE * dt.steps() {
        return;
    }

    let spec = registry.pick(&mut rng.0);
    let hp = miniboss_hp(stats.level, difficulty.config().boss_hp_mult);
    let e = insert_enemy(
        &mut commands,
        EnemySeed {
            kind: EnemyKind::MiniBoss,
            pos: Vec2::new(
                rng.0.gen_range(spec.hw..field.width - spec.hw),
                -spec.hh * 2.0,
            ),
            extents: Extents::new(spec.hw, spec.hh),
            speed: 1.0,
            hp,
            brain: EnemyBrain::MiniBoss,
        },
    );
    commands.entity(e).insert((
        MiniBoss { id: spec.id, name: spec.name, color: spec.color },
        (spec.init)(),
        Sprite {
            color: spec.color,
            custom_size: Some(Vec2::new(spec.hw * 2.0, spec.hh * 2.0)),
            ..default()
        },
    ));

    hooks.sound(SoundKind::Boss);
    hooks.notify(&format!("{} SIGHTED", spec.name), NotifyTone::Boss);
}

/// Threshold-triggered, monotonic phase transitions on hp ratio.
fn boss_phase_transitions(
    mut q: Query<(&Boss, &Hp, &mut BossPhases), Without<PendingDespawn>>,
    hooks: Res<FeedbackHooks>,
) {
    for (boss, hp, mut phases) in &mut q {
        let ratio = hp.ratio();
        if !phases.phase2_entered && ratio <= 0.6 {
            phases.phase2_entered = true;
            phases.speed_mult *= 1.25;
            hooks.sound(SoundKind::Boss);
            hooks.haptic(HapticKind::Medium);
            hooks.notify(&format!("{} ENRAGED", boss.name), NotifyTone::Boss);
        }
        if !phases.phase3_entered && ratio <= 0.3 {
            phases.phase3_entered = true;
            phases.speed_mult *= 1.25;
            hooks.sound(SoundKind::Boss);
            hooks.haptic(HapticKind::Heavy);
            hooks.notify(&format!("{} FRENZIED", boss.name), NotifyTone::Boss);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn update_bosses(
    mut commands: Commands,
    dt: Res<FrameDt>,
    field: Res<Playfield>,
    stats: Res<RunStats>,
    registry: Res<BossRegistry>,
    mut rng: ResMut<SimRng>,
    q_player: Query<&Transform, (With<Player>, Without<Boss>)>,
    q_regulars: Query<(), (With<Enemy>, Without<Boss>, Without<MiniBoss>)>,
    q_hazards: Query<(), With<HazardShot>>,
    mut q_boss: Query<
        (&Boss, &mut BossBrain, &BossPhases, &mut Transform, &Extents, &MoveSpeed),
        Without<PendingDespawn>,
    >,
    mut hits: MessageWriter<PlayerHit>,
) {
    let Ok(player_tf) = q_player.single() else {
        return;
    };
    let player = player_tf.translation.truncate();
    let minion_count = q_regulars.iter().count();
    let mut live_hazards = q_hazards.iter().count();

    for (boss, mut brain, phases, mut tf, extents, speed) in &mut q_boss {
        let Some(spec) = registry.get(boss.id) else {
            debug!("boss {:?} missing from registry, skipping update", boss.id);
            continue;
        };

        let mut pos = tf.translation.truncate();
        let mut shots = Vec::new();
        let mut minions = Vec::new();
        let mut player_hits = Vec::new();

        let mut ctx = BossCtx {
            brain: &mut brain,
            phases: *phases,
            pos: &mut pos,
            extents: *extents,
            speed: speed.0 * phases.speed_mult,
            level: stats.level,
            dt_ms: dt.ms,
            steps: dt.steps(),
            player,
            field: &field,
            rng: &mut rng.0,
            minion_count,
            shots: &mut shots,
            minions: &mut minions,
            player_hits: &mut player_hits,
        };
        (spec.update)(&mut ctx);

        tf.translation.x = pos.x;
        tf.translation.y = pos.y;

        for shot in shots {
            spawn_boss_shot(&mut commands, &mut live_hazards, shot.pos, shot.vel, shot.color, shot.size);
        }
        for minion in minions {
            insert_enemy(&mut commands, minion);
        }
        for at in player_hits {
            hits.write(PlayerHit { at });
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn update_minibosses(
    mut commands: Commands,
    dt: Res<FrameDt>,
    field: Res<Playfield>,
    stats: Res<RunStats>,
    registry: Res<MiniBossRegistry>,
    mut rng: ResMut<SimRng>,
    q_player: Query<&Transform, (With<Player>, Without<MiniBoss>)>,
    q_hazards: Query<(), With<HazardShot>>,
    mut q_mini: Query<
        (&MiniBoss, &mut MiniBossBrain, &mut Transform, &Extents, &MoveSpeed, &mut Sprite),
        Without<PendingDespawn>,
    >,
) {
    let Ok(player_tf) = q_player.single() else {
        return;
    };
    let player = player_tf.translation.truncate();
    let mut live_hazards = q_hazards.iter().count();

    for (mini, mut brain, mut tf, extents, speed, mut sprite) in &mut q_mini {
        let Some(spec) = registry.get(mini.id) else {
            debug!("mini-boss {:?} missing from registry, skipping update", mini.id);
            continue;
        };

        let mut pos = tf.translation.truncate();
        let mut shots = Vec::new();
        let mut alpha = sprite.color.to_srgba().alpha;

        let mut ctx = miniboss::MiniBossCtx {
            brain: &mut brain,
            pos: &mut pos,
            extents: *extents,
            speed: speed.0,
            level: stats.level,
            dt_ms: dt.ms,
            steps: dt.steps(),
            player,
            field: &field,
            rng: &mut rng.0,
            shots: &mut shots,
            alpha: &mut alpha,
        };
        (spec.update)(&mut ctx);

        tf.translation.x = pos.x;
        tf.translation.y = pos.y;
        let mut c = sprite.color.to_srgba();
        c.alpha = alpha;
        sprite.color = c.into();

        for shot in shots {
            spawn_boss_shot(&mut commands, &mut live_hazards, shot.pos, shot.vel, shot.color, shot.size);
        }
    }
}

fn reset_boss_state(mut boss_active: ResMut<BossActive>) {
    boss_active.0 = None;
}

pub fn plugin(app: &mut App) {
    app.insert_resource(BossActive::default())
        .insert_resource(BossRegistry::default())
        .insert_resource(MiniBossRegistry::default());

    app.add_systems(
        Update,
        tick_spawn_invincible.in_set(TickSet::Timers).run_if(sim_active),
    );
    app.add_systems(
        Update,
        (boss_phase_transitions, update_bosses, update_minibosses)
            .chain()
            .in_set(TickSet::Enemies)
            .run_if(sim_active),
    );
    app.add_systems(
        Update,
        (launch_boss, maybe_spawn_miniboss)
            .chain()
            .in_set(TickSet::Spawn)
            .run_if(sim_active),
    );

    app.add_systems(OnEnter(GameState::InGame), reset_boss_state);
}
