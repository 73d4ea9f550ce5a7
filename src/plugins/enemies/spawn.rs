//! Enemy spawning: the weighted, level-gated roll and the shared insert
//! helper every spawn source (regular roll, swarm cluster, splitter
//! fragments, octopus minions, armada grid) goes through.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use rand::Rng;
use rand::rngs::StdRng;

use crate::common::state::GameState;
use crate::common::tunables::{Difficulty, DifficultyConfig, Playfield};
use crate::plugins::bosses::BossActive;
use crate::plugins::combat::components::{Extents, Hp};
use crate::plugins::core::{FrameDt, RunStats, SimRng};

use super::armada::ArmadaState;
use super::components::{
    Enemy, EnemyBrain, EnemyKind, MoveSpeed, SPAWNABLE_KINDS, initial_brain, kind_config,
};

#[derive(Debug, Clone)]
pub struct EnemySeed {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub extents: Extents,
    pub speed: f32,
    pub hp: i32,
    pub brain: EnemyBrain,
}

pub fn insert_enemy(commands: &mut Commands, seed: EnemySeed) -> Entity {
    let color = kind_color(seed.kind);
    commands
        .spawn((
            Name::new(format!("Enemy({:?})", seed.kind)),
            Enemy,
            seed.kind,
            seed.brain,
            seed.extents,
            MoveSpeed(seed.speed),
            Hp::full(seed.hp),
            Sprite {
                color,
                custom_size: Some(Vec2::new(seed.extents.hw * 2.0, seed.extents.hh * 2.0)),
                ..default()
            },
            Transform::from_xyz(seed.pos.x, seed.pos.y, 3.0),
            DespawnOnExit(GameState::InGame),
        ))
        .id()
}

fn kind_color(kind: EnemyKind) -> Color {
    match kind {
        EnemyKind::Fast => Color::srgb(0.0, 0.83, 1.0),
        EnemyKind::Zigzag => Color::srgb(1.0, 0.67, 0.0),
        EnemyKind::Tank | EnemyKind::Titan => Color::srgb(0.66, 0.33, 0.97),
        EnemyKind::Swarm => Color::srgb(0.27, 1.0, 0.53),
        EnemyKind::Shooter | EnemyKind::Bomber => Color::srgb(1.0, 0.53, 0.0),
        EnemyKind::Splitter => Color::srgb(1.0, 0.27, 0.4),
        EnemyKind::Stealth | EnemyKind::Phantom => Color::srgb(0.67, 0.67, 1.0),
        EnemyKind::Shielder => Color::srgb(0.33, 0.78, 0.99),
        EnemyKind::Armada => Color::srgb(0.92, 0.45, 0.85),
        _ => Color::srgb(1.0, 0.13, 0.5),
    }
}

/// Weighted pick among the kinds unlocked at this mission level.
pub fn roll_kind(rng: &mut StdRng, level: u32) -> EnemyKind {
    let pool: Vec<EnemyKind> = SPAWNABLE_KINDS
        .into_iter()
        .filter(|k| kind_config(*k).min_level <= level)
        .collect();
    let total: u32 = pool.iter().map(|k| kind_config(*k).weight).sum();
    let mut r = rng.gen_range(0..total.max(1));
    for kind in &pool {
        let w = kind_config(*kind).weight;
        if r < w {
            return *kind;
        }
        r -= w;
    }
    EnemyKind::Plain
}

/// Hit points scale with mission level in coarse steps.
pub fn scaled_hp(hp_factor: f32, level: u32) -> i32 {
    (hp_factor * (1.0 + (level / 4) as f32)).ceil() as i32
}

pub fn build_regular_seed(
    rng: &mut StdRng,
    field: &Playfield,
    cfg: &DifficultyConfig,
    level: u32,
    kind: EnemyKind,
    player_x: f32,
) -> EnemySeed {
    let kc = kind_config(kind);
    let hw = kc.hw + rng.gen_range(0.0..4.0);
    let hh = kc.hh + rng.gen_range(0.0..4.0);
    let speed =
        (kc.speed_factor + level as f32 * 0.08 + rng.gen_range(0.0..0.5)) * cfg.enemy_speed;
    EnemySeed {
        kind,
        pos: Vec2::new(rng.gen_range(hw..field.width - hw), -hh * 2.0),
        extents: Extents::new(hw, hh),
        speed,
        hp: scaled_hp(kc.hp_factor, level),
        brain: initial_brain(kind, player_x),
    }
}

/// Two small, fast fragments from a dying splitter. Fragments are `Fast`
/// kind, so they can never split again.
pub fn spawn_splitter_fragments(
    commands: &mut Commands,
    at: Vec2,
    parent: Extents,
    parent_speed: f32,
) {
    for side in [-1.0f32, 1.0] {
        insert_enemy(
            commands,
            EnemySeed {
                kind: EnemyKind::Fast,
                pos: Vec2::new(at.x + side * 18.0, at.y),
                extents: Extents::new(parent.hw * 0.55, parent.hh * 0.55),
                speed: parent_speed * 1.3,
                hp: 1,
                brain: EnemyBrain::Fast,
            },
        );
    }
}

/// Per-frame spawn roll. Suspended while a boss or an armada owns the field.
pub fn maybe_spawn_regular(
    mut commands: Commands,
    dt: Res<FrameDt>,
    field: Res<Playfield>,
    difficulty: Res<Difficulty>,
    stats: Res<RunStats>,
    boss: Res<BossActive>,
    armada: Res<ArmadaState>,
    mut rng: ResMut<SimRng>,
    q_player: Query<&Transform, With<crate::plugins::player::Player>>,
) {
    if boss.0.is_some() || armada.active {
        return;
    }
    let cfg = difficulty.config();
    let chance = (cfg.spawn_rate + stats.level as f32 * 0.0015) * dt.steps();
    if rng.0.gen_range(0.0..1.0) >= chance {
        return;
    }

    let player_x = q_player
        .single()
        .map(|tf| tf.translation.x)
        .unwrap_or(field.width * 0.5);
    let kind = roll_kind(&mut rng.0, stats.level);
    let seed = build_regular_seed(&mut rng.0, &field, &cfg, stats.level, kind, player_x);

    if kind == EnemyKind::Swarm {
        let count = 3 + rng.0.gen_range(0..3);
        for i in 0..count {
            let side = if rng.0.gen_bool(0.5) { 1.0 } else { -1.0 };
            let mut s = seed.clone();
            s.pos.x = (seed.pos.x + i as f32 * side * 22.0).clamp(s.extents.hw, field.width - s.extents.hw);
            s.brain = EnemyBrain::Swarm { phase: rng.0.gen_range(0.0..std::f32::consts::TAU) };
            insert_enemy(&mut commands, s);
        }
    } else {
        insert_enemy(&mut commands, seed);
    }
}

/// Enemies that drift past the bottom edge vanish without damage, reward or
/// drop. A boss wandering off (should not happen) still clears boss mode so
/// the field cannot wedge.
pub fn cull_offfield(
    mut commands: Commands,
    field: Res<Playfield>,
    mut boss: ResMut<BossActive>,
    q: Query<(Entity, &Transform, &EnemyKind), With<Enemy>>,
) {
    for (e, tf, kind) in &q {
        if tf.translation.y > field.bottom_cull() {
            if *kind == EnemyKind::Boss {
                warn!("boss drifted off-field, clearing boss mode");
                boss.0 = None;
            }
            commands.entity(e).despawn();
        }
    }
}

