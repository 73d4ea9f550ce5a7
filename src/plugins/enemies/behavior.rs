//! Per-kind enemy behavior, evaluated every tick unless time is frozen.
//!
//! One match per enemy. Each arm owns its variant's fields and nothing
//! else; adding a kind is one config entry plus one arm here. Armada units
//! and boss-likes are driven by their own systems and skipped.

use bevy::prelude::*;
use rand::Rng;

use crate::common::tunables::Playfield;
use crate::plugins::combat::components::{Extents, Hp, PendingDespawn};
use crate::plugins::core::{FrameDt, RunStats, SimRng};
use crate::plugins::effects::{HazardShot, spawn_boss_shot};
use crate::plugins::player::Player;
use crate::plugins::progression::ActiveEffects;

use super::components::{Enemy, EnemyBrain, EnemyKind, MoveSpeed};

pub fn update_enemies(
    mut commands: Commands,
    dt: Res<FrameDt>,
    field: Res<Playfield>,
    effects: Res<ActiveEffects>,
    stats: Res<RunStats>,
    mut rng: ResMut<SimRng>,
    q_player: Query<&Transform, (With<Player>, Without<Enemy>)>,
    q_hazards: Query<(), With<HazardShot>>,
    mut q: Query<
        (
            &EnemyKind,
            &mut EnemyBrain,
            &mut Transform,
            &mut Hp,
            &MoveSpeed,
            &Extents,
            &mut Sprite,
        ),
        (With<Enemy>, Without<PendingDespawn>, Without<Player>),
    >,
) {
    if effects.time_frozen() {
        return;
    }
    let steps = dt.steps();
    let level = stats.level;
    let player_pos = q_player
        .single()
        .map(|tf| tf.translation.truncate())
        .unwrap_or(Vec2::new(field.width * 0.5, field.height - 110.0));
    let mut live_hazards = q_hazards.iter().count();

    for (kind, mut brain, mut tf, mut hp, speed, extents, mut sprite) in &mut q {
        if matches!(*kind, EnemyKind::Boss | EnemyKind::MiniBoss | EnemyKind::Armada) {
            continue;
        }

        // Baseline descent; several arms add to or replace it.
        tf.translation.y += speed.0 * steps;

        match &mut *brain {
            EnemyBrain::Plain | EnemyBrain::Fast | EnemyBrain::Tank | EnemyBrain::Titan
            | EnemyBrain::Splitter => {}

            EnemyBrain::Zigzag { phase } => {
                *phase += 0.09 * steps;
                tf.translation.x += phase.sin() * 3.5 * steps;
            }

            EnemyBrain::Swarm { phase } => {
                *phase += dt.ms * 0.001;
                tf.translation.x += phase.sin() * 2.5 * steps;
            }

            EnemyBrain::Shooter { shoot_ms } => {
                *shoot_ms -= dt.ms;
                if *shoot_ms <= 0.0 {
                    *shoot_ms = (1400.0 - level as f32 * 50.0).max(500.0);
                    let origin = tf.translation.truncate() + Vec2::new(0.0, extents.hh);
                    let dir = (player_pos - origin).normalize_or_zero();
                    spawn_boss_shot(
                        &mut commands,
                        &mut live_hazards,
                        origin,
                        dir * 2.5,
                        Color::srgb(1.0, 0.53, 0.0),
                        7.0,
                    );
                }
            }

            EnemyBrain::Bomber { drop_ms } => {
                *drop_ms -= dt.ms;
                if *drop_ms <= 0.0 {
                    *drop_ms = 2600.0;
                    spawn_boss_shot(
                        &mut commands,
                        &mut live_hazards,
                        tf.translation.truncate() + Vec2::new(0.0, extents.hh),
                        Vec2::new(0.0, 1.6),
                        Color::srgb(1.0, 0.42, 0.0),
                        10.0,
                    );
                }
            }

            EnemyBrain::Dasher { pause_ms, dash_ms } => {
                if *dash_ms > 0.0 {
                    *dash_ms -= dt.ms;
                    tf.translation.y += speed.0 * 5.0 * steps;
                } else {
                    // Hold position (cancel the baseline descent) while
                    // winding up the next dash.
                    tf.translation.y -= speed.0 * steps;
                    *pause_ms -= dt.ms;
                    if *pause_ms <= 0.0 {
                        *pause_ms = 600.0;
                        *dash_ms = 250.0;
                    }
                }
            }

            EnemyBrain::Stealth { cycle_ms, alpha } => {
                *cycle_ms += dt.ms;
                let phase = (*cycle_ms % 3000.0) / 3000.0;
                *alpha = if phase < 0.5 {
                    1.0
                } else {
                    0.08 + 0.12 * (phase * std::f32::consts::PI * 6.0).sin()
                };
                let mut c = sprite.color.to_srgba();
                c.alpha = *alpha;
                sprite.color = c.into();
            }

            EnemyBrain::Shielder { .. } => {}

            EnemyBrain::Teleporter { blink_ms } => {
                *blink_ms -= dt.ms;
                if *blink_ms <= 0.0 {
                    *blink_ms = 1800.0;
                    tf.translation.x = rng.0.gen_range(extents.hw..field.width - extents.hw);
                }
            }

            EnemyBrain::Leech { regen_ms } => {
                *regen_ms -= dt.ms;
                if *regen_ms <= 0.0 {
                    *regen_ms = 1000.0;
                    hp.heal(1);
                }
            }

            EnemyBrain::Mirror { last_player_x } => {
                let dx = player_pos.x - *last_player_x;
                *last_player_x = player_pos.x;
                tf.translation.x -= dx;
            }

            EnemyBrain::Kamikaze => {
                let dir = (player_pos - tf.translation.truncate()).normalize_or_zero();
                tf.translation.x += dir.x * speed.0 * 1.2 * steps;
                tf.translation.y += (dir.y * speed.0 * 1.2 - speed.0) * steps;
            }

            EnemyBrain::Phantom { cycle_ms, intangible } => {
                *cycle_ms += dt.ms;
                let phase = (*cycle_ms % 2400.0) / 2400.0;
                *intangible = phase >= 0.5;
                let mut c = sprite.color.to_srgba();
                c.alpha = if *intangible { 0.15 } else { 1.0 };
                sprite.color = c.into();
            }

            EnemyBrain::Assassin { dash_ms } => {
                if *dash_ms > 0.0 {
                    *dash_ms -= dt.ms;
                    tf.translation.y += speed.0 * 4.0 * steps;
                } else if tf.translation.y >= 140.0 {
                    // Hover, strafe into line with the player, then commit.
                    tf.translation.y -= speed.0 * steps;
                    let dx = player_pos.x - tf.translation.x;
                    tf.translation.x += dx.signum() * (3.0 * steps).min(dx.abs());
                    if dx.abs() < 10.0 {
                        *dash_ms = 500.0;
                    }
                }
            }

            EnemyBrain::Armada | EnemyBrain::MiniBoss | EnemyBrain::Boss => {}
        }

        tf.translation.x = tf.translation.x.clamp(extents.hw, field.width - extents.hw);
    }
}
