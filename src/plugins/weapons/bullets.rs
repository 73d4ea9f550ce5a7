//! Per-bullet update: ballistic motion, the registry's kind-specific hook,
//! and bounds retirement.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;

use crate::common::tunables::Playfield;
use crate::plugins::combat::components::{PendingDespawn, Velocity};
use crate::plugins::core::FrameDt;
use crate::plugins::enemies::components::Enemy;

use super::components::{Bullet, BulletPayload, BulletState, PooledBullet};
use super::messages::Detonation;
use super::registry::{BulletUpdateCtx, WeaponRegistry};

pub const ROCKET_SPLASH_RADIUS: f32 = 80.0;
pub const PLASMA_SPLASH_RADIUS: f32 = 60.0;

pub fn update_bullets(
    dt: Res<FrameDt>,
    field: Res<Playfield>,
    registry: Res<WeaponRegistry>,
    mut q_bullets: Query<
        (&mut Bullet, &mut BulletState, &mut Transform, &mut Velocity),
        With<PooledBullet>,
    >,
    q_enemies: Query<&Transform, (With<Enemy>, Without<PendingDespawn>, Without<PooledBullet>)>,
    mut detonation_writer: MessageWriter<Detonation>,
) {
    let steps = dt.steps();
    let mut blasts = Vec::new();

    for (mut bullet, mut state, mut tf, mut vel) in &mut q_bullets {
        if *state != BulletState::Active {
            continue;
        }
        let pos = tf.translation.truncate();

        // Kind-specific behavior, dispatched through the registry so a new
        // weapon never has to touch this loop.
        let mut keep = true;
        if let Some(update) = registry.get(bullet.kind).and_then(|spec| spec.update) {
            let nearest_enemy = q_enemies
                .iter()
                .map(|etf| etf.translation.truncate())
                .min_by(|a, b| a.distance_squared(pos).total_cmp(&b.distance_squared(pos)));
            let mut ctx = BulletUpdateCtx {
                bullet: &mut bullet,
                pos,
                vel: &mut vel.0,
                dt_ms: dt.ms,
                steps,
                nearest_enemy,
                detonations: &mut blasts,
            };
            keep = update(&mut ctx);
        }
        if !keep {
            *state = BulletState::PendingReturn;
            continue;
        }

        tf.translation.x += vel.0.x * steps;
        tf.translation.y += vel.0.y * steps;

        let (x, y) = (tf.translation.x, tf.translation.y);
        let out_of_bounds =
            y < -50.0 || x < -30.0 || x > field.width + 30.0 || y > field.height + 30.0;
        if out_of_bounds {
            // Area bullets owe the field their blast even at the edge, but
            // only if it has not already fired.
            if let BulletPayload::Plasma { detonated, .. } = &mut bullet.payload {
                if !*detonated {
                    *detonated = true;
                    blasts.push(Detonation {
                        pos: tf.translation.truncate(),
                        radius: PLASMA_SPLASH_RADIUS,
                        damage: bullet.damage * 0.6,
                        split: 0,
                        color: Color::srgb(0.66, 0.33, 0.97),
                    });
                }
            }
            *state = BulletState::PendingReturn;
        }
    }

    for blast in blasts {
        detonation_writer.write(blast);
    }
}
