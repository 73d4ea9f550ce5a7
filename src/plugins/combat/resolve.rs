//! Collision resolution.
//!
//! Order per bullet-enemy pair: entrance grace and phasing gate first, then
//! the energy shield, then the weapon effect (splash / pierce / simple).
//! Damage only ever lowers hp; deciding what a zero means is the kill
//! system's job. The player-facing passes at the bottom produce `PlayerHit`
//! intent and never touch lives themselves.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use crate::plugins::bosses::SpawnInvincible;
use crate::plugins::core::SimRng;
use crate::plugins::effects::{HazardShot, QualitySettings, VisualEffect, spawn_explosion};
use crate::plugins::enemies::components::{Enemy, EnemyBrain, EnemyKind};
use crate::plugins::feedback::{FeedbackHooks, HapticKind, SoundKind};
use crate::plugins::player::{Player, PlayerHit};
use crate::plugins::weapons::bullets::{PLASMA_SPLASH_RADIUS, ROCKET_SPLASH_RADIUS};
use crate::plugins::weapons::{
    Bullet, BulletPayload, BulletSeed, BulletState, Detonation, PooledBullet, SpawnBulletRequest,
    WeaponId,
};

use super::components::{Extents, Hp, PendingDespawn};
use super::grid::SpatialGrid;

/// Fattened hitbox margin for the area weapons, matching their proximity
/// fuses.
const AOE_HIT_MARGIN: f32 = 12.0;

pub fn collide_bullets(
    grid: Res<SpatialGrid>,
    mut q_bullets: Query<
        (&mut Bullet, &mut BulletState, &Transform, &Extents),
        With<PooledBullet>,
    >,
    mut q_enemies: Query<
        (&mut EnemyBrain, &mut Hp, &Transform, &Extents, Option<&SpawnInvincible>),
        (With<Enemy>, Without<PendingDespawn>, Without<PooledBullet>),
    >,
    mut detonations: MessageWriter<Detonation>,
    hooks: Res<FeedbackHooks>,
    mut tested: Local<HashSet<Entity>>,
) {
    for (mut bullet, mut state, tf, extents) in &mut q_bullets {
        if *state != BulletState::Active {
            continue;
        }
        let pos = tf.translation.truncate();
        let aoe = matches!(bullet.kind, WeaponId::Rocket | WeaponId::Plasma);
        let margin = if aoe { AOE_HIT_MARGIN } else { 0.0 };

        tested.clear();
        let (lo, hi) = grid.row_span(pos.y - extents.hh, pos.y + extents.hh);
        'rows: for row in lo..=hi {
            for &enemy in grid.row(row) {
                if !tested.insert(enemy) {
                    continue;
                }
                let Ok((mut brain, mut hp, etf, eext, grace)) = q_enemies.get_mut(enemy) else {
                    continue;
                };
                if grace.is_some() || brain.is_intangible() {
                    continue;
                }
                if let Some(pierce) = &bullet.pierce {
                    if pierce.hit.contains(&enemy) {
                        continue;
                    }
                }

                let epos = etf.translation.truncate();
                let hit = (pos.x - epos.x).abs() < eext.hw + extents.hw + margin
                    && (pos.y - epos.y).abs() < eext.hh + extents.hh + margin;
                if !hit {
                    continue;
                }

                // 1. Energy shield absorbs the hit before any hp damage.
                if let Some(charges) = brain.shield_charges_mut() {
                    if *charges > 0 {
                        *charges -= 1;
                        hooks.sound(SoundKind::Hit);
                        if let Some(pierce) = &mut bullet.pierce {
                            pierce.hit.insert(enemy);
                        } else if !aoe {
                            *state = BulletState::PendingReturn;
                            break 'rows;
                        }
                        continue;
                    }
                }

                // 2. Weapon effect.
                match bullet.kind {
                    WeaponId::Rocket => {
                        let split = match bullet.payload {
                            BulletPayload::Rocket { split } => split,
                            _ => 0,
                        };
                        detonations.write(Detonation {
                            pos,
                            radius: ROCKET_SPLASH_RADIUS,
                            damage: bullet.damage * 1.5,
                            split,
                            color: Color::srgb(1.0, 0.42, 0.0),
                        });
                        *state = BulletState::PendingReturn;
                        break 'rows;
                    }
                    WeaponId::Plasma => {
                        if let BulletPayload::Plasma { detonated, .. } = &mut bullet.payload {
                            if !*detonated {
                                *detonated = true;
                                detonations.write(Detonation {
                                    pos,
                                    radius: PLASMA_SPLASH_RADIUS,
                                    damage: bullet.damage * 0.6,
                                    split: 0,
                                    color: Color::srgb(0.66, 0.33, 0.97),
                                });
                            }
                        }
                        *state = BulletState::PendingReturn;
                        break 'rows;
                    }
                    _ => {
                        if let Some(pierce) = &mut bullet.pierce {
                            pierce.hit.insert(enemy);
                            hp.damage(bullet.damage);
                            hooks.sound(SoundKind::Hit);
                            if pierce.exhausted() {
                                *state = BulletState::PendingReturn;
                                break 'rows;
                            }
                        } else {
                            hp.damage(bullet.damage);
                            hooks.sound(SoundKind::Hit);
                            *state = BulletState::PendingReturn;
                            break 'rows;
                        }
                    }
                }
            }
        }
    }
}

/// Apply queued blasts: radius damage with linear falloff, the explosion
/// visual, and rocket-split respawns.
#[allow(clippy::too_many_arguments)]
pub fn apply_detonations(
    mut commands: Commands,
    mut reader: MessageReader<Detonation>,
    mut q_enemies: Query<
        (&mut Hp, &Transform, Option<&SpawnInvincible>),
        (With<Enemy>, Without<PendingDespawn>),
    >,
    q_visuals: Query<(), With<VisualEffect>>,
    quality: Res<QualitySettings>,
    mut rng: ResMut<SimRng>,
    mut bullet_writer: MessageWriter<SpawnBulletRequest>,
    hooks: Res<FeedbackHooks>,
) {
    let mut live_visuals = q_visuals.iter().count();

    for blast in reader.read() {
        for (mut hp, tf, grace) in &mut q_enemies {
            if grace.is_some() {
                continue;
            }
            let dist = tf.translation.truncate().distance(blast.pos);
            if dist < blast.radius {
                hp.damage(blast.damage * (1.0 - dist / blast.radius));
            }
        }

        spawn_explosion(
            &mut commands,
            &mut rng.0,
            &mut live_visuals,
            quality.particle_budget,
            blast.pos,
            blast.color,
            35,
        );
        hooks.sound(SoundKind::Explode);
        hooks.haptic(HapticKind::Light);

        if blast.split > 0 {
            for side in [-0.5f32, 0.5] {
                let vel = Vec2::from_angle(side).rotate(Vec2::new(0.0, -4.9));
                bullet_writer.write(SpawnBulletRequest {
                    seed: BulletSeed {
                        kind: WeaponId::Rocket,
                        pos: blast.pos,
                        vel,
                        half: Vec2::new(4.0, 7.0),
                        damage: blast.damage * 0.4,
                        pierce: false,
                        max_pierce: None,
                        payload: BulletPayload::Rocket { split: blast.split - 1 },
                    },
                });
            }
        }
    }
}

/// Hazardous projectiles against the player: consume the shot, emit intent.
pub fn hazards_vs_player(
    mut commands: Commands,
    q_player: Query<(&Transform, &Extents), With<Player>>,
    q_hazards: Query<(Entity, &Transform), With<HazardShot>>,
    mut hits: MessageWriter<PlayerHit>,
) {
    let Ok((player_tf, player_ext)) = q_player.single() else {
        return;
    };
    let player_pos = player_tf.translation.truncate();

    for (e, tf) in &q_hazards {
        let shot = tf.translation.truncate();
        if player_ext.contains(player_pos, shot) {
            commands.entity(e).despawn();
            hits.write(PlayerHit { at: shot });
        }
    }
}

/// Physical enemy-vs-player overlap. The rammed enemy (non-boss) is
/// destroyed outright — destruction, not a kill: no rewards, no drops.
#[allow(clippy::too_many_arguments)]
pub fn enemies_contact_player(
    mut commands: Commands,
    q_player: Query<(&Transform, &Extents), With<Player>>,
    q_enemies: Query<
        (Entity, &EnemyKind, &Transform, &Extents),
        (With<Enemy>, Without<PendingDespawn>, Without<Player>),
    >,
    q_visuals: Query<(), With<VisualEffect>>,
    quality: Res<QualitySettings>,
    mut rng: ResMut<SimRng>,
    mut hits: MessageWriter<PlayerHit>,
) {
    let Ok((player_tf, player_ext)) = q_player.single() else {
        return;
    };
    let player_pos = player_tf.translation.truncate();
    let mut live_visuals = q_visuals.iter().count();

    for (e, kind, tf, ext) in &q_enemies {
        let epos = tf.translation.truncate();
        let overlap = (epos.x - player_pos.x).abs() < ext.hw + player_ext.hw * 0.9
            && (epos.y - player_pos.y).abs() < ext.hh + player_ext.hh * 0.9;
        if !overlap {
            continue;
        }
        if !kind.is_boss_like() {
            spawn_explosion(
                &mut commands,
                &mut rng.0,
                &mut live_visuals,
                quality.particle_budget,
                epos,
                Color::srgb(1.0, 0.13, 0.5),
                20,
            );
            commands.entity(e).despawn();
        }
        hits.write(PlayerHit { at: epos });
    }
}
