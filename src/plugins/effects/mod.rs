//! Cosmetic particles and hazardous projectiles.
//!
//! The two live in deliberately separate collections. `VisualEffect`
//! entities are pure presentation and never enter collision code.
//! `HazardShot` entities are the projectiles bosses, shooters and armada
//! units fire at the player; the combat plugin tests them against the player
//! every tick. Both are bounded: visuals by a quality budget that can only
//! shrink, hazards by a fixed cap, with excess simply dropped.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use rand::Rng;
use rand::rngs::StdRng;

use crate::common::state::{GameState, sim_active};
use crate::common::tunables::Playfield;
use crate::plugins::combat::components::Velocity;
use crate::plugins::core::{FrameDt, TickSet};

/// Hard cap on live hazardous projectiles.
pub const HAZARD_CAP: usize = 160;

/// Expanding ring payload for wave-style effects.
#[derive(Debug, Clone, Copy)]
pub struct Wave {
    pub r: f32,
    pub max_r: f32,
}

#[derive(Component, Debug, Clone)]
pub struct VisualEffect {
    pub life: f32,
    pub decay: f32,
    pub size: f32,
    pub color: Color,
    pub wave: Option<Wave>,
}

/// A projectile that hurts the player on contact. Point-sized for collision;
/// `size` is presentation only.
#[derive(Component, Debug, Clone)]
pub struct HazardShot {
    pub size: f32,
    pub color: Color,
}

/// Particle budget. Starts at the configured maximum and only ever shrinks
/// (auto-quality); a new run does not restore it.
#[derive(Resource, Debug, Clone, Copy)]
pub struct QualitySettings {
    pub particle_budget: usize,
}

impl Default for QualitySettings {
    fn default() -> Self {
        Self { particle_budget: 300 }
    }
}

/// Rolling frame-time window backing the auto-quality step.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct FrameRateMonitor {
    pub window_ms: f32,
    pub frames: u32,
}

const QUALITY_WINDOW_MS: f32 = 3000.0;
const SLOW_FRAME_MS: f32 = 25.0;
const MIN_PARTICLE_BUDGET: usize = 60;

/// Burst of debris plus one expanding ring, bounded by the remaining budget.
pub fn spawn_explosion(
    commands: &mut Commands,
    rng: &mut StdRng,
    live: &mut usize,
    budget: usize,
    pos: Vec2,
    color: Color,
    count: usize,
) {
    let room = budget.saturating_sub(*live);
    let debris = count.min(room);
    for _ in 0..debris {
        commands.spawn((
            VisualEffect {
                life: 1.0,
                decay: 0.014 + rng.gen_range(0.0..0.01),
                size: 2.0 + rng.gen_range(0.0..3.0),
                color,
                wave: None,
            },
            Velocity(Vec2::new(rng.gen_range(-5.5..5.5), rng.gen_range(-5.5..5.5))),
            Transform::from_xyz(pos.x, pos.y, 5.0),
            DespawnOnExit(GameState::InGame),
        ));
        *live += 1;
    }
    if *live < budget {
        commands.spawn((
            VisualEffect {
                life: 1.0,
                decay: 0.04,
                size: 0.0,
                color,
                wave: Some(Wave { r: 0.0, max_r: 60.0 + count as f32 }),
            },
            Velocity(Vec2::ZERO),
            Transform::from_xyz(pos.x, pos.y, 5.0),
            DespawnOnExit(GameState::InGame),
        ));
        *live += 1;
    }
}

/// Shared attack primitive for bosses, shooter enemies and armada salvos.
/// Dropped outright when the hazard cap is reached.
pub fn spawn_boss_shot(
    commands: &mut Commands,
    live: &mut usize,
    pos: Vec2,
    vel: Vec2,
    color: Color,
    size: f32,
) {
    if *live >= HAZARD_CAP {
        return;
    }
    commands.spawn((
        HazardShot { size, color },
        Velocity(vel),
        Transform::from_xyz(pos.x, pos.y, 4.0),
        DespawnOnExit(GameState::InGame),
    ));
    *live += 1;
}

fn update_visuals(
    mut commands: Commands,
    dt: Res<FrameDt>,
    mut q: Query<(Entity, &mut VisualEffect, &Velocity, &mut Transform)>,
) {
    let steps = dt.steps();
    for (e, mut fx, vel, mut tf) in &mut q {
        tf.translation.x += vel.0.x * steps;
        tf.translation.y += vel.0.y * steps;
        fx.life -= fx.decay * steps;
        if let Some(wave) = &mut fx.wave {
            wave.r = wave.max_r * (1.0 - fx.life);
        }
        if fx.life <= 0.0 {
            commands.entity(e).despawn();
        }
    }
}

fn update_hazards(
    mut commands: Commands,
    dt: Res<FrameDt>,
    field: Res<Playfield>,
    mut q: Query<(Entity, &Velocity, &mut Transform), With<HazardShot>>,
) {
    let steps = dt.steps();
    for (e, vel, mut tf) in &mut q {
        tf.translation.x += vel.0.x * steps;
        tf.translation.y += vel.0.y * steps;
        let (x, y) = (tf.translation.x, tf.translation.y);
        if x < -30.0 || x > field.width + 30.0 || y < -30.0 || y > field.height + 30.0 {
            commands.entity(e).despawn();
        }
    }
}

/// Permanently step the particle budget down when frames stay slow for a
/// whole sample window.
fn monitor_frame_rate(
    dt: Res<FrameDt>,
    mut monitor: ResMut<FrameRateMonitor>,
    mut quality: ResMut<QualitySettings>,
) {
    monitor.window_ms += dt.ms;
    monitor.frames += 1;
    if monitor.window_ms < QUALITY_WINDOW_MS {
        return;
    }
    let avg = monitor.window_ms / monitor.frames.max(1) as f32;
    if avg > SLOW_FRAME_MS && quality.particle_budget > MIN_PARTICLE_BUDGET {
        quality.particle_budget = (quality.particle_budget / 2).max(MIN_PARTICLE_BUDGET);
        warn!(
            "sustained slow frames ({avg:.1}ms avg), particle budget reduced to {}",
            quality.particle_budget
        );
    }
    *monitor = FrameRateMonitor::default();
}

pub fn plugin(app: &mut App) {
    app.insert_resource(QualitySettings::default())
        .insert_resource(FrameRateMonitor::default());

    app.add_systems(
        Update,
        (update_visuals, update_hazards, monitor_frame_rate)
            .in_set(TickSet::Effects)
            .run_if(sim_active),
    );
}

#[cfg(test)]
mod tests;
