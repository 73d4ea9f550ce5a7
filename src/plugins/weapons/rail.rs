//! Rail beam: the one weapon that fires no bullets.
//!
//! Activation starts a fixed-duration beam on a long cooldown. While the
//! beam is live, a periodic burn tick damages every regular enemy whose x
//! sits within the beam's half-width of the player's x — once per tick,
//! and never bosses or mini-bosses.

use bevy::prelude::*;

use crate::plugins::combat::components::{Hp, PendingDespawn};
use crate::plugins::core::FrameDt;
use crate::plugins::enemies::components::{Enemy, EnemyKind};
use crate::plugins::feedback::{FeedbackHooks, SoundKind};
use crate::plugins::player::Player;
use crate::plugins::progression::BonusBundle;

pub const RAIL_COOLDOWN_MS: f32 = 9000.0;
pub const RAIL_DURATION_MS: f32 = 2200.0;
pub const RAIL_BURN_INTERVAL_MS: f32 = 150.0;
pub const RAIL_BASE_HALF_WIDTH: f32 = 30.0;
const RAIL_BURN_DAMAGE: f32 = 2.0;

#[derive(Resource, Debug, Clone, Copy)]
pub struct RailBeam {
    pub active_ms: f32,
    pub duration_ms: f32,
    pub burn_timer_ms: f32,
    pub cooldown_ms: f32,
    pub half_width: f32,
    pub burn_damage: f32,
}

impl Default for RailBeam {
    fn default() -> Self {
        Self {
            active_ms: 0.0,
            duration_ms: RAIL_DURATION_MS,
            burn_timer_ms: 0.0,
            cooldown_ms: 0.0,
            half_width: RAIL_BASE_HALF_WIDTH,
            burn_damage: RAIL_BURN_DAMAGE,
        }
    }
}

impl RailBeam {
    #[inline]
    pub fn firing(&self) -> bool {
        self.active_ms > 0.0
    }

    /// Remaining fraction of the beam, for the HUD.
    #[inline]
    pub fn ratio(&self) -> f32 {
        if self.duration_ms <= 0.0 { 0.0 } else { (self.active_ms / self.duration_ms).clamp(0.0, 1.0) }
    }

    /// Start the beam if its own cooldown allows. Width and damage are
    /// resolved at activation time from the bundle.
    pub fn try_activate(&mut self, bundle: &BonusBundle) {
        if self.cooldown_ms > 0.0 || self.firing() {
            return;
        }
        self.duration_ms = RAIL_DURATION_MS + bundle.laser_beam_level as f32 * 400.0;
        self.active_ms = self.duration_ms;
        self.burn_timer_ms = 0.0;
        self.cooldown_ms = RAIL_COOLDOWN_MS;
        self.half_width = RAIL_BASE_HALF_WIDTH * bundle.laser_width_mult;
        self.burn_damage = RAIL_BURN_DAMAGE * bundle.damage_mult;
    }
}

pub fn tick_rail(dt: Res<FrameDt>, mut rail: ResMut<RailBeam>) {
    rail.cooldown_ms = (rail.cooldown_ms - dt.ms).max(0.0);
    if rail.firing() {
        rail.active_ms = (rail.active_ms - dt.ms).max(0.0);
        rail.burn_timer_ms = (rail.burn_timer_ms - dt.ms).max(0.0);
    }
}

pub fn rail_burn(
    mut rail: ResMut<RailBeam>,
    q_player: Query<&Transform, With<Player>>,
    mut q_enemies: Query<
        (&Transform, &EnemyKind, &mut Hp),
        (With<Enemy>, Without<PendingDespawn>, Without<Player>),
    >,
    hooks: Res<FeedbackHooks>,
) {
    if !rail.firing() || rail.burn_timer_ms > 0.0 {
        return;
    }
    let Ok(player_tf) = q_player.single() else {
        return;
    };
    rail.burn_timer_ms = RAIL_BURN_INTERVAL_MS;

    let beam_x = player_tf.translation.x;
    let mut any_hit = false;
    for (tf, kind, mut hp) in &mut q_enemies {
        if kind.is_boss_like() {
            continue;
        }
        if (tf.translation.x - beam_x).abs() <= rail.half_width {
            hp.damage(rail.burn_damage);
            any_hit = true;
        }
    }
    if any_hit {
        hooks.sound(SoundKind::Hit);
    }
}
