//! Fire producer.
//!
//! One equipped weapon, one global shot cooldown. This system never touches
//! the pool: it resolves the registry entry, rolls the crit, and enqueues
//! `SpawnBulletRequest` intent for the allocator.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use rand::Rng;

use crate::plugins::core::{FrameDt, SimRng};
use crate::plugins::feedback::{FeedbackHooks, NotifyTone, SoundKind};
use crate::plugins::player::{Player, PlayerInput};
use crate::plugins::progression::{ActiveEffects, BonusBundle};

use super::components::WeaponId;
use super::messages::SpawnBulletRequest;
use super::rail::RailBeam;
use super::registry::{FireCtx, WeaponRegistry};

/// The equipped weapon slot. The loadout UI writes this between runs.
#[derive(Resource, Debug, Clone, Copy)]
pub struct CurrentWeapon(pub WeaponId);

impl Default for CurrentWeapon {
    fn default() -> Self {
        Self(WeaponId::Laser)
    }
}

/// Global "last shot" gate, ms until the next shot is allowed.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct WeaponCooldown {
    pub ms: f32,
}

#[allow(clippy::too_many_arguments)]
pub fn fire_weapon(
    dt: Res<FrameDt>,
    input: Res<PlayerInput>,
    current: Res<CurrentWeapon>,
    registry: Res<WeaponRegistry>,
    bundle: Res<BonusBundle>,
    effects: Res<ActiveEffects>,
    mut cooldown: ResMut<WeaponCooldown>,
    mut rng: ResMut<SimRng>,
    mut rail: ResMut<RailBeam>,
    q_player: Query<&Transform, With<Player>>,
    mut writer: MessageWriter<SpawnBulletRequest>,
    hooks: Res<FeedbackHooks>,
) {
    cooldown.ms = (cooldown.ms - dt.ms).max(0.0);

    if !(input.auto_fire || input.firing) {
        return;
    }
    if cooldown.ms > 0.0 {
        return;
    }
    let Ok(player_tf) = q_player.single() else {
        return;
    };

    let Some(spec) = registry.get(current.0) else {
        debug!("no weapon registered for {:?}, skipping fire", current.0);
        return;
    };

    let speed_factor = if effects.speed_up() { 0.6 } else { 1.0 };
    cooldown.ms = spec.base_cooldown_ms * bundle.firerate_mult * speed_factor;

    let crit = bundle.crit_chance > 0.0 && rng.0.gen_range(0.0..1.0) < bundle.crit_chance;
    let rail_was_firing = rail.firing();

    let mut seeds = Vec::new();
    let mut ctx = FireCtx {
        origin: player_tf.translation.truncate(),
        bundle: &bundle,
        effects: &effects,
        crit,
        seeds: &mut seeds,
        rail: &mut rail,
    };
    (spec.fire)(&mut ctx);

    let rail_started = rail.firing() && !rail_was_firing;
    if seeds.is_empty() && !rail_started {
        return;
    }

    if crit {
        hooks.notify("CRIT!", NotifyTone::Gold);
    }
    hooks.sound(SoundKind::Shoot);
    for seed in seeds {
        writer.write(SpawnBulletRequest { seed });
    }
}
