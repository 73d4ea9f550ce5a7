//! Weapon dispatch table.
//!
//! One entry per weapon: a base cooldown and a fire function that turns the
//! current bonus bundle into bullet seeds (or, for the rail, into beam
//! state). Adding a weapon means adding one [`WeaponSpec`]; nothing else in
//! the fire path changes.

use bevy::prelude::*;

use crate::plugins::progression::{ActiveEffects, BonusBundle};

use super::components::{BulletPayload, WeaponId};
use super::messages::BulletSeed;
use super::rail::RailBeam;

pub struct FireCtx<'a> {
    /// Muzzle position (player center).
    pub origin: Vec2,
    pub bundle: &'a BonusBundle,
    pub effects: &'a ActiveEffects,
    pub crit: bool,
    pub seeds: &'a mut Vec<BulletSeed>,
    pub rail: &'a mut RailBeam,
}

impl FireCtx<'_> {
    /// Base per-shot damage after the damage multiplier and crit roll.
    #[inline]
    fn shot_damage(&self) -> f32 {
        let crit = if self.crit { self.bundle.crit_mult } else { 1.0 };
        self.bundle.damage_mult * crit
    }

    #[inline]
    fn bullet_speed(&self, base: f32) -> f32 {
        let buff = if self.effects.speed_up() { 1.3 } else { 1.0 };
        base * self.bundle.bullet_speed_mult * buff
    }
}

pub type FireFn = fn(&mut FireCtx);

/// Per-tick bullet context for the registry's update hook. Generic motion
/// and bounds handling live in the bullet system; the hook only applies
/// kind-specific behavior (steering, fuses).
pub struct BulletUpdateCtx<'a> {
    pub bullet: &'a mut super::components::Bullet,
    pub pos: Vec2,
    pub vel: &'a mut Vec2,
    pub dt_ms: f32,
    pub steps: f32,
    pub nearest_enemy: Option<Vec2>,
    /// Blasts requested this tick; the driving system forwards them.
    pub detonations: &'a mut Vec<super::messages::Detonation>,
}

/// Returns `false` when the bullet is spent and should return to the pool.
pub type BulletUpdateFn = fn(&mut BulletUpdateCtx) -> bool;

pub struct WeaponSpec {
    pub id: WeaponId,
    pub base_cooldown_ms: f32,
    pub fire: FireFn,
    /// Kind-specific per-tick behavior; `None` means plain ballistic flight.
    pub update: Option<BulletUpdateFn>,
}

#[derive(Resource)]
pub struct WeaponRegistry {
    specs: Vec<WeaponSpec>,
}

impl Default for WeaponRegistry {
    fn default() -> Self {
        Self {
            specs: vec![
                WeaponSpec {
                    id: WeaponId::Laser,
                    base_cooldown_ms: 160.0,
                    fire: fire_laser,
                    update: None,
                },
                WeaponSpec {
                    id: WeaponId::Rocket,
                    base_cooldown_ms: 600.0,
                    fire: fire_rocket,
                    update: Some(update_rocket),
                },
                WeaponSpec {
                    id: WeaponId::Shotgun,
                    base_cooldown_ms: 800.0,
                    fire: fire_shotgun,
                    update: None,
                },
                WeaponSpec {
                    id: WeaponId::Plasma,
                    base_cooldown_ms: 450.0,
                    fire: fire_plasma,
                    update: Some(update_plasma),
                },
                WeaponSpec {
                    id: WeaponId::Lightning,
                    base_cooldown_ms: 350.0,
                    fire: fire_lightning,
                    update: None,
                },
                // The beam is gated by its own long cooldown in RailBeam;
                // this short cooldown only spaces out activation attempts.
                WeaponSpec {
                    id: WeaponId::Rail,
                    base_cooldown_ms: 300.0,
                    fire: fire_rail,
                    update: None,
                },
            ],
        }
    }
}

impl WeaponRegistry {
    pub fn new(specs: Vec<WeaponSpec>) -> Self {
        Self { specs }
    }

    pub fn get(&self, id: WeaponId) -> Option<&WeaponSpec> {
        self.specs.iter().find(|spec| spec.id == id)
    }
}

const MULTISHOT_OFFSETS: [&[f32]; 4] =
    [&[0.0], &[-11.0, 11.0], &[-16.0, 0.0, 16.0], &[-24.0, -8.0, 8.0, 24.0]];

fn fire_laser(ctx: &mut FireCtx) {
    let damage = ctx.shot_damage();
    let speed = ctx.bullet_speed(13.0);
    let half_w = (2.5 * ctx.bundle.laser_width_mult).round();

    let mut tier = ctx.bundle.multishot as usize;
    if ctx.effects.double_laser_ms > 0.0 {
        tier += 1;
    }
    let offsets = MULTISHOT_OFFSETS[tier.min(MULTISHOT_OFFSETS.len() - 1)];

    for &ox in offsets {
        ctx.seeds.push(BulletSeed {
            kind: WeaponId::Laser,
            pos: ctx.origin + Vec2::new(ox, 0.0),
            vel: Vec2::new(0.0, -speed),
            half: Vec2::new(half_w, 11.0),
            damage,
            pierce: ctx.bundle.pierce_count > 0,
            max_pierce: Some(ctx.bundle.pierce_count),
            payload: BulletPayload::Plain,
        });
    }
}

fn fire_rocket(ctx: &mut FireCtx) {
    let speed = ctx.bullet_speed(7.0) * ctx.bundle.rocket_spd_mult;
    ctx.seeds.push(BulletSeed {
        kind: WeaponId::Rocket,
        pos: ctx.origin,
        vel: Vec2::new(0.0, -speed),
        half: Vec2::new(5.0, 9.0),
        damage: ctx.shot_damage() * 3.0 * ctx.bundle.rocket_dmg_mult,
        pierce: false,
        max_pierce: None,
        payload: BulletPayload::Rocket { split: ctx.bundle.rocket_split },
    });
}

fn fire_shotgun(ctx: &mut FireCtx) {
    let damage = ctx.shot_damage();
    let speed = ctx.bullet_speed(10.0);
    let spread = ctx.bundle.shot_spread_mult;
    let half = (ctx.bundle.shot_pellets / 2) as i32;
    for a in -half..=half {
        ctx.seeds.push(BulletSeed {
            kind: WeaponId::Shotgun,
            pos: ctx.origin,
            vel: Vec2::new(a as f32 * 1.8 * spread, -speed),
            half: Vec2::new(3.0, 7.0),
            damage,
            pierce: ctx.bundle.shot_pierce,
            max_pierce: None,
            payload: BulletPayload::Plain,
        });
    }
}

fn fire_plasma(ctx: &mut FireCtx) {
    ctx.seeds.push(BulletSeed {
        kind: WeaponId::Plasma,
        pos: ctx.origin,
        vel: Vec2::new(0.0, -ctx.bullet_speed(6.0)),
        half: Vec2::new(8.0, 8.0),
        damage: ctx.shot_damage() * 2.0,
        pierce: false,
        max_pierce: None,
        payload: BulletPayload::Plasma { fuse_ms: 900.0, detonated: false },
    });
}

fn fire_lightning(ctx: &mut FireCtx) {
    let chain = 3 + ctx.bundle.pierce_count;
    ctx.seeds.push(BulletSeed {
        kind: WeaponId::Lightning,
        pos: ctx.origin,
        vel: Vec2::new(0.0, -ctx.bullet_speed(22.0)),
        half: Vec2::new(2.0, 15.0),
        damage: ctx.shot_damage() * 0.8,
        pierce: true,
        max_pierce: Some(chain),
        payload: BulletPayload::Plain,
    });
}

fn fire_rail(ctx: &mut FireCtx) {
    ctx.rail.try_activate(ctx.bundle);
}

/// How strongly a rocket's velocity blends toward the intercept direction
/// each 60 Hz step. Speed stays constant; only the heading bends.
const HOMING_BLEND: f32 = 0.12;

fn update_rocket(ctx: &mut BulletUpdateCtx) -> bool {
    let Some(target) = ctx.nearest_enemy else {
        return true;
    };
    let speed = ctx.vel.length();
    if speed > 0.0 {
        let desired = (target - ctx.pos).normalize_or_zero() * speed;
        let blended = ctx.vel.lerp(desired, (HOMING_BLEND * ctx.steps).min(1.0));
        *ctx.vel = blended.normalize_or_zero() * speed;
    }
    true
}

fn update_plasma(ctx: &mut BulletUpdateCtx) -> bool {
    let damage = ctx.bullet.damage;
    let BulletPayload::Plasma { fuse_ms, detonated } = &mut ctx.bullet.payload else {
        return true;
    };
    *fuse_ms -= ctx.dt_ms;
    if *fuse_ms > 0.0 || *detonated {
        return true;
    }
    *detonated = true;
    ctx.detonations.push(super::messages::Detonation {
        pos: ctx.pos,
        radius: super::bullets::PLASMA_SPLASH_RADIUS,
        damage: damage * 0.6,
        split: 0,
        color: Color::srgb(0.66, 0.33, 0.97),
    });
    false
}
