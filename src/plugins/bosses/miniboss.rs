//! Mini-boss dispatch table: a lighter parallel of the boss registry.
//!
//! Three types, spawned probabilistically during normal play (never at
//! decade-boundary levels, never alongside a boss or armada, at most one
//! alive). They die through the regular kill path and always drop a
//! power-up.

use bevy::prelude::*;
use rand::Rng;
use rand::rngs::StdRng;

use crate::common::tunables::Playfield;
use crate::plugins::combat::components::Extents;

use super::registry::ShotSeed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MiniBossId {
    Warden,
    Ravager,
    Spectre,
}

#[derive(Component, Debug, Clone, Copy)]
pub struct MiniBoss {
    pub id: MiniBossId,
    pub name: &'static str,
    pub color: Color,
}

#[derive(Component, Debug, Clone)]
pub enum MiniBossBrain {
    Warden { dir: f32, shoot_ms: f32 },
    Ravager { rest_ms: f32, dash_ms: f32, dash_dir: f32 },
    Spectre { cycle_ms: f32, shoot_ms: f32 },
}

/// Everything a mini-boss update may read and emit.
pub struct MiniBossCtx<'a> {
    pub brain: &'a mut MiniBossBrain,
    pub pos: &'a mut Vec2,
    pub extents: Extents,
    pub speed: f32,
    pub level: u32,
    pub dt_ms: f32,
    pub steps: f32,
    pub player: Vec2,
    pub field: &'a Playfield,
    pub rng: &'a mut StdRng,
    pub shots: &'a mut Vec<ShotSeed>,
    /// Sprite alpha, for the spectre's flicker.
    pub alpha: &'a mut f32,
}

pub type MiniBossInitFn = fn() -> MiniBossBrain;
pub type MiniBossUpdateFn = fn(&mut MiniBossCtx);

pub struct MiniBossSpec {
    pub id: MiniBossId,
    pub name: &'static str,
    pub color: Color,
    pub hw: f32,
    pub hh: f32,
    pub init: MiniBossInitFn,
    pub update: MiniBossUpdateFn,
}

#[derive(Resource)]
pub struct MiniBossRegistry {
    specs: Vec<MiniBossSpec>,
}

impl Default for MiniBossRegistry {
    fn default() -> Self {
        Self {
            specs: vec![
                MiniBossSpec {
                    id: MiniBossId::Warden,
                    name: "WARDEN",
                    color: Color::srgb(0.33, 0.78, 0.99),
                    hw: 30.0,
                    hh: 26.0,
                    init: init_warden,
                    update: update_warden,
                },
                MiniBossSpec {
                    id: MiniBossId::Ravager,
                    name: "RAVAGER",
                    color: Color::srgb(1.0, 0.33, 0.2),
                    hw: 28.0,
                    hh: 24.0,
                    init: init_ravager,
                    update: update_ravager,
                },
                MiniBossSpec {
                    id: MiniBossId::Spectre,
                    name: "SPECTRE",
                    color: Color::srgb(0.72, 0.72, 1.0),
                    hw: 26.0,
                    hh: 22.0,
                    init: init_spectre,
                    update: update_spectre,
                },
            ],
        }
    }
}

impl MiniBossRegistry {
    pub fn get(&self, id: MiniBossId) -> Option<&MiniBossSpec> {
        self.specs.iter().find(|s| s.id == id)
    }

    pub fn pick(&self, rng: &mut StdRng) -> &MiniBossSpec {
        &self.specs[rng.gen_range(0..self.specs.len())]
    }
}

pub fn miniboss_hp(level: u32, boss_hp_mult: f32) -> i32 {
    (((10 + level * 3) as f32) * boss_hp_mult).floor().max(1.0) as i32
}

fn init_warden() -> MiniBossBrain {
    MiniBossBrain::Warden { dir: 1.0, shoot_ms: 0.0 }
}

fn update_warden(ctx: &mut MiniBossCtx) {
    let MiniBossBrain::Warden { dir, shoot_ms } = ctx.brain else {
        return;
    };
    ctx.pos.x += ctx.speed * 1.4 * *dir * ctx.steps;
    if ctx.pos.x > ctx.field.width - ctx.extents.hw || ctx.pos.x < ctx.extents.hw {
        *dir = -*dir;
    }
    if ctx.pos.y < 130.0 {
        ctx.pos.y += 1.5 * ctx.steps;
    }

    *shoot_ms -= ctx.dt_ms;
    if *shoot_ms <= 0.0 {
        *shoot_ms = (1900.0 - ctx.level as f32 * 30.0).max(900.0);
        let muzzle = *ctx.pos + Vec2::new(0.0, ctx.extents.hh);
        let dir_to_player = (ctx.player - muzzle).normalize_or_zero();
        for spread in [-0.25f32, 0.0, 0.25] {
            let rot = Vec2::from_angle(spread).rotate(dir_to_player);
            ctx.shots.push(ShotSeed {
                pos: muzzle,
                vel: rot * 2.6,
                color: Color::srgb(0.33, 0.78, 0.99),
                size: 8.0,
            });
        }
    }
}

fn init_ravager() -> MiniBossBrain {
    MiniBossBrain::Ravager { rest_ms: 900.0, dash_ms: 0.0, dash_dir: 0.0 }
}

fn update_ravager(ctx: &mut MiniBossCtx) {
    let MiniBossBrain::Ravager { rest_ms, dash_ms, dash_dir } = ctx.brain else {
        return;
    };
    if ctx.pos.y < 120.0 {
        ctx.pos.y += 1.6 * ctx.steps;
    }

    if *dash_ms > 0.0 {
        *dash_ms -= ctx.dt_ms;
        ctx.pos.x = (ctx.pos.x + *dash_dir * ctx.speed * 5.0 * ctx.steps)
            .clamp(ctx.extents.hw, ctx.field.width - ctx.extents.hw);
        if *dash_ms <= 0.0 {
            // Dash ends in a downward burst.
            *rest_ms = 900.0;
            let muzzle = *ctx.pos + Vec2::new(0.0, ctx.extents.hh);
            for a in -1..=1 {
                ctx.shots.push(ShotSeed {
                    pos: muzzle,
                    vel: Vec2::new(a as f32 * 0.8, 2.8 + ctx.level as f32 * 0.03),
                    color: Color::srgb(1.0, 0.33, 0.2),
                    size: 8.0,
                });
            }
        }
    } else {
        *rest_ms -= ctx.dt_ms;
        if *rest_ms <= 0.0 {
            *dash_ms = 350.0;
            *dash_dir = (ctx.player.x - ctx.pos.x).signum();
        }
    }
}

fn init_spectre() -> MiniBossBrain {
    MiniBossBrain::Spectre { cycle_ms: 0.0, shoot_ms: 0.0 }
}

fn update_spectre(ctx: &mut MiniBossCtx) {
    let MiniBossBrain::Spectre { cycle_ms, shoot_ms } = ctx.brain else {
        return;
    };
    *cycle_ms += ctx.dt_ms;
    let phase = (*cycle_ms % 2000.0) / 2000.0;
    *ctx.alpha = 0.25 + 0.75 * (phase * std::f32::consts::TAU).sin().abs();

    ctx.pos.x = (ctx.pos.x + (*cycle_ms / 700.0).sin() * 1.8 * ctx.steps)
        .clamp(ctx.extents.hw, ctx.field.width - ctx.extents.hw);
    if ctx.pos.y < 110.0 {
        ctx.pos.y += 1.4 * ctx.steps;
    }

    *shoot_ms -= ctx.dt_ms;
    if *shoot_ms <= 0.0 {
        *shoot_ms = (1300.0 - ctx.level as f32 * 20.0).max(700.0);
        let muzzle = *ctx.pos + Vec2::new(0.0, ctx.extents.hh);
        let dir = (ctx.player - muzzle).normalize_or_zero();
        ctx.shots.push(ShotSeed {
            pos: muzzle,
            vel: dir * 3.4,
            color: Color::srgb(0.72, 0.72, 1.0),
            size: 7.0,
        });
    }
}
