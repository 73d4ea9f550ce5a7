//! Boss dispatch table.
//!
//! Each boss type supplies `init` (fresh brain state) and `update` (one AI
//! step against a [`BossCtx`]). Updates never touch the world directly —
//! they emit shot seeds, minion seeds and player-hit positions, and the
//! driving system applies them. That keeps every boss a plain function over
//! plain data, and keeps the registry open: a new boss is one more spec.
//!
//! All cadences are frame-delta countdown fields on the brain. Phase flags
//! are monotonic and threshold-checked on hp *ratio*, never absolute hp.

use bevy::prelude::*;
use rand::Rng;
use rand::rngs::StdRng;

use crate::common::tunables::Playfield;
use crate::plugins::combat::components::Extents;
use crate::plugins::enemies::components::{EnemyBrain, EnemyKind};
use crate::plugins::enemies::spawn::EnemySeed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BossId {
    Guardian,
    Sniper,
    Octopus,
    Dreadnought,
    Phoenix,
}

/// Marker + identity for a live boss entity.
#[derive(Component, Debug, Clone, Copy)]
pub struct Boss {
    pub id: BossId,
    pub name: &'static str,
    pub color: Color,
}

/// Monotonic phase flags plus the aggression they bought. Once a flag is
/// set it never clears for that boss instance, and each transition fires
/// exactly once even if hp crosses the threshold repeatedly in a frame.
#[derive(Component, Debug, Clone, Copy)]
pub struct BossPhases {
    pub phase2_entered: bool,
    pub phase3_entered: bool,
    pub speed_mult: f32,
}

impl Default for BossPhases {
    fn default() -> Self {
        Self { phase2_entered: false, phase3_entered: false, speed_mult: 1.0 }
    }
}

impl BossPhases {
    /// Extra projectiles bought by entered phases.
    #[inline]
    pub fn pattern_bonus(&self) -> u32 {
        self.phase2_entered as u32 * 2 + self.phase3_entered as u32 * 2
    }
}

/// Entrance grace: the boss cannot be damaged until the intro-animation
/// layer clears this, or the fallback timer expires (which is logged as a
/// bug in the host, not accepted silently).
#[derive(Component, Debug, Clone, Copy)]
pub struct SpawnInvincible {
    pub fallback_ms: f32,
}

impl Default for SpawnInvincible {
    fn default() -> Self {
        Self { fallback_ms: 4000.0 }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Orbit {
    pub angle: f32,
    pub dist: f32,
}

/// Per-boss mutable AI state.
#[derive(Component, Debug, Clone)]
pub enum BossBrain {
    Guardian {
        dir: f32,
        shoot_ms: f32,
    },
    Sniper {
        wobble: f32,
        shoot_ms: f32,
        charge_ms: f32,
        charging: bool,
        aim: Vec2,
    },
    Octopus {
        drift: f32,
        tentacle_angle: f32,
        spawn_ms: f32,
        shoot_ms: f32,
    },
    Dreadnought {
        dir: f32,
        shoot_ms: f32,
        charge_ms: f32,
        firing_ms: f32,
        beam_x: f32,
    },
    Phoenix {
        drift: f32,
        orb_angle: f32,
        shoot_ms: f32,
        orbits: [Orbit; 3],
        reborn: bool,
    },
}

impl BossBrain {
    /// Phoenix cheats death once; everyone else dies on the first kill.
    pub fn phoenix_rebirth_available(&self) -> bool {
        matches!(self, BossBrain::Phoenix { reborn: false, .. })
    }

    pub fn mark_phoenix_reborn(&mut self) {
        if let BossBrain::Phoenix { reborn, .. } = self {
            *reborn = true;
        }
    }
}

/// One hazardous projectile requested by a boss update.
#[derive(Debug, Clone, Copy)]
pub struct ShotSeed {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Color,
    pub size: f32,
}

/// Everything a boss update may read and emit.
pub struct BossCtx<'a> {
    pub brain: &'a mut BossBrain,
    pub phases: BossPhases,
    pub pos: &'a mut Vec2,
    pub extents: Extents,
    pub speed: f32,
    pub level: u32,
    pub dt_ms: f32,
    pub steps: f32,
    pub player: Vec2,
    pub field: &'a Playfield,
    pub rng: &'a mut StdRng,
    /// Live non-boss enemies, for minion caps.
    pub minion_count: usize,
    pub shots: &'a mut Vec<ShotSeed>,
    pub minions: &'a mut Vec<EnemySeed>,
    /// Positions of direct boss-body hits on the player this tick
    /// (dreadnought beam, phoenix orbs). Routed through the damage path.
    pub player_hits: &'a mut Vec<Vec2>,
}

pub type BossInitFn = fn(&mut StdRng) -> BossBrain;
pub type BossUpdateFn = fn(&mut BossCtx);

pub struct BossSpec {
    pub id: BossId,
    pub name: &'static str,
    pub color: Color,
    pub hw: f32,
    pub hh: f32,
    pub min_level: u32,
    pub init: BossInitFn,
    pub update: BossUpdateFn,
}

#[derive(Resource)]
pub struct BossRegistry {
    specs: Vec<BossSpec>,
}

impl Default for BossRegistry {
    fn default() -> Self {
        Self {
            specs: vec![
                BossSpec {
                    id: BossId::Guardian,
                    name: "GUARDIAN",
                    color: Color::srgb(1.0, 0.0, 0.4),
                    hw: 55.0,
                    hh: 45.0,
                    min_level: 1,
                    init: init_guardian,
                    update: update_guardian,
                },
                BossSpec {
                    id: BossId::Sniper,
                    name: "SNIPER",
                    color: Color::srgb(1.0, 0.6, 0.0),
                    hw: 45.0,
                    hh: 55.0,
                    min_level: 10,
                    init: init_sniper,
                    update: update_sniper,
                },
                BossSpec {
                    id: BossId::Octopus,
                    name: "OCTOPUS",
                    color: Color::srgb(0.66, 0.33, 0.97),
                    hw: 60.0,
                    hh: 50.0,
                    min_level: 15,
                    init: init_octopus,
                    update: update_octopus,
                },
                BossSpec {
                    id: BossId::Dreadnought,
                    name: "DREADNOUGHT",
                    color: Color::srgb(0.0, 0.83, 1.0),
                    hw: 75.0,
                    hh: 55.0,
                    min_level: 20,
                    init: init_dreadnought,
                    update: update_dreadnought,
                },
                BossSpec {
                    id: BossId::Phoenix,
                    name: "PHOENIX",
                    color: Color::srgb(1.0, 0.27, 0.0),
                    hw: 58.0,
                    hh: 52.0,
                    min_level: 25,
                    init: init_phoenix,
                    update: update_phoenix,
                },
            ],
        }
    }
}

impl BossRegistry {
    pub fn get(&self, id: BossId) -> Option<&BossSpec> {
        self.specs.iter().find(|s| s.id == id)
    }

    /// Uniform-random pick among the bosses unlocked at `level`.
    pub fn pick(&self, rng: &mut StdRng, level: u32) -> Option<&BossSpec> {
        let unlocked: Vec<&BossSpec> =
            self.specs.iter().filter(|s| s.min_level <= level).collect();
        if unlocked.is_empty() {
            return None;
        }
        Some(unlocked[rng.gen_range(0..unlocked.len())])
    }

    pub fn hp_for(level: u32, boss_hp_mult: f32) -> i32 {
        (((20 + level * 5) as f32 + (level as f32).sqrt() * 8.0) * boss_hp_mult).floor() as i32
    }
}

// ---------------------------------------------------------------------------
// Guardian: patrolling wall with a downward fan.
// ---------------------------------------------------------------------------

fn init_guardian(_rng: &mut StdRng) -> BossBrain {
    BossBrain::Guardian { dir: 1.0, shoot_ms: 0.0 }
}

fn update_guardian(ctx: &mut BossCtx) {
    let BossBrain::Guardian { dir, shoot_ms } = ctx.brain else {
        return;
    };

    ctx.pos.x += ctx.speed * *dir * ctx.steps;
    if ctx.pos.x > ctx.field.width - ctx.extents.hw || ctx.pos.x < ctx.extents.hw {
        *dir = -*dir;
    }
    if ctx.pos.y < 120.0 {
        ctx.pos.y += 1.8 * ctx.steps;
    }

    *shoot_ms -= ctx.dt_ms;
    if *shoot_ms <= 0.0 {
        *shoot_ms = (2000.0 - ctx.level as f32 * 55.0).max(900.0);
        let spread = 1 + ctx.phases.pattern_bonus() as i32 / 2;
        for a in -spread..=spread {
            ctx.shots.push(ShotSeed {
                pos: *ctx.pos + Vec2::new(a as f32 * 20.0, ctx.extents.hh),
                vel: Vec2::new(a as f32 * 0.6, 2.5 + ctx.level as f32 * 0.04),
                color: Color::srgb(1.0, 0.0, 0.4),
                size: 8.0,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Sniper: telegraphed aimed volleys.
// ---------------------------------------------------------------------------

fn init_sniper(_rng: &mut StdRng) -> BossBrain {
    BossBrain::Sniper { wobble: 0.0, shoot_ms: 0.0, charge_ms: 0.0, charging: false, aim: Vec2::ZERO }
}

fn update_sniper(ctx: &mut BossCtx) {
    let BossBrain::Sniper { wobble, shoot_ms, charge_ms, charging, aim } = ctx.brain else {
        return;
    };

    *wobble += ctx.dt_ms / 1200.0;
    ctx.pos.x = (ctx.pos.x + wobble.sin() * 1.2 * ctx.steps)
        .clamp(ctx.extents.hw, ctx.field.width - ctx.extents.hw);
    if ctx.pos.y < 100.0 {
        ctx.pos.y += 1.2 * ctx.steps;
    }

    *shoot_ms -= ctx.dt_ms;
    if *shoot_ms <= 0.0 && !*charging {
        *charging = true;
        *charge_ms = if ctx.phases.phase3_entered {
            550.0
        } else if ctx.phases.phase2_entered {
            800.0
        } else {
            1100.0
        };
        *aim = ctx.player;
    }

    if *charging {
        *charge_ms -= ctx.dt_ms;
        if *charge_ms <= 0.0 {
            *charging = false;
            *shoot_ms = (2800.0 - ctx.level as f32 * 75.0).max(1400.0);
            let muzzle = *ctx.pos + Vec2::new(0.0, ctx.extents.hh);
            let dir = (*aim - *ctx.pos).normalize_or_zero();
            let spd = 5.0 + ctx.level as f32 * 0.13;
            ctx.shots.push(ShotSeed {
                pos: muzzle,
                vel: dir * spd,
                color: Color::srgb(1.0, 0.6, 0.0),
                size: 12.0,
            });
            for ox in [-10.0, 10.0] {
                ctx.shots.push(ShotSeed {
                    pos: muzzle + Vec2::new(ox, 0.0),
                    vel: dir * (spd * 0.85),
                    color: Color::srgb(1.0, 0.6, 0.0),
                    size: 7.0,
                });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Octopus: sweeping spawner with rotating radial bursts.
// ---------------------------------------------------------------------------

fn init_octopus(_rng: &mut StdRng) -> BossBrain {
    BossBrain::Octopus { drift: 0.0, tentacle_angle: 0.0, spawn_ms: 0.0, shoot_ms: 0.0 }
}

fn update_octopus(ctx: &mut BossCtx) {
    let BossBrain::Octopus { drift, tentacle_angle, spawn_ms, shoot_ms } = ctx.brain else {
        return;
    };

    *drift += ctx.dt_ms / 900.0;
    ctx.pos.x = ctx.field.width * 0.5 + drift.sin() * ctx.field.width * 0.35;
    if ctx.pos.y < 110.0 {
        ctx.pos.y += 1.5 * ctx.steps;
    }
    *tentacle_angle += ctx.dt_ms * 0.003;

    *spawn_ms -= ctx.dt_ms;
    if *spawn_ms <= 0.0 {
        *spawn_ms = (4500.0 - ctx.level as f32 * 80.0).max(2000.0);
        if ctx.minion_count < 8 {
            let offset = ctx.rng.gen_range(-40.0..40.0);
            ctx.minions.push(EnemySeed {
                kind: EnemyKind::Fast,
                pos: *ctx.pos + Vec2::new(offset, 20.0),
                extents: Extents::new(10.0, 10.0),
                speed: 1.5,
                hp: 1,
                brain: EnemyBrain::Fast,
            });
        }
    }

    *shoot_ms -= ctx.dt_ms;
    if *shoot_ms <= 0.0 {
        *shoot_ms = (1600.0 - ctx.level as f32 * 45.0).max(700.0);
        let rays = 8 + ctx.phases.pattern_bonus();
        let speed = if ctx.phases.phase2_entered { 2.6 } else { 2.0 };
        for i in 0..rays {
            let ang = (i as f32 / rays as f32) * std::f32::consts::TAU + *tentacle_angle;
            ctx.shots.push(ShotSeed {
                pos: *ctx.pos,
                vel: Vec2::new(ang.cos(), ang.sin()) * speed,
                color: Color::srgb(0.66, 0.33, 0.97),
                size: 7.0,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Dreadnought: tracking beam with drip fire.
// ---------------------------------------------------------------------------

fn init_dreadnought(_rng: &mut StdRng) -> BossBrain {
    BossBrain::Dreadnought { dir: 0.5, shoot_ms: 0.0, charge_ms: 0.0, firing_ms: 0.0, beam_x: 0.0 }
}

fn update_dreadnought(ctx: &mut BossCtx) {
    let BossBrain::Dreadnought { dir, shoot_ms, charge_ms, firing_ms, beam_x } = ctx.brain else {
        return;
    };

    ctx.pos.x += ctx.speed * 0.5 * *dir * ctx.steps;
    if ctx.pos.x > ctx.field.width - ctx.extents.hw || ctx.pos.x < ctx.extents.hw {
        *dir = -*dir;
    }
    if ctx.pos.y < 90.0 {
        ctx.pos.y += ctx.steps;
    }

    let firing = *firing_ms > 0.0;
    *shoot_ms -= ctx.dt_ms;
    if *shoot_ms <= 0.0 && !firing && *charge_ms <= 0.0 {
        *shoot_ms = (3800.0 - ctx.level as f32 * 70.0).max(1400.0);
        *charge_ms = 900.0;
        *beam_x = ctx.player.x;
    }

    if *charge_ms > 0.0 {
        *charge_ms -= ctx.dt_ms;
        if *charge_ms <= 0.0 {
            let mut duration = 280.0 + ctx.level as f32 * 8.0;
            if ctx.phases.phase2_entered {
                duration *= 1.4;
            }
            *firing_ms = duration;
        }
    }

    if *firing_ms > 0.0 {
        *firing_ms -= ctx.dt_ms;
        if (ctx.player.x - *beam_x).abs() < 16.0 {
            ctx.player_hits.push(Vec2::new(*beam_x, ctx.player.y));
            // Re-acquire so a shielded player is not instantly drained.
            *beam_x = ctx.player.x + ctx.rng.gen_range(-40.0..40.0);
        }
        let drip = if ctx.phases.phase3_entered { 0.03 } else { 0.015 };
        if ctx.rng.gen_range(0.0..1.0) < drip * ctx.steps {
            ctx.shots.push(ShotSeed {
                pos: *ctx.pos
                    + Vec2::new(ctx.rng.gen_range(-0.75..0.75) * ctx.extents.hw, ctx.extents.hh),
                vel: Vec2::new(ctx.rng.gen_range(-0.9..0.9), 2.0 + ctx.level as f32 * 0.03),
                color: Color::srgb(0.0, 0.83, 1.0),
                size: 8.0,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Phoenix: orbiting hazards, radial bursts, one rebirth.
// ---------------------------------------------------------------------------

fn init_phoenix(_rng: &mut StdRng) -> BossBrain {
    BossBrain::Phoenix {
        drift: 0.0,
        orb_angle: 0.0,
        shoot_ms: 0.0,
        orbits: [
            Orbit { angle: 0.0, dist: 90.0 },
            Orbit { angle: std::f32::consts::TAU / 3.0, dist: 105.0 },
            Orbit { angle: std::f32::consts::TAU * 2.0 / 3.0, dist: 120.0 },
        ],
        reborn: false,
    }
}

fn update_phoenix(ctx: &mut BossCtx) {
    let BossBrain::Phoenix { drift, orb_angle, shoot_ms, orbits, reborn } = ctx.brain else {
        return;
    };

    *drift += ctx.dt_ms / 1500.0;
    ctx.pos.x = ctx.field.width * 0.5 + drift.sin() * ctx.field.width * 0.3;
    if ctx.pos.y < 100.0 {
        ctx.pos.y += 1.5 * ctx.steps;
    } else {
        ctx.pos.y = 100.0 + (*drift * 1.3).sin() * 20.0;
    }

    *orb_angle += ctx.dt_ms * 0.0018;
    for orbit in orbits.iter_mut() {
        orbit.angle += ctx.dt_ms * 0.0013;
        let orb = *ctx.pos + Vec2::new(orbit.angle.cos(), orbit.angle.sin()) * orbit.dist;
        if orb.distance(ctx.player) < 14.0 {
            ctx.player_hits.push(orb);
            orbit.angle += std::f32::consts::PI;
        }
    }

    *shoot_ms -= ctx.dt_ms;
    if *shoot_ms <= 0.0 {
        *shoot_ms = (1800.0 - ctx.level as f32 * 50.0).max(800.0);
        let (rays, speed, color) = if *reborn {
            (8, 2.8, Color::srgb(1.0, 0.67, 0.0))
        } else {
            (5, 2.2, Color::srgb(1.0, 0.27, 0.0))
        };
        for i in 0..rays + ctx.phases.pattern_bonus() {
            let ang = *orb_angle + (i as f32 / rays as f32) * std::f32::consts::TAU;
            ctx.shots.push(ShotSeed {
                pos: *ctx.pos,
                vel: Vec2::new(ang.cos(), ang.sin()) * speed,
                color,
                size: 9.0,
            });
        }
    }
}
