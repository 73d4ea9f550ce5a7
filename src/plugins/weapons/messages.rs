//! Buffered weapon intent.
//!
//! Producers (the fire system, rocket splits) only enqueue intent; the
//! allocator is the single writer that mutates the bullet pool. Detonations
//! follow the same shape: anything that explodes enqueues a `Detonation`,
//! and one consumer applies the area damage.

use bevy::prelude::*;

use super::components::{BulletPayload, WeaponId};

/// Everything needed to activate one pooled bullet.
#[derive(Debug, Clone, Copy)]
pub struct BulletSeed {
    pub kind: WeaponId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub half: Vec2,
    pub damage: f32,
    pub pierce: bool,
    pub max_pierce: Option<u32>,
    pub payload: BulletPayload,
}

#[derive(Message, Debug, Clone, Copy)]
pub struct SpawnBulletRequest {
    pub seed: BulletSeed,
}

/// An area blast to resolve against every enemy in radius, with linear
/// falloff from `damage` at the center to zero at the rim.
#[derive(Message, Debug, Clone, Copy)]
pub struct Detonation {
    pub pos: Vec2,
    pub radius: f32,
    pub damage: f32,
    /// Remaining rocket-split generations to respawn from the blast.
    pub split: u8,
    pub color: Color,
}
