use bevy::platform::collections::HashSet;
use bevy::prelude::*;

#[derive(Component)]
pub struct PooledBullet;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulletState {
    #[default]
    Inactive,
    Active,
    PendingReturn,
}

/// Equipped-weapon identifier. The registry is keyed on this; an id the
/// registry does not know degrades to a no-op at the fire site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeaponId {
    Laser,
    Rocket,
    Shotgun,
    Plasma,
    Lightning,
    Rail,
}

/// Kind-specific bullet data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BulletPayload {
    Plain,
    Rocket {
        /// Remaining split generations on detonation.
        split: u8,
    },
    Plasma {
        fuse_ms: f32,
        /// Latch: detonation code must never run twice for one bullet.
        detonated: bool,
    },
}

/// Pierce bookkeeping: the set of enemies this bullet already damaged, and
/// an optional cap on distinct victims.
#[derive(Debug, Default)]
pub struct Pierce {
    pub hit: HashSet<Entity>,
    pub max: Option<u32>,
}

impl Pierce {
    /// True once the bullet has spent its last allowed victim.
    /// A cap of N means N+1 distinct enemies take damage.
    #[inline]
    pub fn exhausted(&self) -> bool {
        match self.max {
            Some(max) => self.hit.len() as u32 > max,
            None => false,
        }
    }
}

#[derive(Component, Debug)]
pub struct Bullet {
    pub kind: WeaponId,
    pub damage: f32,
    pub pierce: Option<Pierce>,
    pub payload: BulletPayload,
}

impl Bullet {
    /// Reset a pooled bullet for a fresh shot.
    pub fn reset_for_fire(&mut self, seed: &super::messages::BulletSeed) {
        self.kind = seed.kind;
        self.damage = seed.damage;
        self.payload = seed.payload;
        self.pierce = seed
            .pierce
            .then(|| Pierce { hit: HashSet::default(), max: seed.max_pierce });
    }
}
