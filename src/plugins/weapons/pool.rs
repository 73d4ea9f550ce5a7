//! Pooled bullet storage.
//!
//! Bullets are pre-spawned once and recycled: `Inactive` bullets are hidden,
//! stationary and invisible to collision code (which only queries `Active`
//! state). Activation and return mutate component values in place, so the
//! hot path never moves entities between archetypes.

use bevy::prelude::*;

use crate::plugins::combat::components::{Extents, Velocity};

use super::components::{Bullet, BulletPayload, BulletState, PooledBullet, WeaponId};

#[derive(Resource, Debug)]
pub struct BulletPool {
    pub free: Vec<Entity>,
    pub capacity: usize,
}

impl BulletPool {
    pub fn new(capacity: usize) -> Self {
        Self { free: Vec::with_capacity(capacity), capacity }
    }
}

/// Pre-spawn the pool, inactive. Pool entities live for the whole app —
/// run teardown recalls them instead of despawning.
pub fn init_bullet_pool(mut commands: Commands, mut pool: ResMut<BulletPool>) {
    pool.free.clear();
    let cap = pool.capacity;
    pool.free.reserve(cap);

    for _ in 0..cap {
        let e = commands
            .spawn((
                Name::new("Bullet(Pooled)"),
                PooledBullet,
                BulletState::Inactive,
                Bullet {
                    kind: WeaponId::Laser,
                    damage: 0.0,
                    pierce: None,
                    payload: BulletPayload::Plain,
                },
                Extents::new(3.0, 11.0),
                Velocity(Vec2::ZERO),
                Sprite {
                    color: Color::srgb(1.0, 0.85, 0.3),
                    custom_size: Some(Vec2::new(6.0, 22.0)),
                    ..default()
                },
                Transform::from_xyz(-100.0, -100.0, 2.0),
                Visibility::Hidden,
            ))
            .id();
        pool.free.push(e);
    }
}

/// Return every in-flight bullet to the pool when a run ends, so the next
/// run starts with a full free list and no live projectiles.
pub fn recall_all_bullets(
    mut pool: ResMut<BulletPool>,
    mut q: Query<(Entity, &mut BulletState, &mut Velocity, &mut Visibility), With<PooledBullet>>,
) {
    pool.free.clear();
    for (e, mut state, mut vel, mut vis) in &mut q {
        *state = BulletState::Inactive;
        vel.0 = Vec2::ZERO;
        *vis = Visibility::Hidden;
        pool.free.push(e);
    }
}
