//! Return commit: recycle bullets back into the pool.
//!
//! This system owns the Inactive invariants: hidden, velocity zero, pierce
//! state dropped. Centralizing the writes here keeps every other system a
//! pure "mark PendingReturn" producer.

use bevy::prelude::*;

use crate::plugins::combat::components::Velocity;

use super::components::{Bullet, BulletState, PooledBullet};
use super::pool::BulletPool;

pub fn return_to_pool_commit(
    mut pool: ResMut<BulletPool>,
    mut q: Query<
        (Entity, &mut BulletState, &mut Bullet, &mut Velocity, &mut Visibility),
        With<PooledBullet>,
    >,
) {
    for (e, mut state, mut bullet, mut vel, mut vis) in &mut q {
        if *state != BulletState::PendingReturn {
            continue;
        }

        *state = BulletState::Inactive;
        bullet.pierce = None;
        vel.0 = Vec2::ZERO;
        *vis = Visibility::Hidden;

        pool.free.push(e);
    }
}
