//! Spawn consumer: activate bullets from the pool.
//!
//! The pool free list contains only valid pooled-bullet entities; a pooled
//! entity therefore must match the bullet query, and a mismatch is an
//! invariant violation worth crashing loudly over. An empty pool is not —
//! that is the capacity policy, and the request is simply dropped.

use bevy::prelude::*;

use crate::plugins::combat::components::{Extents, Velocity};

use super::components::{Bullet, BulletState, PooledBullet};
use super::messages::SpawnBulletRequest;
use super::pool::BulletPool;

pub fn allocate_bullets_from_pool(
    mut pool: ResMut<BulletPool>,
    mut reader: MessageReader<SpawnBulletRequest>,
    mut q: Query<
        (
            &mut BulletState,
            &mut Bullet,
            &mut Extents,
            &mut Transform,
            &mut Velocity,
            &mut Visibility,
        ),
        With<PooledBullet>,
    >,
) {
    for req in reader.read() {
        let Some(e) = pool.free.pop() else {
            continue;
        };

        let (mut state, mut bullet, mut extents, mut tf, mut vel, mut vis) = q
            .get_mut(e)
            .expect("BulletPool contained an entity missing pooled bullet components");

        *state = BulletState::Active;
        bullet.reset_for_fire(&req.seed);
        *extents = Extents::new(req.seed.half.x, req.seed.half.y);
        tf.translation = req.seed.pos.extend(2.0);
        vel.0 = req.seed.vel;
        *vis = Visibility::Visible;
    }
}
