//! Weapons plugin: registry-dispatched firing with pooled bullets.
//!
//! Data flow per tick:
//!
//! ```text
//! fire_weapon (producer)          TickSet::Fire
//!   - registry lookup + cooldown + crit roll
//!   - writes SpawnBulletRequest / activates RailBeam
//!        |
//! allocate_bullets_from_pool      TickSet::Bullets
//!   - single writer of the pool free list
//! update_bullets                  TickSet::Bullets
//!   - motion, homing, fuse, bounds -> PendingReturn + Detonation
//! tick_rail / rail_burn           TickSet::Bullets
//!        |
//! (combat plugin resolves collisions and detonations)
//!        |
//! return_to_pool_commit           TickSet::Cleanup
//!   - owner of the Inactive invariants
//! ```

use bevy::ecs::message::Messages;
use bevy::prelude::*;

use crate::common::state::{GameState, sim_active};
use crate::plugins::core::TickSet;

pub mod components;
pub mod messages;
pub mod registry;

pub mod allocator;
pub mod bullets;
pub mod commit;
pub mod fire;
pub mod pool;
pub mod rail;

pub use components::{Bullet, BulletPayload, BulletState, Pierce, PooledBullet, WeaponId};
pub use fire::{CurrentWeapon, WeaponCooldown};
pub use messages::{BulletSeed, Detonation, SpawnBulletRequest};
pub use rail::RailBeam;
pub use registry::{WeaponRegistry, WeaponSpec};

const BULLET_POOL_CAPACITY: usize = 256;

fn update_spawn_messages(mut msgs: ResMut<Messages<SpawnBulletRequest>>) {
    msgs.update();
}

fn update_detonation_messages(mut msgs: ResMut<Messages<Detonation>>) {
    msgs.update();
}

fn reset_weapon_state(mut cooldown: ResMut<WeaponCooldown>, mut rail: ResMut<RailBeam>) {
    *cooldown = WeaponCooldown::default();
    *rail = RailBeam::default();
}

pub struct WeaponsPlugin;

impl Plugin for WeaponsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(pool::BulletPool::new(BULLET_POOL_CAPACITY))
            .insert_resource(WeaponRegistry::default())
            .insert_resource(CurrentWeapon::default())
            .insert_resource(WeaponCooldown::default())
            .insert_resource(RailBeam::default())
            .add_systems(Startup, pool::init_bullet_pool);

        app.init_resource::<Messages<SpawnBulletRequest>>();
        app.init_resource::<Messages<Detonation>>();
        app.add_systems(PostUpdate, (update_spawn_messages, update_detonation_messages));

        app.add_systems(
            Update,
            fire::fire_weapon.in_set(TickSet::Fire).run_if(sim_active),
        );
        app.add_systems(
            Update,
            (
                allocator::allocate_bullets_from_pool,
                bullets::update_bullets,
                rail::tick_rail,
                rail::rail_burn,
            )
                .chain()
                .in_set(TickSet::Bullets)
                .run_if(sim_active),
        );
        app.add_systems(
            Update,
            commit::return_to_pool_commit.in_set(TickSet::Cleanup).run_if(sim_active),
        );

        app.add_systems(OnEnter(GameState::InGame), reset_weapon_state);
        app.add_systems(OnExit(GameState::InGame), pool::recall_all_bullets);
    }
}
