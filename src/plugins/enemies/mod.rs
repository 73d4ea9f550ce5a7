//! Enemies plugin: the behavior state machine, spawning and the armada.
//!
//! Facts live in components (`EnemyKind`, `EnemyBrain`, `Hp`, `Extents`);
//! rules mutate them in predictable places: the behavior switch moves and
//! attacks, the combat plugin damages, the kill path removes. This plugin
//! never awards rewards — an enemy leaving through the bottom edge is the
//! only removal it performs, and that one is deliberately reward-free.

use bevy::prelude::*;

use crate::common::state::{GameState, sim_active};
use crate::plugins::core::TickSet;

pub mod armada;
pub mod behavior;
pub mod components;
pub mod spawn;

pub use armada::{ArmadaState, spawn_armada};
pub use components::{ArmadaUnit, Enemy, EnemyBrain, EnemyKind, MoveSpeed, kind_config};
pub use spawn::{EnemySeed, insert_enemy, spawn_splitter_fragments};

pub fn plugin(app: &mut App) {
    app.insert_resource(ArmadaState::default());

    app.add_systems(
        Update,
        (behavior::update_enemies, armada::update_armada, spawn::cull_offfield)
            .chain()
            .in_set(TickSet::Enemies)
            .run_if(sim_active),
    );

    app.add_systems(
        Update,
        (spawn::maybe_spawn_regular, armada::launch_armada, armada::armada_bookkeeping)
            .chain()
            .in_set(TickSet::Spawn)
            .run_if(sim_active),
    );

    app.add_systems(
        OnEnter(GameState::InGame),
        |mut armada: ResMut<ArmadaState>| *armada = ArmadaState::default(),
    );
}

#[cfg(test)]
mod tests;
