//! Combat plugin: spatial partitioning, collision resolution, the player
//! damage intent passes, and the kill path.

use bevy::prelude::*;

use crate::common::state::{GameState, sim_active};
use crate::plugins::core::TickSet;

pub mod components;
pub mod grid;
pub mod kill;
pub mod resolve;

pub use components::{Extents, Hp, PendingDespawn, Velocity};
pub use grid::{GRID_ROWS, SpatialGrid};
pub use kill::{COMBO_IDLE_MS, COMBO_MAX, Combo};

pub fn plugin(app: &mut App) {
    app.insert_resource(SpatialGrid::default()).insert_resource(Combo::default());

    app.add_systems(
        Update,
        kill::tick_combo.in_set(TickSet::Timers).run_if(sim_active),
    );
    app.add_systems(
        Update,
        grid::rebuild_grid.in_set(TickSet::Grid).run_if(sim_active),
    );
    app.add_systems(
        Update,
        (
            resolve::collide_bullets,
            resolve::apply_detonations,
            resolve::hazards_vs_player,
            resolve::enemies_contact_player,
        )
            .chain()
            .in_set(TickSet::Collide)
            .run_if(sim_active),
    );
    app.add_systems(
        Update,
        kill::process_kills.in_set(TickSet::Kill).run_if(sim_active),
    );
    app.add_systems(
        Update,
        kill::despawn_marked.in_set(TickSet::Cleanup).run_if(sim_active),
    );

    app.add_systems(
        OnEnter(GameState::InGame),
        |mut combo: ResMut<Combo>| *combo = Combo::default(),
    );
    app.add_systems(
        OnExit(GameState::InGame),
        kill::finalize_run.before(crate::plugins::progression::persist::force_save),
    );
}

#[cfg(test)]
mod tests;
