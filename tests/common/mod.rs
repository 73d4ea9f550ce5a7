//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides the core ECS runtime and `Time`.
//! - `StatesPlugin` backs the game state machine.
//! - `configure_headless` installs the gameplay plugins without any
//!   window/render infrastructure.
//!
//! The app is driven deterministically: `TimeUpdateStrategy::ManualDuration`
//! pins every update to one 60 Hz step, so simulation frames are identical
//! regardless of wall clock.

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use nebula_strike::common::state::GameState;
use nebula_strike::plugins::core::SimRng;

pub fn app_headless() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    nebula_strike::game::configure_headless(&mut app);

    // Deterministic time steps and rolls for every flow test.
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_micros(16_667)));
    app.insert_resource(SimRng::seeded(0xACE5));
    app
}

/// Enter a run and settle the `OnEnter` systems.
pub fn start_run(app: &mut App) {
    app.world_mut().resource_mut::<NextState<GameState>>().set(GameState::InGame);
    app.update();
}

/// Advance one 60 Hz simulation frame.
pub fn tick(app: &mut App) {
    app.update();
}

pub fn tick_n(app: &mut App, frames: usize) {
    for _ in 0..frames {
        tick(app);
    }
}
