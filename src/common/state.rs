//! Global state machine.
//!
//! Pausing is a separate `Paused` resource rather than a state: leaving
//! `InGame` tears down every run-scoped entity (`DespawnOnExit`), and a pause
//! must freeze the simulation without destroying it. Gameplay systems gate on
//! [`sim_active`], so a paused frame runs no tick systems at all — timers are
//! plain countdowns and simply stop.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Menu,
    InGame,
    GameOver,
}

/// Set to freeze the whole simulation tick without leaving `InGame`.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct Paused(pub bool);

/// Run condition for every gameplay system: in a run and not paused.
pub fn sim_active(state: Res<State<GameState>>, paused: Res<Paused>) -> bool {
    *state.get() == GameState::InGame && !paused.0
}
