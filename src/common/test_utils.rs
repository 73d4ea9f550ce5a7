//! Test helpers.
//!
//! Unit tests drive individual systems against a bare `World` through
//! `World::run_system_once` instead of building a full schedule. Systems that
//! use `Commands` enqueue structural changes, so we flush the world after the
//! run to apply them before any assertion.

use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::prelude::*;

use crate::plugins::core::FrameDt;

/// Run a system once on the given world, then flush deferred commands.
/// Returns the system output.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

/// Insert a clamped frame delta, in milliseconds, as if sampled from `Time`.
/// `1000.0 / 60.0` gives one nominal 60 Hz step.
pub fn set_frame_dt(world: &mut World, ms: f32) {
    world.insert_resource(FrameDt { ms });
}
