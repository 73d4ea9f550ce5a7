//! Feature plugins.

use bevy::prelude::*;

use crate::plugins::weapons::WeaponsPlugin;

pub mod bosses;
pub mod combat;
pub mod core;
pub mod effects;
pub mod enemies;
pub mod feedback;
pub mod player;
pub mod powerups;
pub mod progression;
pub mod weapons;

/// Register the gameplay plugins. This set is renderer-free and runs under
/// `MinimalPlugins` in headless integration tests.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    feedback::plugin(app);
    progression::plugin(app);
    player::plugin(app);
    enemies::plugin(app);
    bosses::plugin(app);
    combat::plugin(app);
    powerups::plugin(app);
    effects::plugin(app);
    app.add_plugins(WeaponsPlugin);
}
