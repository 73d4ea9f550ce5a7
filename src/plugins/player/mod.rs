//! Player plugin.
//!
//! Pipeline per tick:
//! - Input: sample keyboard (when present) into the `PlayerInput` resource;
//!   a touch layer writes `target_x` into the same resource from outside.
//! - Input: apply movement — smoothed follow toward `target_x`, plus
//!   keyboard axis, clamped to the play-field.
//! - Timers: wind down the invincibility window.
//! - Damage: consume `PlayerHit` messages through the one damage path:
//!   dodge roll, then shield (half-duration invincibility), then a life.
//!
//! No other system may subtract lives. Hazard and contact passes only write
//! `PlayerHit` intent.

use bevy::ecs::message::{MessageReader, Messages};
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use rand::Rng;

use crate::common::state::{GameState, sim_active};
use crate::common::tunables::{INVINCIBLE_MS, Playfield};
use crate::plugins::combat::components::Extents;
use crate::plugins::core::{FrameDt, RunStats, SimRng, TickSet};
use crate::plugins::effects::{QualitySettings, VisualEffect, spawn_explosion};
use crate::plugins::feedback::{FeedbackHooks, HapticKind, NotifyTone, SoundKind};
use crate::plugins::progression::{ActiveEffects, BonusBundle, SkillState};

pub const PLAYER_HALF: f32 = 22.0;

#[derive(Component)]
pub struct Player;

/// A damage attempt against the player. Sources only describe the hit; the
/// consumer decides what it costs.
#[derive(Message, Debug, Clone, Copy)]
pub struct PlayerHit {
    pub at: Vec2,
}

#[derive(Resource, Debug)]
pub struct PlayerInput {
    /// Keyboard axis in [-1, 1].
    pub move_axis: f32,
    /// Touch-follow target; the UI layer writes this directly.
    pub target_x: Option<f32>,
    /// Manual fire held (ignored while auto-fire is on).
    pub firing: bool,
    pub auto_fire: bool,
    pub bomb_requested: bool,
}

impl Default for PlayerInput {
    fn default() -> Self {
        Self {
            move_axis: 0.0,
            target_x: None,
            firing: false,
            auto_fire: true,
            bomb_requested: false,
        }
    }
}

/// Post-hit invincibility countdown, ms.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct Invulnerability {
    pub ms: f32,
}

pub fn plugin(app: &mut App) {
    app.insert_resource(PlayerInput::default())
        .insert_resource(Invulnerability::default());

    app.init_resource::<Messages<PlayerHit>>();
    app.add_systems(PostUpdate, update_player_hit_messages);

    app.add_systems(OnEnter(GameState::InGame), (spawn, reset_player_state));
    app.add_systems(
        Update,
        (gather_input, apply_movement)
            .chain()
            .in_set(TickSet::Input)
            .run_if(sim_active),
    );
    app.add_systems(
        Update,
        tick_invulnerability.in_set(TickSet::Timers).run_if(sim_active),
    );
    app.add_systems(
        Update,
        apply_player_damage.in_set(TickSet::Damage).run_if(sim_active),
    );
}

fn update_player_hit_messages(mut msgs: ResMut<Messages<PlayerHit>>) {
    msgs.update();
}

/// Fresh-run state. Auto-fire is a persistent preference and survives.
fn reset_player_state(mut invuln: ResMut<Invulnerability>, mut input: ResMut<PlayerInput>) {
    invuln.ms = 0.0;
    input.move_axis = 0.0;
    input.target_x = None;
    input.firing = false;
    input.bomb_requested = false;
}

fn spawn(mut commands: Commands, field: Res<Playfield>) {
    commands.spawn((
        Name::new("Player"),
        Player,
        Extents::new(PLAYER_HALF, PLAYER_HALF),
        Sprite {
            color: Color::srgb(0.0, 1.0, 0.53),
            custom_size: Some(Vec2::splat(PLAYER_HALF * 2.0)),
            ..default()
        },
        Transform::from_xyz(field.width * 0.5, field.height - 110.0, 1.0),
        DespawnOnExit(GameState::InGame),
    ));
}

fn gather_input(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut input: ResMut<PlayerInput>,
    mut skills: ResMut<SkillState>,
) {
    // Headless apps have no input plugin; touch/target_x still works because
    // the UI layer writes the resource directly.
    let Some(keys) = keys else {
        return;
    };

    let mut axis = 0.0;
    if keys.pressed(KeyCode::ArrowLeft) || keys.pressed(KeyCode::KeyA) {
        axis -= 1.0;
    }
    if keys.pressed(KeyCode::ArrowRight) || keys.pressed(KeyCode::KeyD) {
        axis += 1.0;
    }
    input.move_axis = axis;
    input.firing = keys.pressed(KeyCode::Space);

    if keys.just_pressed(KeyCode::KeyB) {
        input.bomb_requested = true;
    }
    if keys.just_pressed(KeyCode::Digit1) {
        skills.adrenaline_requested = true;
    }
    if keys.just_pressed(KeyCode::Digit2) {
        skills.overcharge_requested = true;
    }
}

fn apply_movement(
    dt: Res<FrameDt>,
    field: Res<Playfield>,
    input: Res<PlayerInput>,
    effects: Res<ActiveEffects>,
    bundle: Res<BonusBundle>,
    mut q_player: Query<(&mut Transform, &Extents), With<Player>>,
) {
    let Ok((mut tf, extents)) = q_player.single_mut() else {
        return;
    };
    let steps = dt.steps();

    if let Some(target_x) = input.target_x {
        let blend = (0.2 * steps).min(1.0);
        tf.translation.x += (target_x - tf.translation.x) * blend;
    }

    let base = if effects.speed_up() { 9.0 } else { 6.0 };
    tf.translation.x += input.move_axis * base * bundle.move_speed_mult * steps;

    tf.translation.x = tf.translation.x.clamp(extents.hw, field.width - extents.hw);
}

fn tick_invulnerability(dt: Res<FrameDt>, mut invuln: ResMut<Invulnerability>) {
    invuln.ms = (invuln.ms - dt.ms).max(0.0);
}

/// The single authority over player lives.
#[allow(clippy::too_many_arguments)]
fn apply_player_damage(
    mut commands: Commands,
    mut hits: MessageReader<PlayerHit>,
    mut rng: ResMut<SimRng>,
    mut invuln: ResMut<Invulnerability>,
    mut effects: ResMut<ActiveEffects>,
    mut stats: ResMut<RunStats>,
    bundle: Res<BonusBundle>,
    quality: Res<QualitySettings>,
    hooks: Res<FeedbackHooks>,
    q_player: Query<&Transform, With<Player>>,
    q_visuals: Query<(), With<VisualEffect>>,
    mut next: ResMut<NextState<GameState>>,
) {
    let Ok(player_tf) = q_player.single() else {
        return;
    };
    let player_pos = player_tf.translation.truncate();
    let mut live_visuals = q_visuals.iter().count();

    for _hit in hits.read() {
        if invuln.ms > 0.0 {
            continue;
        }

        if bundle.dodge_chance > 0.0 && rng.0.gen_range(0.0..1.0) < bundle.dodge_chance {
            hooks.notify("DODGED", NotifyTone::Info);
            spawn_explosion(
                &mut commands,
                &mut rng.0,
                &mut live_visuals,
                quality.particle_budget,
                player_pos,
                Color::srgb(0.53, 0.93, 1.0),
                8,
            );
            continue;
        }

        if effects.shield_up() {
            effects.shield_ms = 0.0;
            hooks.notify("SHIELD DOWN", NotifyTone::Info);
            spawn_explosion(
                &mut commands,
                &mut rng.0,
                &mut live_visuals,
                quality.particle_budget,
                player_pos,
                Color::srgb(0.0, 0.83, 1.0),
                15,
            );
            invuln.ms = (INVINCIBLE_MS + bundle.invincible_bonus_ms) * 0.5;
            continue;
        }

        stats.lives -= 1;
        hooks.sound(SoundKind::Hit);
        hooks.haptic(HapticKind::Heavy);
        spawn_explosion(
            &mut commands,
            &mut rng.0,
            &mut live_visuals,
            quality.particle_budget,
            player_pos,
            Color::srgb(1.0, 0.13, 0.5),
            20,
        );
        invuln.ms = INVINCIBLE_MS + bundle.invincible_bonus_ms;

        if stats.lives <= 0 {
            next.set(GameState::GameOver);
            return;
        }
    }
}

#[cfg(test)]
mod tests;
