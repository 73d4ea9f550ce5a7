//! Power-ups: weighted drops, magnet attraction, collection effects, and
//! the bomb consumable.
//!
//! A power-up has no lifetime: once spawned it exists until it is collected
//! or falls past the bottom edge, and exactly one of those happens — this
//! plugin's collect/fall system is the only code that removes one.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use rand::Rng;
use rand::rngs::StdRng;

use crate::common::state::{GameState, sim_active};
use crate::common::tunables::{Difficulty, Playfield};
use crate::plugins::combat::components::{Extents, Hp, PendingDespawn};
use crate::plugins::core::{FrameDt, RunStats, SimRng, TickSet};
use crate::plugins::effects::{QualitySettings, VisualEffect, spawn_explosion};
use crate::plugins::enemies::components::{Enemy, EnemyKind};
use crate::plugins::feedback::{FeedbackHooks, HapticKind, NotifyTone, SoundKind};
use crate::plugins::player::{Player, PlayerInput};
use crate::plugins::progression::{ActiveEffects, BonusBundle};

pub const POWERUP_RADIUS: f32 = 15.0;
const POWERUP_FALL_SPEED: f32 = 0.65;
const MAGNET_PULL: f32 = 4.5;
const BOMB_BASE_COOLDOWN_MS: f32 = 8000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    Shield,
    Speed,
    Bomb,
    DoubleCoin,
    DoubleLaser,
    TimeFreeze,
    LifeSteal,
    Nuke,
}

/// Drop table: (kind, weight, rare). Weights are relative, rare only
/// changes presentation.
const DROP_TABLE: [(PowerUpKind, u32, bool); 8] = [
    (PowerUpKind::Shield, 22, false),
    (PowerUpKind::Speed, 20, false),
    (PowerUpKind::Bomb, 15, false),
    (PowerUpKind::DoubleCoin, 18, false),
    (PowerUpKind::DoubleLaser, 15, false),
    (PowerUpKind::TimeFreeze, 4, true),
    (PowerUpKind::LifeSteal, 4, true),
    (PowerUpKind::Nuke, 2, true),
];

#[derive(Component, Debug, Clone, Copy)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub rare: bool,
}

/// Bomb consumable stock, restocked from upgrades at run start.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct BombStock {
    pub count: u32,
    pub cooldown_ms: f32,
}

pub fn pick_kind(rng: &mut StdRng, forced: Option<PowerUpKind>) -> (PowerUpKind, bool) {
    if let Some(kind) = forced {
        let rare = DROP_TABLE.iter().find(|(k, ..)| *k == kind).map(|(.., r)| *r).unwrap_or(false);
        return (kind, rare);
    }
    let total: u32 = DROP_TABLE.iter().map(|(_, w, _)| w).sum();
    let mut r = rng.gen_range(0..total);
    for (kind, weight, rare) in DROP_TABLE {
        if r < weight {
            return (kind, rare);
        }
        r -= weight;
    }
    (PowerUpKind::Shield, false)
}

pub fn spawn_powerup(
    commands: &mut Commands,
    rng: &mut StdRng,
    pos: Vec2,
    forced: Option<PowerUpKind>,
) {
    let (kind, rare) = pick_kind(rng, forced);
    commands.spawn((
        Name::new(format!("PowerUp({kind:?})")),
        PowerUp { kind, rare },
        Sprite {
            color: kind_color(kind),
            custom_size: Some(Vec2::splat(POWERUP_RADIUS * 2.0)),
            ..default()
        },
        Transform::from_xyz(pos.x, pos.y, 3.5),
        DespawnOnExit(GameState::InGame),
    ));
}

fn kind_color(kind: PowerUpKind) -> Color {
    match kind {
        PowerUpKind::Shield => Color::srgb(0.0, 0.83, 1.0),
        PowerUpKind::Speed | PowerUpKind::DoubleCoin => Color::srgb(1.0, 0.84, 0.0),
        PowerUpKind::Bomb => Color::srgb(1.0, 0.42, 0.0),
        PowerUpKind::DoubleLaser => Color::srgb(0.0, 1.0, 1.0),
        PowerUpKind::TimeFreeze => Color::srgb(0.53, 0.93, 1.0),
        PowerUpKind::LifeSteal => Color::srgb(1.0, 0.27, 0.53),
        PowerUpKind::Nuke => Color::srgb(0.67, 1.0, 0.0),
    }
}

/// Fall, magnet attraction, collection and fall-off, in one owner system.
#[allow(clippy::too_many_arguments)]
pub fn update_powerups(
    mut commands: Commands,
    dt: Res<FrameDt>,
    field: Res<Playfield>,
    bundle: Res<BonusBundle>,
    difficulty: Res<Difficulty>,
    mut effects: ResMut<ActiveEffects>,
    mut stats: ResMut<RunStats>,
    mut bombs: ResMut<BombStock>,
    mut rng: ResMut<SimRng>,
    quality: Res<QualitySettings>,
    hooks: Res<FeedbackHooks>,
    q_player: Query<(&Transform, &Extents), With<Player>>,
    mut q_powerups: Query<(Entity, &PowerUp, &mut Transform), (Without<Player>, Without<Enemy>)>,
    mut q_enemies: Query<
        (Entity, &EnemyKind, &Transform, &mut Hp),
        (With<Enemy>, Without<PendingDespawn>, Without<Player>, Without<PowerUp>),
    >,
    q_visuals: Query<(), With<VisualEffect>>,
) {
    let Ok((player_tf, player_ext)) = q_player.single() else {
        return;
    };
    let player_pos = player_tf.translation.truncate();
    let steps = dt.steps();
    let mut live_visuals = q_visuals.iter().count();

    for (e, powerup, mut tf) in &mut q_powerups {
        let mut pos = tf.translation.truncate();

        if bundle.magnet_radius > 0.0 {
            let to_player = player_pos - pos;
            let dist = to_player.length();
            if dist > 0.0 && dist < bundle.magnet_radius {
                pos += to_player / dist * MAGNET_PULL * steps;
            }
        }
        pos.y += POWERUP_FALL_SPEED * steps;
        tf.translation.x = pos.x;
        tf.translation.y = pos.y;

        // Fall-off: the only other way a power-up leaves the field.
        if pos.y > field.height + POWERUP_RADIUS + 10.0 {
            commands.entity(e).despawn();
            continue;
        }

        let caught = (pos.x - player_pos.x).abs() < POWERUP_RADIUS + player_ext.hw
            && (pos.y - player_pos.y).abs() < POWERUP_RADIUS + player_ext.hh;
        if !caught {
            continue;
        }
        commands.entity(e).despawn();
        hooks.sound(SoundKind::Powerup);
        hooks.haptic(HapticKind::Light);

        match powerup.kind {
            PowerUpKind::Shield => {
                effects.shield_ms = 9000.0;
                hooks.notify("SHIELD UP", NotifyTone::Info);
            }
            PowerUpKind::Speed => {
                effects.speed_ms = 6000.0;
                hooks.notify("SPEED BOOST", NotifyTone::Info);
            }
            PowerUpKind::DoubleCoin => {
                effects.double_coin_ms = 10_000.0;
                hooks.notify("x2 COINS", NotifyTone::Gold);
            }
            PowerUpKind::DoubleLaser => {
                effects.double_laser_ms = 8000.0;
                hooks.notify("DOUBLE LASER", NotifyTone::Info);
            }
            PowerUpKind::TimeFreeze => {
                effects.time_freeze_ms = 5000.0;
                hooks.notify("TIME FREEZE", NotifyTone::LevelUp);
            }
            PowerUpKind::LifeSteal => {
                if stats.lives < difficulty.life_cap() {
                    stats.lives += 1;
                }
                hooks.notify("+1 LIFE", NotifyTone::Boss);
            }
            PowerUpKind::Bomb => {
                let swept = sweep_field(
                    &mut commands,
                    &mut q_enemies,
                    &mut rng.0,
                    &mut live_visuals,
                    quality.particle_budget,
                    Sweep { boss_hp_factor: 0.0, color: Color::srgb(1.0, 0.42, 0.0) },
                );
                stats.score += swept as u64 * 25;
                hooks.sound(SoundKind::Explode);
                hooks.notify(&format!("BOMB! +{}", swept as u64 * 25), NotifyTone::Gold);
            }
            PowerUpKind::Nuke => {
                let swept = sweep_field(
                    &mut commands,
                    &mut q_enemies,
                    &mut rng.0,
                    &mut live_visuals,
                    quality.particle_budget,
                    Sweep { boss_hp_factor: 0.3, color: Color::srgb(0.67, 1.0, 0.0) },
                );
                stats.score += swept as u64 * 50;
                hooks.sound(SoundKind::Explode);
                hooks.haptic(HapticKind::Heavy);
                hooks.notify(&format!("NUKE! +{}", swept as u64 * 50), NotifyTone::Boss);
            }
        }
    }

    // Bomb consumable: same sweep, triggered by input, on its own cooldown.
    bombs.cooldown_ms = (bombs.cooldown_ms - dt.ms).max(0.0);
}

struct Sweep {
    /// Bosses keep this fraction of current hp (0 = untouched by bombs,
    /// which instead leave bosses alone entirely).
    boss_hp_factor: f32,
    color: Color,
}

/// Destroy every regular enemy on the field. Destruction, not kills: flat
/// score only, no combo, coins or drops. Returns the number destroyed.
fn sweep_field(
    commands: &mut Commands,
    q_enemies: &mut Query<
        (Entity, &EnemyKind, &Transform, &mut Hp),
        (With<Enemy>, Without<PendingDespawn>, Without<Player>, Without<PowerUp>),
    >,
    rng: &mut StdRng,
    live_visuals: &mut usize,
    budget: usize,
    sweep: Sweep,
) -> usize {
    let mut swept = 0;
    for (e, kind, tf, mut hp) in q_enemies.iter_mut() {
        if kind.is_boss_like() {
            if sweep.boss_hp_factor > 0.0 {
                hp.hp = ((hp.hp as f32 * sweep.boss_hp_factor).floor() as i32).max(1);
            }
            continue;
        }
        spawn_explosion(
            commands,
            rng,
            live_visuals,
            budget,
            tf.translation.truncate(),
            sweep.color,
            20,
        );
        commands.entity(e).despawn();
        swept += 1;
    }
    swept
}

/// The keyboard/touch bomb button: consumes stock, sweeps the field.
#[allow(clippy::too_many_arguments)]
pub fn use_bomb(
    mut commands: Commands,
    mut input: ResMut<PlayerInput>,
    mut bombs: ResMut<BombStock>,
    bundle: Res<BonusBundle>,
    mut stats: ResMut<RunStats>,
    mut rng: ResMut<SimRng>,
    quality: Res<QualitySettings>,
    hooks: Res<FeedbackHooks>,
    mut q_enemies: Query<
        (Entity, &EnemyKind, &Transform, &mut Hp),
        (With<Enemy>, Without<PendingDespawn>, Without<Player>, Without<PowerUp>),
    >,
    q_visuals: Query<(), With<VisualEffect>>,
) {
    if !input.bomb_requested {
        return;
    }
    input.bomb_requested = false;
    if bombs.count == 0 || bombs.cooldown_ms > 0.0 {
        return;
    }
    bombs.count -= 1;
    bombs.cooldown_ms = BOMB_BASE_COOLDOWN_MS * bundle.bomb_cooldown_mult;

    let mut live_visuals = q_visuals.iter().count();
    let mut swept = 0;
    for (e, kind, tf, mut hp) in &mut q_enemies {
        if kind.is_boss_like() {
            // Stockpiled bombs bite bosses, scaled by the bomb upgrades.
            let keep = (0.6 / bundle.bomb_dmg_mult).clamp(0.1, 0.9);
            hp.hp = ((hp.hp as f32 * keep).floor() as i32).max(1);
            continue;
        }
        spawn_explosion(
            &mut commands,
            &mut rng.0,
            &mut live_visuals,
            quality.particle_budget,
            tf.translation.truncate(),
            Color::srgb(1.0, 0.42, 0.0),
            22,
        );
        commands.entity(e).despawn();
        swept += 1;
    }

    stats.score += swept as u64 * 30;
    hooks.sound(SoundKind::Explode);
    hooks.haptic(HapticKind::Heavy);
    hooks.notify(&format!("BOMB! +{}", swept as u64 * 30), NotifyTone::Gold);
}

fn reset_bombs(bundle: Res<BonusBundle>, mut bombs: ResMut<BombStock>) {
    *bombs = BombStock { count: bundle.start_bombs, cooldown_ms: 0.0 };
}

pub fn plugin(app: &mut App) {
    app.insert_resource(BombStock::default());

    app.add_systems(
        Update,
        (update_powerups, use_bomb)
            .chain()
            .in_set(TickSet::Powerups)
            .run_if(sim_active),
    );

    // After the progression reset so the freshly recomputed bundle is read.
    app.add_systems(
        OnEnter(GameState::InGame),
        reset_bombs.after(crate::plugins::progression::reset_progression),
    );
}
