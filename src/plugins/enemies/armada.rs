//! Armada set-piece: a grid of uniform enemies that flies into formation,
//! oscillates as one synchronized wave, and fires column salvos from its
//! vanguard units only.
//!
//! The whole formation shares one oscillation phase and one salvo cooldown.
//! A column's vanguard is its highest-row live unit; killing it promotes
//! the next row on the following tick with no per-unit bookkeeping.

use bevy::platform::collections::HashMap;
use bevy::prelude::*;
use rand::Rng;

use crate::common::tunables::{Difficulty, Playfield};
use crate::plugins::combat::components::{Extents, PendingDespawn};
use crate::plugins::core::{FrameDt, RunStats, SimRng};
use crate::plugins::effects::{HazardShot, spawn_boss_shot};
use crate::plugins::player::Player;
use crate::plugins::progression::{SetPiece, StageDirector};

use super::components::{ArmadaUnit, Enemy, EnemyBrain, EnemyKind};
use super::spawn::{EnemySeed, insert_enemy, scaled_hp};

pub const ARMADA_ROWS: u32 = 3;
const ARMADA_COL_SPACING: f32 = 60.0;
const ARMADA_ROW_SPACING: f32 = 46.0;
const ARMADA_TOP_Y: f32 = 90.0;
const ARMADA_WAVE_AMPLITUDE: f32 = 24.0;
const ARMADA_FLY_IN_SPEED: f32 = 2.2;

#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct ArmadaState {
    pub active: bool,
    /// Shared oscillation phase, radians.
    pub wave_phase: f32,
    /// One salvo cooldown for the whole formation.
    pub salvo_ms: f32,
}

/// Columns that fit the field, bounded to a sane set-piece size.
pub fn default_columns(field: &Playfield) -> u32 {
    ((field.width / 90.0) as u32).clamp(3, 7)
}

/// Spawn the full grid above the top edge. Units fly to their slots first;
/// oscillation starts per-unit as each arrives.
pub fn spawn_armada(
    commands: &mut Commands,
    state: &mut ArmadaState,
    field: &Playfield,
    difficulty: Difficulty,
    level: u32,
    cols: u32,
    rows: u32,
) {
    let cfg = difficulty.config();
    let center = field.width * 0.5;
    let hp = scaled_hp(1.2, level);

    for col in 0..cols {
        for row in 0..rows {
            let slot = Vec2::new(
                center + (col as f32 - (cols as f32 - 1.0) * 0.5) * ARMADA_COL_SPACING,
                ARMADA_TOP_Y + row as f32 * ARMADA_ROW_SPACING,
            );
            let e = insert_enemy(
                commands,
                EnemySeed {
                    kind: EnemyKind::Armada,
                    pos: Vec2::new(slot.x, -40.0 - row as f32 * 30.0),
                    extents: Extents::new(14.0, 12.0),
                    speed: cfg.enemy_speed,
                    hp,
                    brain: EnemyBrain::Armada,
                },
            );
            commands
                .entity(e)
                .insert(ArmadaUnit { col, row, slot, in_formation: false });
        }
    }

    state.active = true;
    state.wave_phase = 0.0;
    state.salvo_ms = salvo_interval(level);
}

fn salvo_interval(level: u32) -> f32 {
    (1400.0 - level as f32 * 10.0).max(700.0)
}

/// Consume a queued armada set-piece from the stage director.
pub fn launch_armada(
    mut commands: Commands,
    mut director: ResMut<StageDirector>,
    mut state: ResMut<ArmadaState>,
    field: Res<Playfield>,
    difficulty: Res<Difficulty>,
    stats: Res<RunStats>,
) {
    if director.pending != Some(SetPiece::Armada) || state.active {
        return;
    }
    director.pending = None;
    spawn_armada(
        &mut commands,
        &mut state,
        &field,
        *difficulty,
        stats.level,
        default_columns(&field),
        ARMADA_ROWS,
    );
}

pub fn update_armada(
    mut commands: Commands,
    dt: Res<FrameDt>,
    mut state: ResMut<ArmadaState>,
    stats: Res<RunStats>,
    mut rng: ResMut<SimRng>,
    effects: Res<crate::plugins::progression::ActiveEffects>,
    q_player: Query<&Transform, (With<Player>, Without<ArmadaUnit>)>,
    q_hazards: Query<(), With<HazardShot>>,
    mut q_units: Query<
        (&mut ArmadaUnit, &mut Transform, &Extents),
        (With<Enemy>, Without<PendingDespawn>, Without<Player>),
    >,
) {
    if !state.active || effects.time_frozen() {
        return;
    }
    let steps = dt.steps();
    state.wave_phase += dt.ms * 0.0012;

    for (mut unit, mut tf, _extents) in &mut q_units {
        if unit.in_formation {
            tf.translation.x = unit.slot.x + state.wave_phase.sin() * ARMADA_WAVE_AMPLITUDE;
            tf.translation.y = unit.slot.y;
        } else {
            let pos = tf.translation.truncate();
            let to_slot = unit.slot - pos;
            let step = ARMADA_FLY_IN_SPEED * steps;
            if to_slot.length() <= step {
                tf.translation.x = unit.slot.x;
                tf.translation.y = unit.slot.y;
                unit.in_formation = true;
            } else {
                let dir = to_slot.normalize_or_zero();
                tf.translation.x += dir.x * step;
                tf.translation.y += dir.y * step;
            }
        }
    }

    // Salvo: one shared cooldown; only each column's vanguard fires.
    state.salvo_ms -= dt.ms;
    if state.salvo_ms > 0.0 {
        return;
    }
    state.salvo_ms = salvo_interval(stats.level);

    let mut vanguard: HashMap<u32, (u32, Vec2)> = HashMap::default();
    for (unit, tf, extents) in &q_units {
        if !unit.in_formation {
            continue;
        }
        let muzzle = tf.translation.truncate() + Vec2::new(0.0, extents.hh);
        match vanguard.get(&unit.col) {
            Some((row, _)) if *row >= unit.row => {}
            _ => {
                vanguard.insert(unit.col, (unit.row, muzzle));
            }
        }
    }

    let player_x = q_player.single().map(|tf| tf.translation.x).ok();
    let mut live_hazards = q_hazards.iter().count();
    for (_, muzzle) in vanguard.values() {
        // Mild aim spread keeps the wall dodgeable.
        let aim_x = player_x.unwrap_or(muzzle.x) + rng.0.gen_range(-20.0..20.0);
        let vx = ((aim_x - muzzle.x) * 0.004).clamp(-0.8, 0.8);
        spawn_boss_shot(
            &mut commands,
            &mut live_hazards,
            *muzzle,
            Vec2::new(vx, 2.5 + stats.level as f32 * 0.04),
            Color::srgb(0.92, 0.45, 0.85),
            8.0,
        );
    }
}

/// Clear the armada-active flag once every unit is gone, releasing regular
/// spawning and mini-boss rolls.
pub fn armada_bookkeeping(mut state: ResMut<ArmadaState>, q_units: Query<(), With<ArmadaUnit>>) {
    if state.active && q_units.is_empty() {
        state.active = false;
    }
}
