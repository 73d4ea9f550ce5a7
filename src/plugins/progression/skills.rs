//! Temporary effects and the activatable/passive skill set.
//!
//! Every buff is a plain millisecond countdown on [`ActiveEffects`]; nothing
//! here schedules wall-clock callbacks. The two activatable skills
//! (adrenaline, overcharge) feed the bonus bundle, so their start and expiry
//! transitions invalidate it. The plain power-up buffs (shield, speed, …)
//! are read directly by the systems that care and never touch the bundle.

use bevy::prelude::*;

use crate::common::tunables::Difficulty;
use crate::plugins::core::{FrameDt, RunStats};
use crate::plugins::feedback::{FeedbackHooks, NotifyTone};

use super::bonus::BonusDirty;
use super::persist::ProgressStore;

/// Countdown timers (ms) for every temporary effect in the run.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct ActiveEffects {
    pub shield_ms: f32,
    pub speed_ms: f32,
    pub double_coin_ms: f32,
    pub double_laser_ms: f32,
    pub time_freeze_ms: f32,
    pub adrenaline_ms: f32,
    pub overcharge_ms: f32,
}

impl ActiveEffects {
    #[inline]
    pub fn shield_up(&self) -> bool {
        self.shield_ms > 0.0
    }

    #[inline]
    pub fn speed_up(&self) -> bool {
        self.speed_ms > 0.0
    }

    #[inline]
    pub fn time_frozen(&self) -> bool {
        self.time_freeze_ms > 0.0
    }
}

pub const ADRENALINE_DURATION_MS: f32 = 5000.0;
pub const ADRENALINE_COOLDOWN_MS: f32 = 30_000.0;
pub const OVERCHARGE_DURATION_MS: f32 = 6000.0;
pub const OVERCHARGE_COOLDOWN_MS: f32 = 45_000.0;

/// Activation requests and cooldowns for the two combat skills.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SkillState {
    pub adrenaline_cd_ms: f32,
    pub overcharge_cd_ms: f32,
    pub adrenaline_requested: bool,
    pub overcharge_requested: bool,
}

pub fn tick_effects(
    dt: Res<FrameDt>,
    mut effects: ResMut<ActiveEffects>,
    mut dirty: ResMut<BonusDirty>,
) {
    let tick = |ms: &mut f32| {
        *ms = (*ms - dt.ms).max(0.0);
    };
    tick(&mut effects.shield_ms);
    tick(&mut effects.speed_ms);
    tick(&mut effects.double_coin_ms);
    tick(&mut effects.double_laser_ms);
    tick(&mut effects.time_freeze_ms);

    // Bundle-relevant effects: expiry is a resolver input transition.
    let adren_was = effects.adrenaline_ms > 0.0;
    let over_was = effects.overcharge_ms > 0.0;
    tick(&mut effects.adrenaline_ms);
    tick(&mut effects.overcharge_ms);
    if (adren_was && effects.adrenaline_ms == 0.0) || (over_was && effects.overcharge_ms == 0.0) {
        dirty.0 = true;
    }
}

pub fn tick_skills(
    dt: Res<FrameDt>,
    store: Res<ProgressStore>,
    mut state: ResMut<SkillState>,
    mut effects: ResMut<ActiveEffects>,
    mut dirty: ResMut<BonusDirty>,
    hooks: Res<FeedbackHooks>,
) {
    state.adrenaline_cd_ms = (state.adrenaline_cd_ms - dt.ms).max(0.0);
    state.overcharge_cd_ms = (state.overcharge_cd_ms - dt.ms).max(0.0);

    if state.adrenaline_requested {
        state.adrenaline_requested = false;
        if store.skills.adrenaline > 0 && state.adrenaline_cd_ms == 0.0 {
            effects.adrenaline_ms = ADRENALINE_DURATION_MS;
            state.adrenaline_cd_ms = ADRENALINE_COOLDOWN_MS;
            dirty.0 = true;
            hooks.notify("ADRENALINE", NotifyTone::Info);
        }
    }
    if state.overcharge_requested {
        state.overcharge_requested = false;
        if store.skills.overcharge > 0 && state.overcharge_cd_ms == 0.0 {
            effects.overcharge_ms = OVERCHARGE_DURATION_MS;
            state.overcharge_cd_ms = OVERCHARGE_COOLDOWN_MS;
            dirty.0 = true;
            hooks.notify("OVERCHARGE", NotifyTone::Gold);
        }
    }
}

/// Passive life regeneration: one life every `30s - 3s x level`, up to the
/// difficulty's life cap.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct RegenTimer {
    pub ms: f32,
}

pub fn regen_interval_ms(level: u8) -> f32 {
    30_000.0 - level as f32 * 3000.0
}

pub fn tick_regen(
    dt: Res<FrameDt>,
    store: Res<ProgressStore>,
    difficulty: Res<Difficulty>,
    mut timer: ResMut<RegenTimer>,
    mut stats: ResMut<RunStats>,
    hooks: Res<FeedbackHooks>,
) {
    let level = store.skills.regen;
    if level == 0 {
        return;
    }
    timer.ms += dt.ms;
    let interval = regen_interval_ms(level);
    if timer.ms < interval {
        return;
    }
    timer.ms -= interval;
    if stats.lives < difficulty.life_cap() {
        stats.lives += 1;
        hooks.notify("+1 LIFE", NotifyTone::Info);
    }
}
