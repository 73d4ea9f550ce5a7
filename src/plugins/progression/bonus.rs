//! Derived-stat resolution: upgrade levels + skills + temporary effects
//! flatten into one [`BonusBundle`].
//!
//! The bundle is a cached resource. Systems read it every frame; it is only
//! recomputed after an explicit invalidation (upgrade purchase, skill change,
//! temporary-effect transition). `compute_bonus` itself is a pure function —
//! equal inputs always produce an equal bundle.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::skills::ActiveEffects;

/// Persistent upgrade levels, one counter per shop entry.
///
/// `serde(default)` makes a corrupted or partial save decode field-by-field
/// into zeros instead of failing the whole snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeLevels {
    // Weapon
    pub damage: u8,
    pub firerate: u8,
    pub bulletspd: u8,
    pub multishot: u8,
    pub crit: u8,
    pub pierce: u8,
    // Laser
    pub laser_width: u8,
    pub laser_beam: u8,
    // Rocket
    pub rocket_dmg: u8,
    pub rocket_spd: u8,
    pub rocket_split: u8,
    // Shotgun
    pub shot_pellets: u8,
    pub shot_spread: u8,
    pub shot_pierce: u8,
    // Bombs
    pub bombcount: u8,
    pub bombdmg: u8,
    pub bombcool: u8,
    // Defense
    pub shield: u8,
    pub dodge: u8,
    pub dodgespd: u8,
    pub invtime: u8,
    pub extra_life: u8,
    // Support
    pub magnet: u8,
    pub coinboost: u8,
    pub xpboost: u8,
    pub luck_drop: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpgradeId {
    Damage,
    Firerate,
    BulletSpd,
    Multishot,
    Crit,
    Pierce,
    LaserWidth,
    LaserBeam,
    RocketDmg,
    RocketSpd,
    RocketSplit,
    ShotPellets,
    ShotSpread,
    ShotPierce,
    BombCount,
    BombDmg,
    BombCool,
    Shield,
    Dodge,
    DodgeSpd,
    InvTime,
    ExtraLife,
    Magnet,
    CoinBoost,
    XpBoost,
    LuckDrop,
}

/// Shop metadata: level cap, base cost, cost growth, prerequisite.
#[derive(Debug, Clone, Copy)]
pub struct UpgradeDef {
    pub max: u8,
    pub base_cost: u64,
    pub cost_mult: f32,
    pub req: Option<(UpgradeId, u8)>,
}

pub fn upgrade_def(id: UpgradeId) -> UpgradeDef {
    use UpgradeId::*;
    let def = |max, base_cost, cost_mult, req| UpgradeDef { max, base_cost, cost_mult, req };
    match id {
        Damage => def(7, 180, 2.0, None),
        Firerate => def(7, 250, 2.2, None),
        BulletSpd => def(5, 160, 1.9, Some((Damage, 2))),
        Multishot => def(3, 550, 2.8, Some((Firerate, 3))),
        Crit => def(4, 400, 2.5, Some((Damage, 3))),
        Pierce => def(3, 500, 2.6, Some((BulletSpd, 2))),
        LaserWidth => def(4, 220, 2.1, None),
        LaserBeam => def(3, 600, 2.8, Some((LaserWidth, 2))),
        RocketDmg => def(5, 280, 2.2, None),
        RocketSpd => def(3, 350, 2.3, Some((RocketDmg, 1))),
        RocketSplit => def(2, 700, 3.0, Some((RocketDmg, 3))),
        ShotPellets => def(4, 200, 2.0, None),
        ShotSpread => def(3, 300, 2.2, Some((ShotPellets, 1))),
        ShotPierce => def(3, 450, 2.5, Some((ShotPellets, 2))),
        BombCount => def(5, 350, 2.3, None),
        BombDmg => def(4, 450, 2.5, Some((BombCount, 1))),
        BombCool => def(3, 700, 2.8, Some((BombDmg, 2))),
        Shield => def(3, 500, 2.8, None),
        Dodge => def(4, 400, 2.4, None),
        DodgeSpd => def(3, 550, 2.6, Some((Dodge, 2))),
        InvTime => def(3, 600, 2.7, Some((Shield, 1))),
        ExtraLife => def(2, 900, 3.5, Some((Shield, 2))),
        Magnet => def(4, 350, 2.3, None),
        CoinBoost => def(4, 300, 2.2, None),
        XpBoost => def(3, 450, 2.4, Some((CoinBoost, 2))),
        LuckDrop => def(3, 380, 2.3, Some((Magnet, 2))),
    }
}

impl UpgradeLevels {
    pub fn level(&self, id: UpgradeId) -> u8 {
        use UpgradeId::*;
        match id {
            Damage => self.damage,
            Firerate => self.firerate,
            BulletSpd => self.bulletspd,
            Multishot => self.multishot,
            Crit => self.crit,
            Pierce => self.pierce,
            LaserWidth => self.laser_width,
            LaserBeam => self.laser_beam,
            RocketDmg => self.rocket_dmg,
            RocketSpd => self.rocket_spd,
            RocketSplit => self.rocket_split,
            ShotPellets => self.shot_pellets,
            ShotSpread => self.shot_spread,
            ShotPierce => self.shot_pierce,
            BombCount => self.bombcount,
            BombDmg => self.bombdmg,
            BombCool => self.bombcool,
            Shield => self.shield,
            Dodge => self.dodge,
            DodgeSpd => self.dodgespd,
            InvTime => self.invtime,
            ExtraLife => self.extra_life,
            Magnet => self.magnet,
            CoinBoost => self.coinboost,
            XpBoost => self.xpboost,
            LuckDrop => self.luck_drop,
        }
    }

    fn level_mut(&mut self, id: UpgradeId) -> &mut u8 {
        use UpgradeId::*;
        match id {
            Damage => &mut self.damage,
            Firerate => &mut self.firerate,
            BulletSpd => &mut self.bulletspd,
            Multishot => &mut self.multishot,
            Crit => &mut self.crit,
            Pierce => &mut self.pierce,
            LaserWidth => &mut self.laser_width,
            LaserBeam => &mut self.laser_beam,
            RocketDmg => &mut self.rocket_dmg,
            RocketSpd => &mut self.rocket_spd,
            RocketSplit => &mut self.rocket_split,
            ShotPellets => &mut self.shot_pellets,
            ShotSpread => &mut self.shot_spread,
            ShotPierce => &mut self.shot_pierce,
            BombCount => &mut self.bombcount,
            BombDmg => &mut self.bombdmg,
            BombCool => &mut self.bombcool,
            Shield => &mut self.shield,
            Dodge => &mut self.dodge,
            DodgeSpd => &mut self.dodgespd,
            InvTime => &mut self.invtime,
            ExtraLife => &mut self.extra_life,
            Magnet => &mut self.magnet,
            CoinBoost => &mut self.coinboost,
            XpBoost => &mut self.xpboost,
            LuckDrop => &mut self.luck_drop,
        }
    }

    pub fn cost(&self, id: UpgradeId) -> u64 {
        let def = upgrade_def(id);
        (def.base_cost as f32 * def.cost_mult.powi(self.level(id) as i32)).floor() as u64
    }

    pub fn requirement_met(&self, id: UpgradeId) -> bool {
        match upgrade_def(id).req {
            Some((req_id, req_lvl)) => self.level(req_id) >= req_lvl,
            None => true,
        }
    }

    /// Attempt a purchase against a coin wallet. On success the caller must
    /// invalidate the bonus bundle.
    pub fn try_purchase(&mut self, id: UpgradeId, coins: &mut u64) -> bool {
        let def = upgrade_def(id);
        let cost = self.cost(id);
        if self.level(id) >= def.max || !self.requirement_met(id) || *coins < cost {
            return false;
        }
        *coins -= cost;
        *self.level_mut(id) += 1;
        true
    }
}

/// Learnable skill levels. Regen and vampirism are passive; adrenaline and
/// overcharge are activatable with their own cooldowns.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillLevels {
    pub regen: u8,
    pub vampirism: u8,
    pub adrenaline: u8,
    pub overcharge: u8,
}

impl SkillLevels {
    pub const MAX_LEVEL: u8 = 3;

    pub fn total(&self) -> u32 {
        self.regen as u32 + self.vampirism as u32 + self.adrenaline as u32 + self.overcharge as u32
    }
}

/// Flat snapshot of every multiplicative/additive effect the simulation
/// reads. Never constructed ad hoc — always through [`compute_bonus`].
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct BonusBundle {
    pub damage_mult: f32,
    pub firerate_mult: f32,
    pub bullet_speed_mult: f32,
    pub has_start_shield: bool,
    pub magnet_radius: f32,
    pub coin_mult: f32,
    pub xp_mult: f32,
    pub dodge_chance: f32,
    pub move_speed_mult: f32,
    pub invincible_bonus_ms: f32,
    pub start_bombs: u32,
    pub bomb_dmg_mult: f32,
    pub bomb_cooldown_mult: f32,
    pub multishot: u32,
    pub extra_life: i32,
    pub crit_chance: f32,
    pub crit_mult: f32,
    pub pierce_count: u32,
    pub laser_width_mult: f32,
    pub laser_beam_level: u8,
    pub rocket_dmg_mult: f32,
    pub rocket_spd_mult: f32,
    pub rocket_split: u8,
    pub shot_pellets: u32,
    pub shot_spread_mult: f32,
    pub shot_pierce: bool,
    pub drop_luck_mult: f32,
    pub vampirism_chance: f32,
    pub regen_level: u8,
}

impl Default for BonusBundle {
    fn default() -> Self {
        compute_bonus(
            &UpgradeLevels::default(),
            &SkillLevels::default(),
            &ActiveEffects::default(),
        )
    }
}

/// Pure resolver. Temporary skill effects fold in here so the rest of the
/// simulation never special-cases them: adrenaline halves the fire cooldown,
/// overcharge doubles damage, both for as long as their countdown runs.
pub fn compute_bonus(
    upgrades: &UpgradeLevels,
    skills: &SkillLevels,
    effects: &ActiveEffects,
) -> BonusBundle {
    let mut damage_mult = 1.0 + upgrades.damage as f32 * 0.25;
    let mut firerate_mult = 1.0 - upgrades.firerate as f32 * 0.08;
    if effects.adrenaline_ms > 0.0 {
        firerate_mult *= 0.5;
    }
    if effects.overcharge_ms > 0.0 {
        damage_mult *= 2.0;
    }

    BonusBundle {
        damage_mult,
        firerate_mult,
        bullet_speed_mult: 1.0 + upgrades.bulletspd as f32 * 0.15,
        has_start_shield: upgrades.shield > 0,
        magnet_radius: upgrades.magnet as f32 * 55.0,
        coin_mult: 1.0 + upgrades.coinboost as f32 * 0.20,
        xp_mult: 1.0 + upgrades.xpboost as f32 * 0.25,
        dodge_chance: upgrades.dodge as f32 * 0.08,
        move_speed_mult: 1.0 + upgrades.dodgespd as f32 * 0.12,
        invincible_bonus_ms: upgrades.invtime as f32 * 500.0,
        start_bombs: upgrades.bombcount as u32,
        bomb_dmg_mult: 1.0 + upgrades.bombdmg as f32 * 0.30,
        bomb_cooldown_mult: 1.0 - upgrades.bombcool as f32 * 0.25,
        multishot: upgrades.multishot as u32,
        extra_life: upgrades.extra_life as i32,
        crit_chance: upgrades.crit as f32 * 0.10,
        crit_mult: 2.5,
        pierce_count: upgrades.pierce as u32,
        laser_width_mult: 1.0 + upgrades.laser_width as f32 * 0.20,
        laser_beam_level: upgrades.laser_beam,
        rocket_dmg_mult: 1.0 + upgrades.rocket_dmg as f32 * 0.40,
        rocket_spd_mult: 1.0 + upgrades.rocket_spd as f32 * 0.25,
        rocket_split: upgrades.rocket_split,
        shot_pellets: 7 + upgrades.shot_pellets as u32 * 2,
        shot_spread_mult: 1.0 + upgrades.shot_spread as f32 * 0.15,
        shot_pierce: upgrades.shot_pierce > 0,
        drop_luck_mult: 1.0 + upgrades.luck_drop as f32 * 0.15,
        vampirism_chance: skills.vampirism as f32 * 0.04,
        regen_level: skills.regen,
    }
}

/// Invalidation latch. Anything that changes the resolver's inputs flips
/// this; the refresh system recomputes the bundle at the next frame boundary.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct BonusDirty(pub bool);

pub fn refresh_bonus(
    mut dirty: ResMut<BonusDirty>,
    store: Res<super::persist::ProgressStore>,
    effects: Res<ActiveEffects>,
    mut bundle: ResMut<BonusBundle>,
) {
    if !dirty.0 {
        return;
    }
    dirty.0 = false;
    *bundle = compute_bonus(&store.upgrades, &store.skills, &effects);
}
