use bevy::prelude::*;

#[derive(Component)]
pub struct Enemy;

/// Movement rate in pixels per 60 Hz frame, fixed at spawn.
#[derive(Component, Debug, Clone, Copy)]
pub struct MoveSpeed(pub f32);

/// Behavior tag. Bosses and mini-bosses keep the tag for cheap filtering
/// (rail exclusion, contact rules) but their AI lives in the boss registry.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Plain,
    Fast,
    Zigzag,
    Tank,
    Swarm,
    Shooter,
    Bomber,
    Splitter,
    Dasher,
    Stealth,
    Shielder,
    Teleporter,
    Leech,
    Mirror,
    Kamikaze,
    Phantom,
    Titan,
    Assassin,
    Armada,
    MiniBoss,
    Boss,
}

impl EnemyKind {
    #[inline]
    pub fn is_boss_like(self) -> bool {
        matches!(self, EnemyKind::Boss | EnemyKind::MiniBoss)
    }
}

/// Per-kind mutable state. Only the fields a kind actually uses exist on its
/// variant; the behavior switch matches on this, not on stringly data.
#[derive(Component, Debug, Clone, PartialEq)]
pub enum EnemyBrain {
    Plain,
    Fast,
    Zigzag { phase: f32 },
    Tank,
    Swarm { phase: f32 },
    Shooter { shoot_ms: f32 },
    Bomber { drop_ms: f32 },
    Splitter,
    Dasher { pause_ms: f32, dash_ms: f32 },
    Stealth { cycle_ms: f32, alpha: f32 },
    Shielder { charges: u8 },
    Teleporter { blink_ms: f32 },
    Leech { regen_ms: f32 },
    Mirror { last_player_x: f32 },
    Kamikaze,
    Phantom { cycle_ms: f32, intangible: bool },
    Titan,
    Assassin { dash_ms: f32 },
    Armada,
    /// AI delegated to the mini-boss registry.
    MiniBoss,
    /// AI delegated to the boss registry.
    Boss,
}

impl EnemyBrain {
    /// Energy-shield charges, if this enemy carries a shield. The collision
    /// pass consumes charges before any hp damage.
    #[inline]
    pub fn shield_charges_mut(&mut self) -> Option<&mut u8> {
        match self {
            EnemyBrain::Shielder { charges } => Some(charges),
            _ => None,
        }
    }

    /// True while the enemy phases through direct fire.
    #[inline]
    pub fn is_intangible(&self) -> bool {
        matches!(self, EnemyBrain::Phantom { intangible: true, .. })
    }
}

/// One armada grid slot. `row` grows toward the player; the highest live
/// row in a column is that column's vanguard.
#[derive(Component, Debug, Clone, Copy)]
pub struct ArmadaUnit {
    pub col: u32,
    pub row: u32,
    pub slot: Vec2,
    pub in_formation: bool,
}

/// Static spawn parameters for the regular (non-set-piece) kinds.
#[derive(Debug, Clone, Copy)]
pub struct KindConfig {
    pub hw: f32,
    pub hh: f32,
    pub hp_factor: f32,
    pub speed_factor: f32,
    /// Kill reward base, fed into score and mission XP.
    pub xp: u32,
    pub weight: u32,
    pub min_level: u32,
}

/// Kinds eligible for the regular spawn roll, cheapest first.
pub const SPAWNABLE_KINDS: [EnemyKind; 18] = [
    EnemyKind::Plain,
    EnemyKind::Fast,
    EnemyKind::Zigzag,
    EnemyKind::Tank,
    EnemyKind::Swarm,
    EnemyKind::Shooter,
    EnemyKind::Bomber,
    EnemyKind::Splitter,
    EnemyKind::Dasher,
    EnemyKind::Stealth,
    EnemyKind::Shielder,
    EnemyKind::Teleporter,
    EnemyKind::Leech,
    EnemyKind::Mirror,
    EnemyKind::Kamikaze,
    EnemyKind::Phantom,
    EnemyKind::Titan,
    EnemyKind::Assassin,
];

pub fn kind_config(kind: EnemyKind) -> KindConfig {
    let cfg = |hw, hh, hp_factor, speed_factor, xp, weight, min_level| KindConfig {
        hw,
        hh,
        hp_factor,
        speed_factor,
        xp,
        weight,
        min_level,
    };
    match kind {
        EnemyKind::Plain => cfg(16.0, 14.0, 1.0, 1.0, 10, 30, 1),
        EnemyKind::Fast => cfg(12.0, 10.0, 0.5, 2.2, 12, 20, 2),
        EnemyKind::Zigzag => cfg(14.0, 12.0, 0.8, 1.1, 14, 15, 3),
        EnemyKind::Tank => cfg(24.0, 20.0, 4.0, 0.5, 20, 12, 4),
        EnemyKind::Swarm => cfg(8.0, 7.0, 0.4, 1.6, 7, 10, 5),
        EnemyKind::Shooter => cfg(18.0, 16.0, 1.5, 0.8, 18, 8, 6),
        EnemyKind::Bomber => cfg(20.0, 16.0, 1.8, 0.6, 20, 6, 7),
        EnemyKind::Splitter => cfg(20.0, 18.0, 2.0, 0.9, 22, 4, 8),
        EnemyKind::Dasher => cfg(13.0, 11.0, 1.0, 1.0, 18, 5, 9),
        EnemyKind::Stealth => cfg(15.0, 13.0, 1.2, 1.3, 25, 3, 10),
        EnemyKind::Shielder => cfg(18.0, 16.0, 1.5, 0.7, 28, 4, 11),
        EnemyKind::Teleporter => cfg(14.0, 12.0, 1.0, 1.0, 26, 3, 12),
        EnemyKind::Leech => cfg(16.0, 14.0, 1.4, 0.8, 24, 3, 13),
        EnemyKind::Mirror => cfg(14.0, 12.0, 1.0, 1.1, 24, 3, 14),
        EnemyKind::Kamikaze => cfg(12.0, 12.0, 0.7, 1.4, 26, 4, 15),
        EnemyKind::Phantom => cfg(15.0, 13.0, 1.0, 1.0, 30, 2, 16),
        EnemyKind::Titan => cfg(34.0, 28.0, 8.0, 0.35, 60, 2, 18),
        EnemyKind::Assassin => cfg(13.0, 13.0, 1.2, 1.6, 35, 2, 20),
        EnemyKind::Armada => cfg(14.0, 12.0, 1.2, 1.0, 15, 0, 0),
        // Set-piece kinds never enter the weighted roll; reward bases only.
        EnemyKind::MiniBoss => cfg(30.0, 26.0, 0.0, 0.0, 120, 0, 0),
        EnemyKind::Boss => cfg(55.0, 45.0, 0.0, 0.0, 500, 0, 0),
    }
}

/// Fresh brain state for a spawned enemy of `kind`.
pub fn initial_brain(kind: EnemyKind, player_x: f32) -> EnemyBrain {
    match kind {
        EnemyKind::Plain => EnemyBrain::Plain,
        EnemyKind::Fast => EnemyBrain::Fast,
        EnemyKind::Zigzag => EnemyBrain::Zigzag { phase: 0.0 },
        EnemyKind::Tank => EnemyBrain::Tank,
        EnemyKind::Swarm => EnemyBrain::Swarm { phase: 0.0 },
        EnemyKind::Shooter => EnemyBrain::Shooter { shoot_ms: 1200.0 },
        EnemyKind::Bomber => EnemyBrain::Bomber { drop_ms: 2600.0 },
        EnemyKind::Splitter => EnemyBrain::Splitter,
        EnemyKind::Dasher => EnemyBrain::Dasher { pause_ms: 600.0, dash_ms: 0.0 },
        EnemyKind::Stealth => EnemyBrain::Stealth { cycle_ms: 0.0, alpha: 1.0 },
        EnemyKind::Shielder => EnemyBrain::Shielder { charges: 2 },
        EnemyKind::Teleporter => EnemyBrain::Teleporter { blink_ms: 1800.0 },
        EnemyKind::Leech => EnemyBrain::Leech { regen_ms: 1000.0 },
        EnemyKind::Mirror => EnemyBrain::Mirror { last_player_x: player_x },
        EnemyKind::Kamikaze => EnemyBrain::Kamikaze,
        EnemyKind::Phantom => EnemyBrain::Phantom { cycle_ms: 0.0, intangible: false },
        EnemyKind::Titan => EnemyBrain::Titan,
        EnemyKind::Assassin => EnemyBrain::Assassin { dash_ms: 0.0 },
        EnemyKind::Armada => EnemyBrain::Armada,
        EnemyKind::MiniBoss => EnemyBrain::MiniBoss,
        EnemyKind::Boss => EnemyBrain::Boss,
    }
}
