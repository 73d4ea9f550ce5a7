use bevy::prelude::*;

/// Velocity in pixels per 60 Hz frame; integrated with `FrameDt::steps`.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Velocity(pub Vec2);

/// Axis-aligned half-extents of a gameplay hitbox.
#[derive(Component, Debug, Clone, Copy)]
pub struct Extents {
    pub hw: f32,
    pub hh: f32,
}

impl Extents {
    pub fn new(hw: f32, hh: f32) -> Self {
        Self { hw, hh }
    }

    #[inline]
    pub fn overlaps(self, pos: Vec2, other: Extents, other_pos: Vec2) -> bool {
        (pos.x - other_pos.x).abs() < self.hw + other.hw
            && (pos.y - other_pos.y).abs() < self.hh + other.hh
    }

    /// Point-in-box test, used for hazard shots against the player.
    #[inline]
    pub fn contains(self, pos: Vec2, point: Vec2) -> bool {
        (point.x - pos.x).abs() < self.hw && (point.y - pos.y).abs() < self.hh
    }
}

/// Hit points. `0 <= hp <= max` always; damage saturates at zero and the
/// kill system is the only consumer of the zero state.
#[derive(Component, Debug, Clone, Copy)]
pub struct Hp {
    pub hp: i32,
    pub max: i32,
}

impl Hp {
    pub fn full(max: i32) -> Self {
        let max = max.max(1);
        Self { hp: max, max }
    }

    /// Apply damage, rounding up so fractional multipliers always bite.
    #[inline]
    pub fn damage(&mut self, amount: f32) {
        let dealt = amount.max(0.0).ceil() as i32;
        self.hp = (self.hp - dealt).max(0);
    }

    #[inline]
    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount).min(self.max);
    }

    #[inline]
    pub fn ratio(&self) -> f32 {
        self.hp as f32 / self.max as f32
    }

    #[inline]
    pub fn dead(&self) -> bool {
        self.hp == 0
    }
}

/// Marker: entity is spoken for by the kill path and awaits structural
/// removal. Downstream systems filter it out, which is what makes double
/// removal a no-op.
#[derive(Component, Debug, Clone, Copy)]
pub struct PendingDespawn;
