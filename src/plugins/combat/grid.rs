//! Row-bucketed spatial index over enemies.
//!
//! Rebuilt from scratch every tick before the collision pass. An enemy is
//! registered in every row its vertical extent overlaps, so a bullet only
//! tests the enemies sharing its rows — bounding the pass to roughly
//! O(bullets x enemies-per-row) instead of all pairs. Duplicates across
//! rows are expected; the collision pass dedups per bullet.

use bevy::prelude::*;

use crate::common::tunables::Playfield;
use crate::plugins::enemies::components::Enemy;

use super::components::{Extents, PendingDespawn};

pub const GRID_ROWS: usize = 12;

#[derive(Resource, Debug)]
pub struct SpatialGrid {
    rows: Vec<Vec<Entity>>,
    row_h: f32,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self { rows: vec![Vec::new(); GRID_ROWS], row_h: 1.0 }
    }
}

impl SpatialGrid {
    pub fn reset(&mut self, field_height: f32) {
        for row in &mut self.rows {
            row.clear();
        }
        self.row_h = (field_height / GRID_ROWS as f32).max(1.0);
    }

    #[inline]
    fn row_index(&self, y: f32) -> usize {
        ((y / self.row_h) as isize).clamp(0, GRID_ROWS as isize - 1) as usize
    }

    /// Inclusive bucket range covering a vertical span.
    #[inline]
    pub fn row_span(&self, y0: f32, y1: f32) -> (usize, usize) {
        (self.row_index(y0.min(y1)), self.row_index(y0.max(y1)))
    }

    pub fn insert_span(&mut self, entity: Entity, y0: f32, y1: f32) {
        let (lo, hi) = self.row_span(y0, y1);
        for row in lo..=hi {
            self.rows[row].push(entity);
        }
    }

    #[inline]
    pub fn row(&self, index: usize) -> &[Entity] {
        &self.rows[index]
    }

    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }
}

pub fn rebuild_grid(
    field: Res<Playfield>,
    mut grid: ResMut<SpatialGrid>,
    q_enemies: Query<(Entity, &Transform, &Extents), (With<Enemy>, Without<PendingDespawn>)>,
) {
    grid.reset(field.height);
    for (e, tf, extents) in &q_enemies {
        let y = tf.translation.y;
        grid.insert_span(e, y - extents.hh, y + extents.hh);
    }
}
