//! Uniform grid broad phase over the live combatants.
//!
//! The grid is rebuilt from scratch every frame by
//! [`SpatialGrid::build`] and never mutated afterwards. It maps integer cell
//! coordinates to the indices of the combatants standing in that cell, so a
//! projectile only needs narrow-phase tests against combatants near the
//! segment it travelled this frame.
//!
//! # Query Shape
//!
//! A query covers the bounding box of the projectile's sweep (previous to
//! current position), grown on every side by the projectile's radius plus the
//! largest combatant radius seen at build time. Any combatant whose circle
//! can touch the sweep has its centre inside that box, so the query has no
//! false negatives. Extra candidates are filtered by the narrow phase.
//!
//! # Ordering
//!
//! Results are returned in descending index order. A caller walking them can
//! remove entries from the live collection by swap-remove or truncation
//! without disturbing indices it has not visited yet.
//!
//! # Example
//!
//! ```
//! use skirmish_core::spatial::SpatialGrid;
//! use skirmish_core::entity::{Combatant, CombatantId, CombatantKind, Projectile};
//! use glam::Vec2;
//!
//! let combatants = vec![
//!     Combatant::new(CombatantId::new(0), CombatantKind::Ranged, Vec2::new(10.0, 10.0)),
//!     Combatant::new(CombatantId::new(1), CombatantKind::Ranged, Vec2::new(900.0, 900.0)),
//! ];
//! let grid = SpatialGrid::build(&combatants, 120.0).unwrap();
//!
//! let mut shot = Projectile::default();
//! shot.launch(Vec2::new(0.0, 0.0), Vec2::ZERO);
//! assert_eq!(grid.query(&shot), vec![0]);
//! ```

use glam::Vec2;
use std::collections::HashMap;

use crate::config::DEFAULT_CELL_SIZE;
use crate::entity::{Combatant, Projectile};

/// Integer cell coordinate.
pub type Cell = (i32, i32);

/// Per-frame uniform grid of combatant indices.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<Cell, Vec<usize>>,
    max_size: f32,
    min_cell: Cell,
    max_cell: Cell,
    len: usize,
}

impl SpatialGrid {
    /// Buckets every targetable combatant by cell.
    ///
    /// Returns `None` when there is nothing to index; callers must then fall
    /// back to scanning the whole collection.
    #[must_use]
    pub fn build(combatants: &[Combatant], cell_size: f32) -> Option<Self> {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            tracing::warn!(cell_size, "invalid grid cell size, using default");
            DEFAULT_CELL_SIZE
        };

        let mut grid = Self {
            cell_size,
            cells: HashMap::new(),
            max_size: 0.0,
            min_cell: (i32::MAX, i32::MAX),
            max_cell: (i32::MIN, i32::MIN),
            len: 0,
        };

        for (index, combatant) in combatants.iter().enumerate() {
            if !combatant.is_targetable() {
                continue;
            }
            let position = sanitize_position(combatant.position);
            if position != combatant.position {
                tracing::warn!(id = %combatant.id(), "non-finite combatant position");
            }
            let cell = grid.cell_of(position);
            grid.cells.entry(cell).or_default().push(index);
            grid.min_cell = (grid.min_cell.0.min(cell.0), grid.min_cell.1.min(cell.1));
            grid.max_cell = (grid.max_cell.0.max(cell.0), grid.max_cell.1.max(cell.1));
            if combatant.size.is_finite() {
                grid.max_size = grid.max_size.max(combatant.size);
            }
            grid.len += 1;
        }

        (grid.len > 0).then_some(grid)
    }

    /// Returns candidate combatant indices for `projectile`, highest first.
    #[must_use]
    pub fn query(&self, projectile: &Projectile) -> Vec<usize> {
        let mut out = Vec::new();
        self.query_into(projectile, &mut out);
        out
    }

    /// Like [`SpatialGrid::query`], writing into a reusable buffer.
    ///
    /// `out` is cleared first.
    pub fn query_into(&self, projectile: &Projectile, out: &mut Vec<usize>) {
        out.clear();
        let Some((from, to)) = projectile.sweep() else {
            return;
        };
        let pad = Vec2::splat(projectile.radius() + self.max_size);
        self.collect_box(from.min(to) - pad, from.max(to) + pad, out);
        out.sort_unstable_by(|a, b| b.cmp(a));
        out.dedup();
    }

    /// Returns candidate indices for a circle, highest first.
    pub fn query_circle_into(&self, center: Vec2, radius: f32, out: &mut Vec<usize>) {
        out.clear();
        if !center.is_finite() {
            return;
        }
        let radius = if radius.is_finite() { radius.max(0.0) } else { 0.0 };
        let pad = Vec2::splat(radius + self.max_size);
        self.collect_box(center - pad, center + pad, out);
        out.sort_unstable_by(|a, b| b.cmp(a));
        out.dedup();
    }

    fn collect_box(&self, min: Vec2, max: Vec2, out: &mut Vec<usize>) {
        let (lo_x, lo_y) = self.cell_of(min);
        let (hi_x, hi_y) = self.cell_of(max);
        let (lo_x, lo_y) = (lo_x.max(self.min_cell.0), lo_y.max(self.min_cell.1));
        let (hi_x, hi_y) = (hi_x.min(self.max_cell.0), hi_y.min(self.max_cell.1));
        if lo_x > hi_x || lo_y > hi_y {
            return;
        }

        let span = (i64::from(hi_x) - i64::from(lo_x) + 1) * (i64::from(hi_y) - i64::from(lo_y) + 1);
        if span > i64::try_from(self.cells.len()).unwrap_or(i64::MAX) {
            // Box covers more cells than are occupied: walk the buckets instead.
            for (&(cx, cy), bucket) in &self.cells {
                if (lo_x..=hi_x).contains(&cx) && (lo_y..=hi_y).contains(&cy) {
                    out.extend_from_slice(bucket);
                }
            }
            return;
        }

        for cx in lo_x..=hi_x {
            for cy in lo_y..=hi_y {
                if let Some(bucket) = self.cells.get(&(cx, cy)) {
                    out.extend_from_slice(bucket);
                }
            }
        }
    }

    /// Returns the cell containing `position`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn cell_of(&self, position: Vec2) -> Cell {
        let position = sanitize_position(position);
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    /// Returns the cell edge length.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Returns the largest combatant radius indexed.
    #[must_use]
    pub const fn max_size(&self) -> f32 {
        self.max_size
    }

    /// Returns the number of indexed combatants.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing is indexed. A built grid is never empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of occupied cells.
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}

/// Replaces non-finite coordinates with zero.
#[must_use]
pub fn sanitize_position(position: Vec2) -> Vec2 {
    Vec2::new(
        if position.x.is_finite() { position.x } else { 0.0 },
        if position.y.is_finite() { position.y } else { 0.0 },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::damage::{DamageSource, Hit};
    use crate::entity::{CombatantId, CombatantKind};

    fn ranged_at(index: u64, x: f32, y: f32) -> Combatant {
        Combatant::new(CombatantId::new(index), CombatantKind::Ranged, Vec2::new(x, y))
    }

    fn shot(from: Vec2, to: Vec2, size: f32) -> Projectile {
        let mut projectile = Projectile::default();
        projectile.previous = from;
        projectile.position = to;
        projectile.size = size;
        projectile
    }

    mod build_tests {
        use super::*;

        #[test]
        fn empty_input_yields_none() {
            assert!(SpatialGrid::build(&[], 120.0).is_none());
        }

        #[test]
        fn only_dead_combatants_yields_none() {
            let mut dead = ranged_at(0, 0.0, 0.0);
            dead.apply_damage(Hit::new(99, DamageSource::Projectile));
            assert!(SpatialGrid::build(&[dead], 120.0).is_none());
        }

        #[test]
        fn buckets_by_floor_division() {
            let combatants = vec![
                ranged_at(0, 10.0, 10.0),
                ranged_at(1, 119.0, 0.0),
                ranged_at(2, 120.0, 0.0),
                ranged_at(3, -1.0, -1.0),
            ];
            let grid = SpatialGrid::build(&combatants, 120.0).unwrap();

            assert_eq!(grid.len(), 4);
            assert_eq!(grid.occupied_cells(), 3);
            assert_eq!(grid.cell_of(Vec2::new(119.0, 0.0)), (0, 0));
            assert_eq!(grid.cell_of(Vec2::new(120.0, 0.0)), (1, 0));
            assert_eq!(grid.cell_of(Vec2::new(-1.0, -1.0)), (-1, -1));
        }

        #[test]
        fn tracks_max_size() {
            let mut big = ranged_at(1, 0.0, 0.0);
            big.size = 40.0;
            let grid = SpatialGrid::build(&[ranged_at(0, 0.0, 0.0), big], 120.0).unwrap();
            assert_eq!(grid.max_size(), 40.0);
        }

        #[test]
        fn invalid_cell_size_falls_back() {
            let grid = SpatialGrid::build(&[ranged_at(0, 0.0, 0.0)], f32::NAN).unwrap();
            assert_eq!(grid.cell_size(), DEFAULT_CELL_SIZE);
        }

        #[test]
        fn non_finite_position_indexed_at_origin_cell() {
            let grid =
                SpatialGrid::build(&[ranged_at(0, f32::NAN, f32::INFINITY)], 120.0).unwrap();
            assert_eq!(grid.len(), 1);
            assert_eq!(grid.query(&shot(Vec2::ZERO, Vec2::ZERO, 1.0)), vec![0]);
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn results_are_descending() {
            let combatants: Vec<_> = (0..6).map(|i| ranged_at(i, 5.0, 5.0)).collect();
            let grid = SpatialGrid::build(&combatants, 120.0).unwrap();
            assert_eq!(
                grid.query(&shot(Vec2::ZERO, Vec2::ZERO, 1.0)),
                vec![5, 4, 3, 2, 1, 0]
            );
        }

        #[test]
        fn distant_combatants_excluded() {
            let combatants = vec![ranged_at(0, 0.0, 0.0), ranged_at(1, 2000.0, 2000.0)];
            let grid = SpatialGrid::build(&combatants, 120.0).unwrap();
            assert_eq!(grid.query(&shot(Vec2::ZERO, Vec2::ZERO, 1.0)), vec![0]);
        }

        #[test]
        fn fast_sweep_finds_combatant_between_endpoints() {
            // Crosses six cells in one frame; the target sits in the middle.
            let combatants = vec![ranged_at(0, 360.0, 0.0)];
            let grid = SpatialGrid::build(&combatants, 120.0).unwrap();
            let fast = shot(Vec2::new(-10.0, 0.0), Vec2::new(700.0, 0.0), 2.0);
            assert_eq!(grid.query(&fast), vec![0]);
        }

        #[test]
        fn padding_reaches_large_combatant_in_neighbour_cell() {
            let mut big = ranged_at(0, 125.0, 0.0);
            big.size = 30.0;
            let grid = SpatialGrid::build(&[big], 120.0).unwrap();
            // Shot sits in cell (0, 0), 10 units left of the boundary.
            let near = shot(Vec2::new(110.0, 0.0), Vec2::new(110.0, 0.0), 1.0);
            assert_eq!(grid.query(&near), vec![0]);
        }

        #[test]
        fn nan_previous_uses_current() {
            let grid = SpatialGrid::build(&[ranged_at(0, 50.0, 50.0)], 120.0).unwrap();
            let p = shot(Vec2::NAN, Vec2::new(50.0, 50.0), 1.0);
            assert_eq!(grid.query(&p), vec![0]);
        }

        #[test]
        fn fully_malformed_projectile_gets_nothing() {
            let grid = SpatialGrid::build(&[ranged_at(0, 0.0, 0.0)], 120.0).unwrap();
            assert!(grid.query(&shot(Vec2::NAN, Vec2::NAN, 1.0)).is_empty());
        }

        #[test]
        fn huge_sweep_walks_buckets() {
            let combatants = vec![ranged_at(0, 0.0, 0.0), ranged_at(1, 1.0e6, 1.0e6)];
            let grid = SpatialGrid::build(&combatants, 1.0).unwrap();
            let across = shot(Vec2::new(-1.0e7, -1.0e7), Vec2::new(1.0e7, 1.0e7), 1.0);
            assert_eq!(grid.query(&across), vec![1, 0]);
        }

        #[test]
        fn query_into_clears_buffer() {
            let grid = SpatialGrid::build(&[ranged_at(0, 0.0, 0.0)], 120.0).unwrap();
            let mut out = vec![99, 98];
            grid.query_into(&shot(Vec2::ZERO, Vec2::ZERO, 1.0), &mut out);
            assert_eq!(out, vec![0]);
        }

        #[test]
        fn circle_query_finds_neighbours() {
            let combatants = vec![ranged_at(0, 0.0, 0.0), ranged_at(1, 500.0, 0.0)];
            let grid = SpatialGrid::build(&combatants, 120.0).unwrap();
            let mut out = Vec::new();
            grid.query_circle_into(Vec2::new(20.0, 0.0), 30.0, &mut out);
            assert_eq!(out, vec![0]);
        }
    }
}
