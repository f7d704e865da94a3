//! k-nearest-neighbour selection over the particle collection.
//!
//! Every frame each particle (and the pointer) asks for its `k` closest
//! particles.  Two interchangeable implementations share one contract:
//!
//! - candidates at or below `epsilon_sq` squared distance are skipped (a
//!   particle never selects itself);
//! - results are ordered by ascending distance, ties broken by collection order;
//! - at most `k` indices are returned, fewer if the pool is smaller;
//! - no distance cutoff is applied (link rendering does that).
//!
//! [`BruteForce`] sorts every candidate: O(n log n) per query, which is fine
//! for tens to low hundreds of particles.  [`SpatialGrid`] buckets particles
//! into square cells once per frame and searches rings of cells outward from
//! the query point, stopping once no unvisited cell can beat the current k-th
//! candidate.
//!
//! ## Cell Size Choice
//!
//! Cell size (`GRID_CELL_SIZE` in `constants.rs`) should be near the typical
//! k-th neighbour distance.  With 50 particles in an 800×600 window that is
//! roughly 60–80 units, so a query usually settles after the 3×3 or 5×5 block.

use crate::config::{FieldConfig, SelectorKind};
use crate::particle::{Bounds, Particle};
use bevy::prelude::*;
use std::collections::HashMap;

/// Nearest-neighbour query shared by the brute-force and grid selectors.
pub trait NeighborSelector {
    /// Called once per frame, before the particle loop, with frame-start positions.
    fn prepare(&mut self, _particles: &[Particle], _bounds: Bounds) {}

    /// Write the indices of the `k` particles closest to `reference` into `out`.
    ///
    /// `out` is cleared first.  `particles` may have moved since `prepare`,
    /// but only by one `advance` each.
    fn nearest(&self, reference: Vec2, particles: &[Particle], k: usize, out: &mut Vec<usize>);
}

/// Sort candidates by squared distance, then by index so equal distances keep
/// collection order.
fn sort_and_truncate(candidates: &mut Vec<(usize, f32)>, k: usize) {
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    candidates.truncate(k);
}

// ── Brute force ───────────────────────────────────────────────────────────────

/// Distance-sort every particle.
#[derive(Debug, Clone, Copy)]
pub struct BruteForce {
    pub epsilon_sq: f32,
}

impl NeighborSelector for BruteForce {
    fn nearest(&self, reference: Vec2, particles: &[Particle], k: usize, out: &mut Vec<usize>) {
        out.clear();
        if k == 0 {
            return;
        }
        let mut candidates: Vec<(usize, f32)> = particles
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.position.distance_squared(reference)))
            .filter(|&(_, d)| d > self.epsilon_sq)
            .collect();
        sort_and_truncate(&mut candidates, k);
        out.extend(candidates.into_iter().map(|(i, _)| i));
    }
}

// ── Spatial grid ──────────────────────────────────────────────────────────────

/// Uniform grid rebuilt once per frame.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    epsilon_sq: f32,
    /// Map from cell coordinates to particle indices.
    cells: HashMap<(i32, i32), Vec<usize>>,
    /// Inclusive range of occupied cells, `None` when empty.
    extent: Option<((i32, i32), (i32, i32))>,
    /// Furthest any particle can travel between `prepare` and a query.
    slack: f32,
}

impl SpatialGrid {
    pub fn new(cell_size: f32, epsilon_sq: f32) -> Self {
        Self {
            cell_size,
            epsilon_sq,
            cells: HashMap::new(),
            extent: None,
            slack: 0.0,
        }
    }

    /// Compute grid cell coordinates for a position
    fn world_to_cell(&self, pos: Vec2) -> (i32, i32) {
        let x = (pos.x / self.cell_size).floor() as i32;
        let y = (pos.y / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Clear all grid data.
    pub fn clear(&mut self) {
        // Retain allocations but clear contents to avoid re-allocating Vec capacity
        for v in self.cells.values_mut() {
            v.clear();
        }
        self.cells.retain(|_, v| !v.is_empty());
        self.extent = None;
        self.slack = 0.0;
    }

    /// Insert a particle index at a position. Call after clear() for bulk rebuild.
    pub fn insert(&mut self, index: usize, pos: Vec2) {
        let cell = self.world_to_cell(pos);
        self.cells.entry(cell).or_default().push(index);
        self.extent = Some(match self.extent {
            None => (cell, cell),
            Some((lo, hi)) => (
                (lo.0.min(cell.0), lo.1.min(cell.1)),
                (hi.0.max(cell.0), hi.1.max(cell.1)),
            ),
        });
    }

    /// Collect candidates from every cell on the square ring at Chebyshev radius `r`.
    fn visit_ring(
        &self,
        center: (i32, i32),
        r: i32,
        reference: Vec2,
        particles: &[Particle],
        candidates: &mut Vec<(usize, f32)>,
    ) {
        let mut visit = |cell: (i32, i32)| {
            if let Some(indices) = self.cells.get(&cell) {
                for &i in indices {
                    let Some(p) = particles.get(i) else {
                        continue;
                    };
                    let d = p.position.distance_squared(reference);
                    if d > self.epsilon_sq {
                        candidates.push((i, d));
                    }
                }
            }
        };

        if r == 0 {
            visit(center);
            return;
        }
        for dx in -r..=r {
            visit((center.0 + dx, center.1 - r));
            visit((center.0 + dx, center.1 + r));
        }
        for dy in (-r + 1)..r {
            visit((center.0 - r, center.1 + dy));
            visit((center.0 + r, center.1 + dy));
        }
    }
}

impl NeighborSelector for SpatialGrid {
    fn prepare(&mut self, particles: &[Particle], bounds: Bounds) {
        self.clear();
        for (i, p) in particles.iter().enumerate() {
            self.insert(i, p.position);
            // Exact displacement of one advance, including the wall clamp.
            let moved = bounds.clamp(p.position + p.velocity, p.radius);
            self.slack = self.slack.max(moved.distance(p.position));
        }
    }

    fn nearest(&self, reference: Vec2, particles: &[Particle], k: usize, out: &mut Vec<usize>) {
        out.clear();
        let Some((lo, hi)) = self.extent else {
            return;
        };
        if k == 0 {
            return;
        }

        let center = self.world_to_cell(reference);
        // Rings beyond this cannot contain any occupied cell.
        let max_ring = [
            center.0.saturating_sub(lo.0),
            hi.0.saturating_sub(center.0),
            center.1.saturating_sub(lo.1),
            hi.1.saturating_sub(center.1),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
        .max(0);

        let mut candidates: Vec<(usize, f32)> = Vec::new();
        for r in 0..=max_ring {
            self.visit_ring(center, r, reference, particles, &mut candidates);
            if candidates.len() < k {
                continue;
            }
            // Anything in an unvisited cell was at least `r * cell_size` away
            // when bucketed and has moved at most `slack` since.
            let reach = (r as f32 * self.cell_size - self.slack).max(0.0);
            sort_and_truncate(&mut candidates, k);
            if candidates[k - 1].1 < reach * reach {
                break;
            }
        }

        sort_and_truncate(&mut candidates, k);
        out.extend(candidates.into_iter().map(|(i, _)| i));
    }
}

// ── Resource ──────────────────────────────────────────────────────────────────

/// The selector used by the frame loop, chosen by [`FieldConfig::selector`].
#[derive(Resource, Debug, Clone)]
pub enum NeighborSearch {
    BruteForce(BruteForce),
    Grid(SpatialGrid),
}

impl NeighborSearch {
    pub fn from_config(config: &FieldConfig) -> Self {
        match config.selector {
            SelectorKind::BruteForce => Self::BruteForce(BruteForce {
                epsilon_sq: config.neighbor_epsilon_sq,
            }),
            SelectorKind::Grid => Self::Grid(SpatialGrid::new(
                config.grid_cell_size,
                config.neighbor_epsilon_sq,
            )),
        }
    }
}

impl Default for NeighborSearch {
    fn default() -> Self {
        Self::from_config(&FieldConfig::default())
    }
}

impl NeighborSelector for NeighborSearch {
    fn prepare(&mut self, particles: &[Particle], bounds: Bounds) {
        match self {
            Self::BruteForce(s) => s.prepare(particles, bounds),
            Self::Grid(s) => s.prepare(particles, bounds),
        }
    }

    fn nearest(&self, reference: Vec2, particles: &[Particle], k: usize, out: &mut Vec<usize>) {
        match self {
            Self::BruteForce(s) => s.nearest(reference, particles, k, out),
            Self::Grid(s) => s.nearest(reference, particles, k, out),
        }
    }
}

/// Startup system: rebuild the selector once the config file has been applied.
pub fn setup_neighbor_search(mut commands: Commands, config: Res<FieldConfig>) {
    let search = NeighborSearch::from_config(&config);
    info!("Neighbour selector: {:?}", config.selector);
    commands.insert_resource(search);
}
