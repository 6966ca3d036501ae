//! Single-source distance field builder used by the tablet crate.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tablet_optimizer_core::TileCoord;

/// Sentinel stored for tiles the frontier never reached.
pub(crate) const UNREACHABLE: u32 = u32::MAX;

const NEIGHBOR_OFFSETS: [TileCoord; 4] = [
    TileCoord::new(0, 1),
    TileCoord::new(1, 0),
    TileCoord::new(0, -1),
    TileCoord::new(-1, 0),
];

/// Dense step-distance grid seeded from the tablet entrance.
///
/// The field mirrors the tablet's dimensions and stores, for every tile, the
/// minimum number of 4-directional steps from the source through unblocked
/// tiles. Distances default to [`UNREACHABLE`] so callers can tell flooded
/// pockets apart from traversable tiles before the state layer collapses the
/// sentinel.
#[derive(Clone, Debug, Default)]
pub(crate) struct DistanceField {
    width: u32,
    height: u32,
    distances: Vec<u32>,
}

impl DistanceField {
    /// Rebuilds the distances with a min-priority frontier expansion.
    ///
    /// Every edge weighs exactly one step, which makes the expansion
    /// equivalent to a breadth-first traversal; the priority-queue
    /// formulation is kept so the engine survives non-uniform weights
    /// unchanged. Tiles are marked on enqueue, so no tile enters the
    /// frontier twice and ties may pop in any order.
    pub(crate) fn rebuild_with<F>(
        &mut self,
        width: u32,
        height: u32,
        source: TileCoord,
        mut is_blocked: F,
    ) where
        F: FnMut(TileCoord) -> bool,
    {
        let width_usize = usize::try_from(width).unwrap_or(0);
        let height_usize = usize::try_from(height).unwrap_or(0);
        let tile_count = width_usize.checked_mul(height_usize).unwrap_or(0);

        self.width = width;
        self.height = height;

        if tile_count == 0 {
            self.distances.clear();
            return;
        }

        if self.distances.len() != tile_count {
            self.distances = vec![UNREACHABLE; tile_count];
        } else {
            self.distances.fill(UNREACHABLE);
        }

        if !in_bounds(source, width, height) || is_blocked(source) {
            return;
        }

        let Some(source_index) = index(width_usize, source) else {
            return;
        };

        let mut frontier = BinaryHeap::new();
        self.distances[source_index] = 0;
        frontier.push((Reverse(0u32), source));

        while let Some((Reverse(steps), tile)) = frontier.pop() {
            let next_steps = steps.saturating_add(1);

            for neighbor in neighbors(tile) {
                if !in_bounds(neighbor, width, height) || is_blocked(neighbor) {
                    continue;
                }

                let Some(neighbor_index) = index(width_usize, neighbor) else {
                    continue;
                };

                if self.distances[neighbor_index] != UNREACHABLE {
                    continue;
                }

                self.distances[neighbor_index] = next_steps;
                frontier.push((Reverse(next_steps), neighbor));
            }
        }
    }

    /// Dense distances stored in row-major order.
    #[must_use]
    pub(crate) fn cells(&self) -> &[u32] {
        &self.distances
    }

    /// Distance captured for the provided tile, if it lies within the field.
    #[must_use]
    #[allow(dead_code)]
    pub(crate) fn distance(&self, tile: TileCoord) -> Option<u32> {
        if !in_bounds(tile, self.width, self.height) {
            return None;
        }

        let width = usize::try_from(self.width).ok()?;
        index(width, tile).and_then(|offset| self.distances.get(offset).copied())
    }
}

fn neighbors(tile: TileCoord) -> impl Iterator<Item = TileCoord> {
    NEIGHBOR_OFFSETS.into_iter().map(move |offset| tile.offset(offset))
}

fn in_bounds(tile: TileCoord, width: u32, height: u32) -> bool {
    u32::try_from(tile.x()).map_or(false, |x| x < width)
        && u32::try_from(tile.y()).map_or(false, |y| y < height)
}

fn index(width: usize, tile: TileCoord) -> Option<usize> {
    let x = usize::try_from(tile.x()).ok()?;
    let y = usize::try_from(tile.y()).ok()?;
    y.checked_mul(width)?.checked_add(x)
}
