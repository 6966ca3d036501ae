#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative tablet state for the optimizer.
//!
//! [`TabletState`] owns a rectangular grid of typed tiles together with an
//! eagerly cached distance field measured from the single entrance tile.
//! States are copy-on-write: every mutation is expressed as a new value with
//! freshly recalculated distances, so a holder of an existing state never
//! observes a change. The eager recalculation keeps the "distance is always
//! valid" invariant unconditional.

mod distance;

use distance::{DistanceField, UNREACHABLE};
use tablet_optimizer_core::{TabletError, Tile, TileCoord, TileKind, Transformation};

/// Immutable-per-version grid of typed tiles with cached entrance distances.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TabletState {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    entrance: TileCoord,
}

impl TabletState {
    /// Constructs a tablet state from rows of tile kinds.
    ///
    /// Rows are indexed top to bottom and tiles within a row left to right.
    /// The layout must be rectangular, non-empty, and contain exactly one
    /// [`TileKind::Entrance`]; anything else is rejected as an invalid
    /// tablet. Distances are recalculated before the state is returned, so
    /// every constructed value already satisfies the cache invariant.
    pub fn from_rows(rows: &[Vec<TileKind>]) -> Result<Self, TabletError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);

        if width == 0 || height == 0 {
            return Err(TabletError::EmptyLayout);
        }

        for (row, kinds) in rows.iter().enumerate() {
            if kinds.len() != width {
                return Err(TabletError::RaggedRows {
                    row,
                    expected: width,
                    found: kinds.len(),
                });
            }
        }

        let mut tiles = Vec::with_capacity(width.saturating_mul(height));
        let mut entrance = None;

        for (y, row) in rows.iter().enumerate() {
            for (x, &kind) in row.iter().enumerate() {
                if kind == TileKind::Entrance {
                    let coord = coord_at(x, y);
                    match entrance {
                        None => entrance = Some(coord),
                        Some(first) => {
                            return Err(TabletError::DuplicateEntrance {
                                first,
                                second: coord,
                            })
                        }
                    }
                }

                tiles.push(Tile::new(kind));
            }
        }

        let entrance = entrance.ok_or(TabletError::MissingEntrance)?;
        let mut state = Self {
            width: u32::try_from(width).unwrap_or(u32::MAX),
            height: u32::try_from(height).unwrap_or(u32::MAX),
            tiles,
            entrance,
        };
        state.recalculate_distances();
        Ok(state)
    }

    /// Number of tile columns in the tablet.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of tile rows in the tablet.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Coordinate of the unique entrance tile.
    #[must_use]
    pub const fn entrance(&self) -> TileCoord {
        self.entrance
    }

    /// Reports whether the coordinate lies within the grid extents.
    #[must_use]
    pub fn contains(&self, coord: TileCoord) -> bool {
        u32::try_from(coord.x()).map_or(false, |x| x < self.width)
            && u32::try_from(coord.y()).map_or(false, |y| y < self.height)
    }

    /// Tile stored at the provided coordinate, if it lies within the grid.
    #[must_use]
    pub fn tile(&self, coord: TileCoord) -> Option<Tile> {
        self.index_of(coord)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Iterator over every tile paired with its coordinate, row-major.
    pub fn tiles(&self) -> impl Iterator<Item = (TileCoord, Tile)> + '_ {
        let width = usize::try_from(self.width).unwrap_or(0).max(1);
        self.tiles
            .iter()
            .enumerate()
            .map(move |(index, tile)| (coord_at(index % width, index / width), *tile))
    }

    /// Lazily produces every legal transformation of the current layout.
    ///
    /// Tiles are visited in row-major order: each empty tile yields a
    /// [`Transformation::SwapEntrance`], each water tile yields a
    /// [`Transformation::TurnWaterToEmpty`] followed by one
    /// [`Transformation::SwapWaterAndEmpty`] per empty tile. The sequence is
    /// fully determined by the layout and free of side effects, so it may be
    /// recomputed at will.
    pub fn transformations(&self) -> impl Iterator<Item = Transformation> + '_ {
        self.tiles().flat_map(move |(coord, tile)| {
            let entrance_move = (tile.kind == TileKind::Empty)
                .then_some(Transformation::SwapEntrance { target: coord });
            let water_moves = (tile.kind == TileKind::Water).then(move || {
                std::iter::once(Transformation::TurnWaterToEmpty { water: coord }).chain(
                    self.tiles()
                        .filter(|(_, other)| other.kind == TileKind::Empty)
                        .map(move |(empty, _)| Transformation::SwapWaterAndEmpty {
                            water: coord,
                            empty,
                        }),
                )
            });

            entrance_move
                .into_iter()
                .chain(water_moves.into_iter().flatten())
        })
    }

    /// Returns a new state with the transformation applied and distances
    /// recalculated.
    ///
    /// The referenced tiles must still carry the kinds the transformation
    /// was generated against; callers that apply freshly generated
    /// transformations to the generating state uphold this by construction,
    /// and violations are debug-asserted as programming errors.
    #[must_use]
    pub fn apply(&self, transformation: Transformation) -> Self {
        let mut next = self.clone();

        match transformation {
            Transformation::SwapEntrance { target } => {
                debug_assert_eq!(
                    self.kind_at(target),
                    Some(TileKind::Empty),
                    "entrance may only move onto an empty tile"
                );
                next.swap_tiles(self.entrance, target);
                next.entrance = target;
            }
            Transformation::SwapWaterAndEmpty { water, empty } => {
                debug_assert_eq!(
                    self.kind_at(water),
                    Some(TileKind::Water),
                    "swap source must be water"
                );
                debug_assert_eq!(
                    self.kind_at(empty),
                    Some(TileKind::Empty),
                    "swap target must be empty"
                );
                next.swap_tiles(water, empty);
            }
            Transformation::TurnWaterToEmpty { water } => {
                debug_assert_eq!(
                    self.kind_at(water),
                    Some(TileKind::Water),
                    "only water can be drained"
                );
                next.set_kind(water, TileKind::Empty);
            }
        }

        next.recalculate_distances();
        next
    }

    /// Applies the aggregator to the distances of all tiles, excluding the
    /// zero-distance sentinel.
    ///
    /// The exclusion removes the entrance itself and every unreachable tile
    /// alike, since both collapse to 0 in the cache.
    #[must_use]
    pub fn score<F>(&self, aggregator: F) -> f64
    where
        F: FnOnce(&[u32]) -> f64,
    {
        let distances: Vec<u32> = self
            .tiles
            .iter()
            .map(|tile| tile.distance)
            .filter(|&distance| distance != 0)
            .collect();
        aggregator(&distances)
    }

    /// Looks up which other tile the transformation would interact with,
    /// relative to a selected tile.
    ///
    /// Presentation layers use this to let a user pick a tile and highlight
    /// the counterpart of every relevant move. Returns `None` when the
    /// transformation does not touch the selected tile.
    #[must_use]
    pub fn interactable_tile(
        &self,
        transformation: Transformation,
        tile: TileCoord,
    ) -> Option<TileCoord> {
        match transformation {
            Transformation::SwapEntrance { target } => {
                if self.entrance == tile {
                    Some(target)
                } else if target == tile {
                    Some(self.entrance)
                } else {
                    None
                }
            }
            Transformation::SwapWaterAndEmpty { water, empty } => {
                if water == tile {
                    Some(empty)
                } else if empty == tile {
                    Some(water)
                } else {
                    None
                }
            }
            Transformation::TurnWaterToEmpty { water } => (water == tile).then_some(water),
        }
    }

    fn kind_at(&self, coord: TileCoord) -> Option<TileKind> {
        self.tile(coord).map(|tile| tile.kind)
    }

    fn index_of(&self, coord: TileCoord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }

        let width = usize::try_from(self.width).ok()?;
        let x = usize::try_from(coord.x()).ok()?;
        let y = usize::try_from(coord.y()).ok()?;
        y.checked_mul(width)?.checked_add(x)
    }

    fn swap_tiles(&mut self, first: TileCoord, second: TileCoord) {
        if let (Some(first), Some(second)) = (self.index_of(first), self.index_of(second)) {
            self.tiles.swap(first, second);
        }
    }

    fn set_kind(&mut self, coord: TileCoord, kind: TileKind) {
        if let Some(index) = self.index_of(coord) {
            if let Some(tile) = self.tiles.get_mut(index) {
                tile.kind = kind;
            }
        }
    }

    fn recalculate_distances(&mut self) {
        let width_usize = usize::try_from(self.width).unwrap_or(0).max(1);
        let tiles = &self.tiles;

        let mut field = DistanceField::default();
        field.rebuild_with(self.width, self.height, self.entrance, |coord| {
            let x = match usize::try_from(coord.x()) {
                Ok(x) => x,
                Err(_) => return true,
            };
            let y = match usize::try_from(coord.y()) {
                Ok(y) => y,
                Err(_) => return true,
            };
            y.checked_mul(width_usize)
                .and_then(|row| row.checked_add(x))
                .and_then(|index| tiles.get(index))
                .map_or(true, |tile| !tile.kind.is_passable())
        });

        for (index, tile) in self.tiles.iter_mut().enumerate() {
            let steps = field.cells().get(index).copied().unwrap_or(UNREACHABLE);
            tile.distance = if steps == UNREACHABLE { 0 } else { steps };
        }
    }
}

fn coord_at(x: usize, y: usize) -> TileCoord {
    TileCoord::new(
        i32::try_from(x).unwrap_or(i32::MAX),
        i32::try_from(y).unwrap_or(i32::MAX),
    )
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    fn sum_of_squares(distances: &[u32]) -> f64 {
        distances
            .iter()
            .map(|&distance| {
                let distance = f64::from(distance);
                distance * distance
            })
            .sum()
    }

    fn single_row() -> TabletState {
        TabletState::from_rows(&[vec![
            TileKind::Encounter,
            TileKind::Entrance,
            TileKind::Empty,
        ]])
        .expect("layout is valid")
    }

    fn flooded_corner() -> TabletState {
        TabletState::from_rows(&[
            vec![TileKind::Water, TileKind::Empty],
            vec![TileKind::Entrance, TileKind::Encounter],
        ])
        .expect("layout is valid")
    }

    /// Independent breadth-first reference used to cross-check the cached
    /// distances; deliberately shares no code with the distance module.
    fn brute_force_distances(rows: &[Vec<TileKind>], source: (usize, usize)) -> Vec<Vec<u32>> {
        let height = rows.len();
        let width = rows[0].len();
        let mut distances = vec![vec![0u32; width]; height];
        let mut seen = vec![vec![false; width]; height];
        let mut queue = VecDeque::new();

        seen[source.1][source.0] = true;
        queue.push_back((source.0, source.1, 0u32));

        while let Some((x, y, steps)) = queue.pop_front() {
            distances[y][x] = steps;
            let mut candidates = Vec::new();
            if x > 0 {
                candidates.push((x - 1, y));
            }
            if x + 1 < width {
                candidates.push((x + 1, y));
            }
            if y > 0 {
                candidates.push((x, y - 1));
            }
            if y + 1 < height {
                candidates.push((x, y + 1));
            }
            for (nx, ny) in candidates {
                if !seen[ny][nx] && rows[ny][nx].is_passable() {
                    seen[ny][nx] = true;
                    queue.push_back((nx, ny, steps + 1));
                }
            }
        }

        distances
    }

    #[test]
    fn from_rows_rejects_empty_layouts() {
        assert_eq!(TabletState::from_rows(&[]), Err(TabletError::EmptyLayout));
        assert_eq!(
            TabletState::from_rows(&[Vec::new()]),
            Err(TabletError::EmptyLayout)
        );
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let result = TabletState::from_rows(&[
            vec![TileKind::Entrance, TileKind::Empty],
            vec![TileKind::Empty],
        ]);
        assert_eq!(
            result,
            Err(TabletError::RaggedRows {
                row: 1,
                expected: 2,
                found: 1,
            })
        );
    }

    #[test]
    fn from_rows_rejects_missing_entrance() {
        let result = TabletState::from_rows(&[vec![TileKind::Empty, TileKind::Encounter]]);
        assert_eq!(result, Err(TabletError::MissingEntrance));
    }

    #[test]
    fn from_rows_rejects_duplicate_entrances() {
        let result = TabletState::from_rows(&[
            vec![TileKind::Entrance, TileKind::Empty],
            vec![TileKind::Empty, TileKind::Entrance],
        ]);
        assert_eq!(
            result,
            Err(TabletError::DuplicateEntrance {
                first: TileCoord::new(0, 0),
                second: TileCoord::new(1, 1),
            })
        );
    }

    #[test]
    fn single_row_distances_and_score_match_expectation() {
        let state = single_row();

        assert_eq!(state.entrance(), TileCoord::new(1, 0));
        let distances: Vec<u32> = state.tiles().map(|(_, tile)| tile.distance).collect();
        assert_eq!(distances, vec![1, 0, 1]);
        assert!((state.score(sum_of_squares) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cached_distances_match_brute_force_search() {
        let rows = vec![
            vec![TileKind::Entrance, TileKind::Water, TileKind::Encounter],
            vec![TileKind::Empty, TileKind::Water, TileKind::Empty],
            vec![TileKind::Empty, TileKind::Empty, TileKind::Empty],
        ];
        let state = TabletState::from_rows(&rows).expect("layout is valid");
        let reference = brute_force_distances(&rows, (0, 0));

        for (coord, tile) in state.tiles() {
            let x = usize::try_from(coord.x()).expect("coordinate fits");
            let y = usize::try_from(coord.y()).expect("coordinate fits");
            assert_eq!(tile.distance, reference[y][x], "mismatch at {coord}");
        }
    }

    #[test]
    fn unreachable_pockets_collapse_to_zero() {
        let state = TabletState::from_rows(&[vec![
            TileKind::Entrance,
            TileKind::Water,
            TileKind::Encounter,
        ]])
        .expect("layout is valid");

        let pocket = state.tile(TileCoord::new(2, 0)).expect("tile exists");
        assert_eq!(pocket.kind, TileKind::Encounter);
        assert_eq!(pocket.distance, 0);
    }

    #[test]
    fn score_aggregator_receives_only_nonzero_distances() {
        let state = TabletState::from_rows(&[vec![
            TileKind::Entrance,
            TileKind::Empty,
            TileKind::Water,
            TileKind::Encounter,
        ]])
        .expect("layout is valid");

        let _ = state.score(|distances| {
            // The entrance (0), the water tile (0) and the cut-off encounter
            // (collapsed to 0) must all be absent.
            assert_eq!(distances, &[1][..]);
            0.0
        });
    }

    #[test]
    fn apply_is_a_pure_function() {
        let state = single_row();
        let transformation = Transformation::SwapEntrance {
            target: TileCoord::new(2, 0),
        };

        let first = state.apply(transformation);
        let second = state.apply(transformation);

        assert_eq!(first, second);
        assert_eq!(state, single_row());
    }

    #[test]
    fn swap_entrance_relocates_the_entrance() {
        let state = single_row();

        let moved = state.apply(Transformation::SwapEntrance {
            target: TileCoord::new(2, 0),
        });

        assert_eq!(moved.entrance(), TileCoord::new(2, 0));
        let vacated = moved.tile(TileCoord::new(1, 0)).expect("tile exists");
        assert_eq!(vacated.kind, TileKind::Empty);
        let distances: Vec<u32> = moved.tiles().map(|(_, tile)| tile.distance).collect();
        assert_eq!(distances, vec![2, 1, 0]);
    }

    #[test]
    fn draining_water_never_lengthens_reachable_paths() {
        let state = flooded_corner();
        let before = state.score(sum_of_squares);

        let drained = state.apply(Transformation::TurnWaterToEmpty {
            water: TileCoord::new(0, 0),
        });

        let reclaimed = drained.tile(TileCoord::new(0, 0)).expect("tile exists");
        assert_eq!(reclaimed.kind, TileKind::Empty);
        assert_eq!(reclaimed.distance, 1);

        for (coord, tile) in state.tiles() {
            if tile.distance == 0 {
                continue;
            }
            let after = drained.tile(coord).expect("tile exists");
            assert!(
                after.distance <= tile.distance,
                "removing an obstacle lengthened the path to {coord}"
            );
        }

        assert!(drained.score(sum_of_squares) >= before);
    }

    #[test]
    fn transformations_reference_only_matching_tiles() {
        let state = flooded_corner();

        for transformation in state.transformations() {
            match transformation {
                Transformation::SwapEntrance { target } => {
                    assert_eq!(state.kind_at(target), Some(TileKind::Empty));
                }
                Transformation::SwapWaterAndEmpty { water, empty } => {
                    assert_eq!(state.kind_at(water), Some(TileKind::Water));
                    assert_eq!(state.kind_at(empty), Some(TileKind::Empty));
                }
                Transformation::TurnWaterToEmpty { water } => {
                    assert_eq!(state.kind_at(water), Some(TileKind::Water));
                }
            }
        }
    }

    #[test]
    fn transformation_count_follows_the_branching_formula() {
        // One empty and one water tile: E + W * (1 + E) = 1 + 1 * 2 = 3.
        let state = flooded_corner();
        assert_eq!(state.transformations().count(), 3);

        let moves: Vec<Transformation> = state.transformations().collect();
        let repeat: Vec<Transformation> = state.transformations().collect();
        assert_eq!(moves, repeat);
    }

    #[test]
    fn interactable_tile_resolves_every_variant() {
        let state = flooded_corner();
        let entrance = state.entrance();
        let water = TileCoord::new(0, 0);
        let empty = TileCoord::new(1, 0);

        let swap_entrance = Transformation::SwapEntrance { target: empty };
        assert_eq!(state.interactable_tile(swap_entrance, entrance), Some(empty));
        assert_eq!(state.interactable_tile(swap_entrance, empty), Some(entrance));

        let swap = Transformation::SwapWaterAndEmpty { water, empty };
        assert_eq!(state.interactable_tile(swap, water), Some(empty));
        assert_eq!(state.interactable_tile(swap, empty), Some(water));

        let drain = Transformation::TurnWaterToEmpty { water };
        assert_eq!(state.interactable_tile(drain, water), Some(water));
        assert_eq!(state.interactable_tile(drain, empty), None);

        let encounter = TileCoord::new(1, 1);
        assert_eq!(state.interactable_tile(swap, encounter), None);
    }

    #[test]
    fn tile_lookup_outside_the_grid_is_none() {
        let state = single_row();

        assert_eq!(state.tile(TileCoord::new(-1, 0)), None);
        assert_eq!(state.tile(TileCoord::new(3, 0)), None);
        assert_eq!(state.tile(TileCoord::new(0, 1)), None);
        assert!(!state.contains(TileCoord::new(0, -1)));
    }
}
