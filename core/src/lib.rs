#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tablet optimizer.
//!
//! This crate defines the value types exchanged between the authoritative
//! tablet state, the pure search and session systems, and the adapters:
//! grid coordinates, tile kinds, the closed set of [`Transformation`]
//! variants, and the construction failure taxonomy. All types carry value
//! semantics; behaviour that inspects a whole layout lives with the tablet
//! state itself.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Location of a single tile expressed as signed grid coordinates.
///
/// Coordinates are signed so neighbour arithmetic can step past the grid
/// boundary and be rejected by a bounds check rather than wrap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    x: i32,
    y: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal component of the coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component of the coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the coordinate shifted componentwise by `other`.
    #[must_use]
    pub const fn offset(self, other: TileCoord) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Kinds of tiles that can occupy a tablet layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Ordinary tile with no content; the target of entrance moves.
    Empty,
    /// Flooded tile that blocks traversal entirely.
    Water,
    /// The single tile all distances are measured from.
    Entrance,
    /// Tile holding an encounter whose remoteness the score rewards.
    Encounter,
}

impl TileKind {
    /// Reports whether the tile kind permits traversal.
    ///
    /// Water is the only impassable kind; every other tile participates in
    /// the distance field.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Self::Water)
    }
}

/// A single tile of the tablet: its kind plus the cached distance.
///
/// `distance` is derived data, rebuilt from the layout whenever the tablet
/// changes. The value 0 doubles as the collapsed sentinel for tiles with no
/// path from the entrance, so the entrance itself and unreachable tiles are
/// indistinguishable to scoring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tile {
    /// Kind currently occupying the tile.
    pub kind: TileKind,
    /// Steps from the entrance along passable tiles, 0 when unreachable.
    pub distance: u32,
}

impl Tile {
    /// Creates a tile of the provided kind with no distance computed yet.
    #[must_use]
    pub const fn new(kind: TileKind) -> Self {
        Self { kind, distance: 0 }
    }
}

/// Closed set of moves applicable to a tablet layout.
///
/// Transformations are pure descriptions; the tablet state both generates
/// them and applies them. `apply` and the interactable-tile lookup match on
/// every variant without a wildcard arm, so adding a variant fails to
/// compile until both sites handle it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transformation {
    /// Relocates the entrance onto an empty tile, leaving an empty tile
    /// behind at the old entrance position.
    SwapEntrance {
        /// Empty tile the entrance moves onto.
        target: TileCoord,
    },
    /// Exchanges the contents of a water tile and an empty tile.
    SwapWaterAndEmpty {
        /// Water tile participating in the exchange.
        water: TileCoord,
        /// Empty tile participating in the exchange.
        empty: TileCoord,
    },
    /// Converts a water tile into an empty tile in place.
    TurnWaterToEmpty {
        /// Water tile to drain.
        water: TileCoord,
    },
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SwapEntrance { target } => write!(f, "move entrance to {target}"),
            Self::SwapWaterAndEmpty { water, empty } => {
                write!(f, "swap water {water} with empty {empty}")
            }
            Self::TurnWaterToEmpty { water } => write!(f, "drain water at {water}"),
        }
    }
}

/// Reasons a tablet layout is rejected at construction.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TabletError {
    /// The layout holds no tile at all.
    #[error("invalid tablet: layout contains no tiles")]
    EmptyLayout,
    /// One row of the layout differs in length from the first row.
    #[error("invalid tablet: row {row} holds {found} tiles, expected {expected}")]
    RaggedRows {
        /// Zero-based index of the offending row.
        row: usize,
        /// Number of tiles in the first row.
        expected: usize,
        /// Number of tiles in the offending row.
        found: usize,
    },
    /// No tile of the layout carries [`TileKind::Entrance`].
    #[error("invalid tablet: layout does not contain an entrance")]
    MissingEntrance,
    /// More than one tile of the layout carries [`TileKind::Entrance`].
    #[error("invalid tablet: entrance appears at both {first} and {second}")]
    DuplicateEntrance {
        /// Position of the first entrance encountered.
        first: TileCoord,
        /// Position of the second entrance encountered.
        second: TileCoord,
    },
}

#[cfg(test)]
mod tests {
    use super::{TabletError, Tile, TileCoord, TileKind, Transformation};

    #[test]
    fn offset_adds_componentwise() {
        let base = TileCoord::new(2, 3);
        assert_eq!(base.offset(TileCoord::new(0, -1)), TileCoord::new(2, 2));
        assert_eq!(base.offset(TileCoord::new(-3, 4)), TileCoord::new(-1, 7));
    }

    #[test]
    fn only_water_blocks_traversal() {
        assert!(TileKind::Empty.is_passable());
        assert!(TileKind::Entrance.is_passable());
        assert!(TileKind::Encounter.is_passable());
        assert!(!TileKind::Water.is_passable());
    }

    #[test]
    fn fresh_tiles_start_without_distance() {
        let tile = Tile::new(TileKind::Encounter);
        assert_eq!(tile.kind, TileKind::Encounter);
        assert_eq!(tile.distance, 0);
    }

    #[test]
    fn tile_coord_round_trips_through_bincode() {
        let coord = TileCoord::new(-1, 7);
        let bytes = bincode::serialize(&coord).expect("serialize");
        let restored: TileCoord = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, coord);
    }

    #[test]
    fn transformations_render_human_readable_summaries() {
        let swap = Transformation::SwapWaterAndEmpty {
            water: TileCoord::new(0, 0),
            empty: TileCoord::new(1, 2),
        };
        assert_eq!(swap.to_string(), "swap water (0, 0) with empty (1, 2)");
        let drain = Transformation::TurnWaterToEmpty {
            water: TileCoord::new(3, 1),
        };
        assert_eq!(drain.to_string(), "drain water at (3, 1)");
    }

    #[test]
    fn construction_errors_name_the_invalid_tablet() {
        let error = TabletError::MissingEntrance;
        assert_eq!(
            error.to_string(),
            "invalid tablet: layout does not contain an entrance"
        );
        let duplicate = TabletError::DuplicateEntrance {
            first: TileCoord::new(0, 0),
            second: TileCoord::new(2, 1),
        };
        assert!(duplicate.to_string().contains("(2, 1)"));
    }
}
