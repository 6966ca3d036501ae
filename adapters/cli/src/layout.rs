#![allow(clippy::missing_errors_doc)]

//! Layout input and text rendering for the command-line adapter.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use tablet_optimizer_core::TileKind;
use tablet_optimizer_system_session::Analysis;
use tablet_optimizer_tablet::TabletState;
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "tablet";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "tablet:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

const GLYPH_EMPTY: char = '.';
const GLYPH_WATER: char = '~';
const GLYPH_ENTRANCE: char = '@';
const GLYPH_ENCOUNTER: char = '*';

/// Snapshot of a tablet layout suitable for single-line clipboard transfer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct TabletLayoutSnapshot {
    /// Number of tile columns contained in the layout.
    pub columns: u32,
    /// Number of tile rows contained in the layout.
    pub rows: u32,
    /// Tile kinds composing the layout, in row-major order.
    pub tiles: Vec<TileKind>,
}

impl TabletLayoutSnapshot {
    /// Captures the layout of an existing tablet state.
    #[must_use]
    pub(crate) fn from_state(state: &TabletState) -> Self {
        Self {
            columns: state.width(),
            rows: state.height(),
            tiles: state.tiles().map(|(_, tile)| tile.kind).collect(),
        }
    }

    /// Consumes the snapshot, yielding rows of tile kinds.
    #[must_use]
    pub(crate) fn into_rows(self) -> Vec<Vec<TileKind>> {
        let columns = usize::try_from(self.columns).unwrap_or(0).max(1);
        self.tiles.chunks(columns).map(<[TileKind]>::to_vec).collect()
    }

    /// Encodes the snapshot into a single-line string suitable for clipboard
    /// transfer.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let payload = SerializablePayload {
            tiles: self.tiles.clone(),
        };
        let json = serde_json::to_vec(&payload).expect("layout snapshot serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{SNAPSHOT_HEADER}:{}x{}:{encoded}", self.columns, self.rows)
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutError::MissingVersion)?;
        let dimensions = parts.next().ok_or(LayoutError::MissingDimensions)?;
        let payload = parts.next().ok_or(LayoutError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(LayoutError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(LayoutError::UnsupportedVersion(version.to_owned()));
        }

        let (columns, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
        let decoded: SerializablePayload = serde_json::from_slice(&bytes)?;

        let expected = usize::try_from(columns)
            .unwrap_or(0)
            .saturating_mul(usize::try_from(rows).unwrap_or(0));
        if decoded.tiles.len() != expected {
            return Err(LayoutError::TileCountMismatch {
                expected,
                found: decoded.tiles.len(),
            });
        }

        Ok(Self {
            columns,
            rows,
            tiles: decoded.tiles,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializablePayload {
    tiles: Vec<TileKind>,
}

/// Errors that can occur while reading layout input.
#[derive(Debug, Error)]
pub(crate) enum LayoutError {
    /// The provided string was empty or contained only whitespace.
    #[error("snapshot string was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    #[error("snapshot string is missing the prefix")]
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    #[error("snapshot string is missing the version")]
    MissingVersion,
    /// The encoded snapshot did not include grid dimensions.
    #[error("snapshot string is missing the grid dimensions")]
    MissingDimensions,
    /// The encoded snapshot did not include the payload segment.
    #[error("snapshot string is missing the payload")]
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    #[error("snapshot prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    #[error("snapshot version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded snapshot.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode snapshot payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse snapshot payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
    /// The payload tile count disagrees with the dimensions segment.
    #[error("snapshot payload holds {found} tiles, expected {expected}")]
    TileCountMismatch {
        /// Tile count implied by the dimensions segment.
        expected: usize,
        /// Tile count actually present in the payload.
        found: usize,
    },
    /// The layout text contained no tiles at all.
    #[error("layout text contains no tiles")]
    EmptyText,
    /// The layout text used a character outside the glyph alphabet.
    #[error("unknown tile glyph '{glyph}' at row {row}, column {column}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Zero-based row of the character.
        row: usize,
        /// Zero-based column of the character.
        column: usize,
    },
}

/// Parses a glyph grid into rows of tile kinds.
///
/// One line per row, one glyph per tile: `.` empty, `~` water, `@` entrance,
/// `*` encounter. Blank lines are skipped so trailing newlines stay
/// harmless.
pub(crate) fn parse_text_grid(text: &str) -> Result<Vec<Vec<TileKind>>, LayoutError> {
    let mut rows = Vec::new();

    for (row, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut kinds = Vec::new();
        for (column, glyph) in line.chars().enumerate() {
            kinds.push(match glyph {
                GLYPH_EMPTY => TileKind::Empty,
                GLYPH_WATER => TileKind::Water,
                GLYPH_ENTRANCE => TileKind::Entrance,
                GLYPH_ENCOUNTER => TileKind::Encounter,
                glyph => return Err(LayoutError::UnknownGlyph { glyph, row, column }),
            });
        }
        rows.push(kinds);
    }

    if rows.is_empty() {
        return Err(LayoutError::EmptyText);
    }

    Ok(rows)
}

/// Glyph used to render the provided tile kind.
#[must_use]
pub(crate) const fn glyph(kind: TileKind) -> char {
    match kind {
        TileKind::Empty => GLYPH_EMPTY,
        TileKind::Water => GLYPH_WATER,
        TileKind::Entrance => GLYPH_ENTRANCE,
        TileKind::Encounter => GLYPH_ENCOUNTER,
    }
}

/// Renders the tablet as glyph rows with the cached distances alongside.
#[must_use]
pub(crate) fn render_grid(state: &TabletState) -> String {
    let width = usize::try_from(state.width()).unwrap_or(0).max(1);
    let tiles: Vec<_> = state.tiles().map(|(_, tile)| tile).collect();

    let mut rendered = String::new();
    for row in tiles.chunks(width) {
        for tile in row {
            rendered.push(glyph(tile.kind));
        }
        rendered.push_str("    ");
        for tile in row {
            rendered.push_str(&format!("{:>3}", tile.distance));
        }
        rendered.push('\n');
    }
    rendered
}

/// Renders the ranked improvement groups, best options first.
#[must_use]
pub(crate) fn render_rankings(analysis: &Analysis, top: usize) -> String {
    let mut rendered = String::new();

    if analysis.rankings().is_empty() {
        rendered.push_str("no improvements found\n");
        return rendered;
    }

    rendered.push_str("top ways to improve:\n");
    for (moves, group) in analysis.rankings() {
        rendered.push_str(&format!("\n{moves} move(s):\n"));
        for step in group.iter().take(top) {
            let summary = step
                .moves
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            let delta = step.score - analysis.score();
            rendered.push_str(&format!("  {summary}: {} ({delta:+})\n", step.score));
        }
    }
    rendered
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutError> {
    let (columns, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| LayoutError::InvalidDimensions(dimensions.to_owned()))?;

    let columns = columns
        .trim()
        .parse::<u32>()
        .map_err(|_| LayoutError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| LayoutError::InvalidDimensions(dimensions.to_owned()))?;

    if columns == 0 || rows == 0 {
        return Err(LayoutError::InvalidDimensions(dimensions.to_owned()));
    }

    Ok((columns, rows))
}
