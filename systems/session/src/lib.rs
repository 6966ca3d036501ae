#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session system that owns the analyzed tablet and its navigation history.
//!
//! A [`Session`] holds the active [`Analysis`] (state, score and ranked
//! improvement groups) together with in-memory undo and redo stacks of
//! previously active states. Activating a state always recomputes its
//! analysis, so presentation layers can treat the current analysis as
//! authoritative at all times.

use std::collections::BTreeMap;

use tablet_optimizer_core::TileCoord;
use tablet_optimizer_system_search::{explore, rank, sum_of_squares, SearchStep};
use tablet_optimizer_tablet::TabletState;

const MIN_SEARCH_DEPTH: u32 = 1;
const MAX_SEARCH_DEPTH: u32 = 3;
const DEFAULT_SEARCH_DEPTH: u32 = 2;
const MAX_TOP_RESULTS: usize = 1000;
const DEFAULT_TOP_RESULTS: usize = 50;

/// Tuning knobs for the session's search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlannerConfig {
    search_depth: u32,
    top_results: usize,
}

impl PlannerConfig {
    /// Creates a configuration, clamping the depth to 1..=3 and the result
    /// cap to at most 1000.
    ///
    /// The search cost is exponential in the depth, so the upper bound keeps
    /// analysis fast enough for interactive use.
    #[must_use]
    pub fn new(search_depth: u32, top_results: usize) -> Self {
        Self {
            search_depth: search_depth.clamp(MIN_SEARCH_DEPTH, MAX_SEARCH_DEPTH),
            top_results: top_results.min(MAX_TOP_RESULTS),
        }
    }

    /// Maximum number of chained moves explored per analysis.
    #[must_use]
    pub const fn search_depth(&self) -> u32 {
        self.search_depth
    }

    /// Number of ranked options a presentation layer should display per
    /// move count.
    #[must_use]
    pub const fn top_results(&self) -> usize {
        self.top_results
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            search_depth: DEFAULT_SEARCH_DEPTH,
            top_results: DEFAULT_TOP_RESULTS,
        }
    }
}

/// A tablet state together with its score and ranked improvements.
#[derive(Clone, Debug)]
pub struct Analysis {
    state: TabletState,
    score: f64,
    rankings: BTreeMap<usize, Vec<SearchStep>>,
}

impl Analysis {
    fn new(state: TabletState, search_depth: u32) -> Self {
        let score = state.score(sum_of_squares);
        let mut steps = Vec::new();
        explore(&state, search_depth, &sum_of_squares, &mut steps);
        let rankings = rank(steps);
        Self {
            state,
            score,
            rankings,
        }
    }

    fn into_state(self) -> TabletState {
        self.state
    }

    /// The analyzed tablet state.
    #[must_use]
    pub const fn state(&self) -> &TabletState {
        &self.state
    }

    /// Score of the analyzed state under the standard aggregator.
    #[must_use]
    pub const fn score(&self) -> f64 {
        self.score
    }

    /// Improvement candidates grouped by move count, best first.
    #[must_use]
    pub const fn rankings(&self) -> &BTreeMap<usize, Vec<SearchStep>> {
        &self.rankings
    }
}

/// Session that owns the active analysis and the undo/redo history.
#[derive(Clone, Debug, Default)]
pub struct Session {
    config: PlannerConfig,
    current: Option<Analysis>,
    undo_stack: Vec<TabletState>,
    redo_stack: Vec<TabletState>,
}

impl Session {
    /// Creates an empty session with the provided configuration.
    #[must_use]
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config,
            current: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Activates a newly supplied state.
    ///
    /// Any previously active state is pushed onto the undo stack and the
    /// redo history is discarded, exactly as if the user had branched off a
    /// fresh line of exploration.
    pub fn load(&mut self, state: TabletState) {
        if let Some(current) = self.current.take() {
            self.undo_stack.push(current.into_state());
        }
        self.redo_stack.clear();
        self.activate(state);
    }

    /// Reactivates the previously active state, if any.
    ///
    /// Returns whether a state was restored. The replaced state moves onto
    /// the redo stack.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        if let Some(current) = self.current.take() {
            self.redo_stack.push(current.into_state());
        }
        self.activate(previous);
        true
    }

    /// Reapplies the most recently undone state, if any.
    ///
    /// Returns whether a state was restored. The replaced state moves onto
    /// the undo stack; the rest of the redo history is kept.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        if let Some(current) = self.current.take() {
            self.undo_stack.push(current.into_state());
        }
        self.activate(next);
        true
    }

    /// The active analysis, if a state has been loaded.
    #[must_use]
    pub const fn current(&self) -> Option<&Analysis> {
        self.current.as_ref()
    }

    /// Reports whether an undo would restore a state.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Reports whether a redo would restore a state.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// The configuration the session analyzes with.
    #[must_use]
    pub const fn config(&self) -> PlannerConfig {
        self.config
    }

    /// Collects the single moves that involve the selected tile, keyed by
    /// the other tile each move would interact with.
    ///
    /// Presentation layers use the map to highlight every counterpart tile
    /// of a selected tile along with the step it belongs to. The map is
    /// empty when no state is loaded or no move touches the selection.
    #[must_use]
    pub fn tile_interactions(&self, tile: TileCoord) -> BTreeMap<TileCoord, SearchStep> {
        let Some(analysis) = self.current.as_ref() else {
            return BTreeMap::new();
        };

        let mut steps = Vec::new();
        explore(analysis.state(), 1, &sum_of_squares, &mut steps);

        let mut interactions = BTreeMap::new();
        for step in steps {
            let Some(&first) = step.moves.first() else {
                continue;
            };
            if let Some(other) = analysis.state().interactable_tile(first, tile) {
                let _replaced = interactions.insert(other, step);
            }
        }
        interactions
    }

    fn activate(&mut self, state: TabletState) {
        self.current = Some(Analysis::new(state, self.config.search_depth()));
    }
}
