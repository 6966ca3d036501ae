#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bounded-depth search over tablet transformations.
//!
//! The explorer enumerates every legal move sequence of a starting state up
//! to a caller-supplied depth, scores the state reached after each prefix,
//! and appends one [`SearchStep`] per visited sequence. [`rank`] groups the
//! flat result set by sequence length and orders each group for
//! presentation. Cost grows exponentially with depth, so callers keep the
//! bound small.

use std::collections::BTreeMap;

use tablet_optimizer_core::Transformation;
use tablet_optimizer_tablet::TabletState;

/// One explored move sequence together with the state and score it reaches.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchStep {
    /// Transformations applied, in order, from the starting state.
    pub moves: Vec<Transformation>,
    /// Score of the resulting state under the search aggregator.
    pub score: f64,
    /// State reached after applying every move.
    pub state: TabletState,
}

/// Standard aggregator: the sum of squared distances.
///
/// Squaring weights long detours disproportionately, rewarding layouts that
/// push encounter tiles far from the entrance.
#[must_use]
pub fn sum_of_squares(distances: &[u32]) -> f64 {
    distances
        .iter()
        .map(|&distance| {
            let distance = f64::from(distance);
            distance * distance
        })
        .sum()
}

/// Explores every move sequence of the starting state up to `max_depth`.
///
/// One step is appended to `out` for every visited sequence of length
/// 1..=`max_depth`, not only for full-depth leaves, so each prefix stands as
/// a candidate of its own. The starting state itself is reported only when
/// `max_depth` is 0; a positive-depth search never emits an empty sequence.
/// Identical states reached through different move orders are reported
/// separately.
///
/// The traversal runs on an explicit worklist rather than the call stack,
/// so the depth bound never translates into recursion depth.
pub fn explore<F>(state: &TabletState, max_depth: u32, aggregator: &F, out: &mut Vec<SearchStep>)
where
    F: Fn(&[u32]) -> f64,
{
    let mut worklist = vec![Frame {
        state: state.clone(),
        remaining: max_depth,
        moves: Vec::new(),
    }];

    while let Some(frame) = worklist.pop() {
        if frame.remaining == 0 {
            let score = frame.state.score(aggregator);
            out.push(SearchStep {
                moves: frame.moves,
                score,
                state: frame.state,
            });
            continue;
        }

        if !frame.moves.is_empty() {
            out.push(SearchStep {
                moves: frame.moves.clone(),
                score: frame.state.score(aggregator),
                state: frame.state.clone(),
            });
        }

        for transformation in frame.state.transformations() {
            let mut moves = frame.moves.clone();
            moves.push(transformation);
            worklist.push(Frame {
                state: frame.state.apply(transformation),
                remaining: frame.remaining - 1,
                moves,
            });
        }
    }
}

/// Groups search results by move count and orders each group by descending
/// score.
///
/// Every input step lands in exactly one group. The sort is stable and uses
/// no secondary key, so equal scores keep their relative order.
#[must_use]
pub fn rank(steps: Vec<SearchStep>) -> BTreeMap<usize, Vec<SearchStep>> {
    let mut groups: BTreeMap<usize, Vec<SearchStep>> = BTreeMap::new();

    for step in steps {
        groups.entry(step.moves.len()).or_default().push(step);
    }

    for group in groups.values_mut() {
        group.sort_by(|a, b| b.score.total_cmp(&a.score));
    }

    groups
}

struct Frame {
    state: TabletState,
    remaining: u32,
    moves: Vec<Transformation>,
}
