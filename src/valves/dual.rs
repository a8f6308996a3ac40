use std::collections::hash_map::Entry;
use std::collections::HashMap;

use smallvec::SmallVec;

use super::search::{self, Optimum, INLINE_VALVES};
use super::{Error, Result, Sequence, ValveGraph, ValveId, ValveName, ValveSet};
use crate::debugln;

/// The best split of the useful valves between a helper and a human.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualOptimum {
    pub helper: Sequence,
    pub human: Sequence,
    /// Pressure released by both together.
    pub score: u64,
}

/// Finds how to split the valves with a positive flow rate between two
/// agents, both starting at `start` with `total_time` minutes, so that
/// together they release the most pressure.
///
/// Every split is tried. Splits are enumerated like a boolean cartesian
/// product over the useful valves in name order, `true` meaning "assigned to
/// the helper" and `true` coming first; ties go to the first split.
///
/// Fails with [`Error::ScoreOverflow`] if a score does not fit in a `u64`.
pub fn optimal_dual_sequence(
    graph: &ValveGraph,
    start: ValveName,
    total_time: i32,
) -> Result<DualOptimum> {
    let start = graph.id(start)?;
    let useful: SmallVec<[ValveId; INLINE_VALVES]> = graph.useful_valves().iter().collect();

    let mut search = PartitionSearch::new(graph, start, total_time);
    let mut best: Option<(ValveSet, ValveSet, u64)> = None;

    let n = useful.len();
    for pattern in 0..(1u128 << n) {
        let (helper_valves, human_valves) = split(&useful, pattern);

        let helper_score = search.optimum(helper_valves)?.score;
        let human_score = search.optimum(human_valves)?.score;
        let score = helper_score
            .checked_add(human_score)
            .ok_or(Error::ScoreOverflow)?;
        if best.map_or(true, |(_, _, best_score)| score > best_score) {
            best = Some((helper_valves, human_valves, score));
        }
    }

    let (helper_valves, human_valves, score) =
        best.unwrap_or((ValveSet::EMPTY, ValveSet::EMPTY, 0));
    debugln!(
        "Tried {} splits of {} valves, searched {} subsets, best score {}",
        1u128 << n,
        n,
        search.cache.len(),
        score
    );

    Ok(DualOptimum {
        helper: search.optimum(helper_valves)?.sequence.clone(),
        human: search.optimum(human_valves)?.sequence.clone(),
        score,
    })
}

/// Splits `useful` according to the bits of `pattern`. The first valve is
/// decided by the highest bit; a clear bit gives the valve to the helper.
fn split(useful: &[ValveId], pattern: u128) -> (ValveSet, ValveSet) {
    let n = useful.len();
    let mut helper = ValveSet::EMPTY;
    let mut human = ValveSet::EMPTY;
    for (i, &valve) in useful.iter().enumerate() {
        if pattern & (1 << (n - 1 - i)) == 0 {
            helper.insert(valve);
        } else {
            human.insert(valve);
        }
    }
    (helper, human)
}

/// Single-agent optima, computed at most once per subset of valves.
struct PartitionSearch<'a> {
    graph: &'a ValveGraph,
    start: ValveId,
    total_time: i32,
    cache: HashMap<ValveSet, Optimum>,
}

impl<'a> PartitionSearch<'a> {
    fn new(graph: &'a ValveGraph, start: ValveId, total_time: i32) -> Self {
        Self {
            graph,
            start,
            total_time,
            cache: HashMap::new(),
        }
    }

    fn optimum(&mut self, valves: ValveSet) -> Result<&Optimum> {
        let optimum: &Optimum = match self.cache.entry(valves) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                entry.insert(search::search(self.graph, self.start, self.total_time, valves)?)
            }
        };
        Ok(optimum)
    }
}
