use std::fmt;
use std::ops::ControlFlow;

use itertools::Itertools;
use prettytable::{row, Table};
use smallvec::SmallVec;

use super::{Error, Result, ValveGraph, ValveId, ValveName, ValveSet};
use crate::debugln;

/// Inline capacity for per-search valve lists. Puzzle inputs have about 15
/// valves with a positive flow rate, so a path (start plus every opened
/// valve) rarely spills to the heap.
pub const INLINE_VALVES: usize = 16;

/// Arriving at `valve` (and opening it, unless it is where the sequence
/// starts) with `minutes_remaining` left on the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub valve: ValveName,
    pub minutes_remaining: u32,
}

impl Step {
    /// Pressure this step's valve releases over its remaining minutes.
    ///
    /// Never overflows: both factors fit in 32 bits.
    #[inline]
    pub fn released(minutes_remaining: u32, flow_rate: u32) -> u64 {
        u64::from(minutes_remaining) * u64::from(flow_rate)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.valve, self.minutes_remaining)
    }
}

/// An order in which to visit valves.
///
/// The first step is always the starting valve with the whole time budget.
/// Minutes remaining strictly decrease from step to step; a final step with
/// `0` minutes is a valve that could not be reached in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    steps: Vec<Step>,
}

impl Sequence {
    #[inline]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Total pressure released: every step's valve releases its flow rate for
    /// each of the step's remaining minutes.
    pub fn score(&self, graph: &ValveGraph) -> Result<u64> {
        self.steps.iter().try_fold(0u64, |total, step| {
            let released = Step::released(step.minutes_remaining, graph.flow_rate(step.valve)?);
            total.checked_add(released).ok_or(Error::ScoreOverflow)
        })
    }

    /// Renders the sequence as a table with the pressure released per step.
    pub fn table(&self, graph: &ValveGraph) -> Result<Table> {
        let mut table = Table::new();
        table.set_titles(row!["Valve", "Minutes left", "Flow rate", "Released"]);
        for step in &self.steps {
            let valve = step.valve;
            let minutes = step.minutes_remaining;
            let flow_rate = graph.flow_rate(valve)?;
            let released = Step::released(minutes, flow_rate);
            table.add_row(row![valve, minutes, flow_rate, released]);
        }
        Ok(table)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.steps.iter().join(" -> "))
    }
}

/// The best sequence found by a search, and its score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Optimum {
    pub sequence: Sequence,
    pub score: u64,
}

/// Finds the sequence of valve openings from `start` that releases the most
/// pressure within `total_time` minutes.
///
/// Only the `candidates` are considered for opening; by default, every valve
/// with a positive flow rate. The start valve itself is never reopened. Of
/// several sequences with the best score, the first one found wins, visiting
/// candidates in name order.
///
/// Fails with [`Error::ScoreOverflow`] if some sequence releases more than
/// `u64::MAX`, since the best one then does too.
pub fn optimal_sequence(
    graph: &ValveGraph,
    start: ValveName,
    total_time: i32,
    candidates: Option<&[ValveName]>,
) -> Result<Optimum> {
    let start = graph.id(start)?;
    let candidates = match candidates {
        Some(names) => graph.ids(names)?,
        None => graph.useful_valves(),
    };
    search(graph, start, total_time, candidates)
}

pub(super) fn search(
    graph: &ValveGraph,
    start: ValveId,
    total_time: i32,
    mut candidates: ValveSet,
) -> Result<Optimum> {
    candidates.remove(start);

    let mut search = SequenceSearch::new(graph);
    let flow = search.execute(start, candidates, total_time);

    debugln!(
        "Explored {} sequences over {} candidates, best score {:?}",
        search.sequences_explored,
        candidates.len(),
        search.best.as_ref().map(|(_, score)| *score)
    );

    match flow {
        ControlFlow::Continue(()) => Ok(search.into_optimum()),
        ControlFlow::Break(()) => Err(Error::ScoreOverflow),
    }
}

type Path = SmallVec<[(ValveId, u32); INLINE_VALVES]>;

/// Depth-first enumeration of every order in which the candidates can be
/// visited, keeping the best complete sequence.
///
/// Branches that run out of time are still completed (scoring nothing for
/// the valve they could not reach in time) rather than cut short. The whole
/// search breaks off as soon as a score overflows.
struct SequenceSearch<'a> {
    graph: &'a ValveGraph,
    /// Steps taken on the current branch.
    path: Path,
    /// Score of `path`.
    score: u64,
    best: Option<(Path, u64)>,
    sequences_explored: u64,
}

impl<'a> SequenceSearch<'a> {
    fn new(graph: &'a ValveGraph) -> Self {
        Self {
            graph,
            path: Path::new(),
            score: 0,
            best: None,
            sequences_explored: 0,
        }
    }

    fn execute(&mut self, position: ValveId, remaining: ValveSet, minutes: i32) -> ControlFlow<()> {
        if minutes <= 0 || remaining.is_empty() {
            let minutes = minutes.max(0).unsigned_abs();
            return self.with_step(position, minutes, |this| {
                this.complete();
                ControlFlow::Continue(())
            });
        }

        self.with_step(position, minutes.unsigned_abs(), |this| {
            for next in remaining.iter() {
                let mut rest = remaining;
                rest.remove(next);

                // Walk there, then spend a minute opening it.
                let minutes_after = match this.graph.distance(position, next) {
                    Some(distance) => minutes.saturating_sub_unsigned(distance + 1),
                    None => 0,
                };

                this.execute(next, rest, minutes_after)?;
            }
            ControlFlow::Continue(())
        })
    }

    #[inline]
    fn with_step(
        &mut self,
        valve: ValveId,
        minutes: u32,
        op: impl FnOnce(&mut Self) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        let released = Step::released(minutes, self.graph.valve(valve).flow_rate);
        let Some(score) = self.score.checked_add(released) else {
            return ControlFlow::Break(());
        };
        let old_score = std::mem::replace(&mut self.score, score);
        self.path.push((valve, minutes));

        let ret = op(self);

        self.path.pop();
        self.score = old_score;

        ret
    }

    fn complete(&mut self) {
        self.sequences_explored += 1;

        let improves = match &self.best {
            Some((_, best_score)) => self.score > *best_score,
            None => true,
        };
        if improves {
            self.best = Some((self.path.clone(), self.score));
        }
    }

    fn into_optimum(self) -> Optimum {
        let (path, score) = self.best.unwrap_or_default();
        let steps = path
            .into_iter()
            .map(|(valve, minutes_remaining)| Step {
                valve: self.graph.name(valve),
                minutes_remaining,
            })
            .collect();
        Optimum {
            sequence: Sequence { steps },
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::valves::test_support::{example_graph, name, steps};
    use crate::valves::{Error, ScannedValve};

    #[track_caller]
    fn assert_optimum(
        graph: &ValveGraph,
        start: &str,
        total_time: i32,
        candidates: Option<&[&str]>,
        expected_steps: &[(&str, u32)],
        expected_score: u64,
    ) {
        let candidates: Option<Vec<ValveName>> =
            candidates.map(|names| names.iter().map(|&valve| name(valve)).collect());
        let optimum = optimal_sequence(graph, name(start), total_time, candidates.as_deref())
            .unwrap();
        assert_eq!(optimum.sequence.steps(), steps(expected_steps));
        assert_eq!(optimum.score, expected_score);
        assert_eq!(optimum.sequence.score(graph), Ok(expected_score));
    }

    #[test]
    fn example() {
        assert_optimum(
            &example_graph(),
            "AA",
            30,
            None,
            &[
                ("AA", 30),
                ("DD", 28),
                ("BB", 25),
                ("JJ", 21),
                ("HH", 13),
                ("EE", 9),
                ("CC", 6),
            ],
            1651,
        );
    }

    #[test]
    fn no_time_scores_nothing() {
        let graph = example_graph();
        assert_optimum(&graph, "AA", 0, None, &[("AA", 0)], 0);
        assert_optimum(&graph, "AA", -4, None, &[("AA", 0)], 0);
    }

    #[test]
    fn no_candidates_scores_nothing() {
        assert_optimum(&example_graph(), "AA", 30, Some(&[]), &[("AA", 30)], 0);
    }

    #[test]
    fn explicit_candidates() {
        assert_optimum(
            &example_graph(),
            "AA",
            30,
            Some(&["BB"]),
            &[("AA", 30), ("BB", 28)],
            364,
        );
    }

    #[test]
    fn overshooting_the_budget_still_completes() {
        let graph = example_graph();
        assert_optimum(&graph, "AA", 3, Some(&["HH"]), &[("AA", 3), ("HH", 0)], 0);
        assert_optimum(&graph, "AA", 2, Some(&["DD"]), &[("AA", 2), ("DD", 0)], 0);
        assert_optimum(&graph, "AA", 3, Some(&["DD"]), &[("AA", 3), ("DD", 1)], 20);
    }

    #[test]
    fn ties_go_to_the_first_sequence_in_name_order() {
        let graph = ValveGraph::from_valves([
            ScannedValve {
                name: name("AA"),
                flow_rate: 0,
                tunnels: vec![name("BB"), name("CC")],
            },
            ScannedValve {
                name: name("BB"),
                flow_rate: 5,
                tunnels: vec![name("AA")],
            },
            ScannedValve {
                name: name("CC"),
                flow_rate: 5,
                tunnels: vec![name("AA")],
            },
        ])
        .unwrap();
        assert_optimum(
            &graph,
            "AA",
            3,
            None,
            &[("AA", 3), ("BB", 1), ("CC", 0)],
            5,
        );
    }

    #[test]
    fn unreachable_candidates_score_nothing() {
        let graph = ValveGraph::from_valves([
            ScannedValve {
                name: name("AA"),
                flow_rate: 0,
                tunnels: vec![],
            },
            ScannedValve {
                name: name("BB"),
                flow_rate: 9,
                tunnels: vec![],
            },
        ])
        .unwrap();
        assert_optimum(&graph, "AA", 30, None, &[("AA", 30), ("BB", 0)], 0);
    }

    #[test]
    fn start_valve_is_never_reopened() {
        let graph = example_graph();
        let optimum = optimal_sequence(&graph, name("BB"), 30, None).unwrap();
        let valves: Vec<ValveName> = optimum.sequence.steps().iter().map(|step| step.valve).collect();
        assert_eq!(valves[0], name("BB"));
        assert_eq!(valves.iter().collect::<HashSet<_>>().len(), valves.len());
        assert_eq!(optimum.sequence.score(&graph), Ok(optimum.score));
    }

    #[test]
    fn unknown_valves_are_rejected() {
        let graph = example_graph();
        assert_eq!(
            optimal_sequence(&graph, name("ZZ"), 30, None),
            Err(Error::UnknownValve(name("ZZ")))
        );
        assert_eq!(
            optimal_sequence(&graph, name("AA"), 30, Some(&[name("BB"), name("XX")])),
            Err(Error::UnknownValve(name("XX")))
        );
    }

    #[test]
    fn display_and_table() {
        let graph = example_graph();
        let optimum = optimal_sequence(&graph, name("AA"), 30, Some(&[name("DD"), name("BB")]))
            .unwrap();
        assert_eq!(optimum.sequence.to_string(), "AA(30) -> DD(28) -> BB(25)");

        let table = optimum.sequence.table(&graph).unwrap();
        assert_eq!(table.len(), 3);
    }

    fn two_valves(flow_rate: u32) -> ValveGraph {
        ValveGraph::from_valves([
            ScannedValve {
                name: name("AA"),
                flow_rate: 0,
                tunnels: vec![name("BB")],
            },
            ScannedValve {
                name: name("BB"),
                flow_rate,
                tunnels: vec![name("AA")],
            },
        ])
        .unwrap()
    }

    #[test]
    fn large_scores_do_not_wrap() {
        assert_optimum(
            &two_valves(200_000_000),
            "AA",
            30,
            None,
            &[("AA", 30), ("BB", 28)],
            5_600_000_000,
        );

        let minutes = u32::MAX / 2 - 2;
        assert_optimum(
            &two_valves(u32::MAX),
            "AA",
            i32::MAX,
            None,
            &[("AA", minutes + 2), ("BB", minutes)],
            u64::from(u32::MAX) * u64::from(minutes),
        );
    }

    #[test]
    fn scores_beyond_64_bits_are_rejected() {
        let chain = ["AA", "BB", "CC", "DD"];
        let graph = ValveGraph::from_valves(chain.iter().enumerate().map(|(i, &valve)| {
            let neighbors = [i.checked_sub(1), Some(i + 1)];
            ScannedValve {
                name: name(valve),
                flow_rate: if i == 0 { 0 } else { u32::MAX },
                tunnels: neighbors
                    .into_iter()
                    .flatten()
                    .filter_map(|j| chain.get(j))
                    .map(|&neighbor| name(neighbor))
                    .collect(),
            }
        }))
        .unwrap();

        assert_eq!(
            optimal_sequence(&graph, name("AA"), i32::MAX, None),
            Err(Error::ScoreOverflow)
        );

        let sequence = Sequence {
            steps: steps(&[("AA", 0), ("BB", u32::MAX), ("CC", u32::MAX)]),
        };
        assert_eq!(sequence.score(&graph), Err(Error::ScoreOverflow));
    }
}
