//! Planning the order in which to open pressure-release valves in a network
//! of tunnels, alone or together with a helper.
//!
//! The flow is: parse a scan into a [`ValveGraph`], then ask for an
//! [`optimal_sequence`] (one agent) or an [`optimal_dual_sequence`] (two
//! agents splitting the useful valves between them).

use std::fmt;
use std::str::FromStr;

mod dual;
mod graph;
mod parsing;
mod search;

pub use dual::{optimal_dual_sequence, DualOptimum};
pub use graph::{Valve, ValveGraph, ValveId, ValveSet, MAX_VALVES};
pub use parsing::{parse_scan, ScannedValve};
pub use search::{optimal_sequence, Optimum, Sequence, Step, INLINE_VALVES};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid valve name {0:?}: expected two uppercase letters")]
    InvalidValveName(String),
    #[error("unknown valve {0}")]
    UnknownValve(ValveName),
    #[error("valve {valve} has a tunnel to unknown valve {neighbor}")]
    UnknownNeighbor {
        valve: ValveName,
        neighbor: ValveName,
    },
    #[error("valve {0} is listed more than once")]
    DuplicateValve(ValveName),
    #[error("found {count} valves, but at most {max} are supported")]
    TooManyValves { count: usize, max: usize },
    #[error("could not parse valve scan: {0}")]
    Parse(String),
    #[error("pressure released does not fit in 64 bits")]
    ScoreOverflow,
}

/// The two-letter label of a valve, e.g. `AA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValveName(pub char, pub char);

impl fmt::Display for ValveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0, self.1)
    }
}

impl FromStr for ValveName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(a), Some(b), None) if a.is_ascii_uppercase() && b.is_ascii_uppercase() => {
                Ok(Self(a, b))
            }
            _ => Err(Error::InvalidValveName(s.to_owned())),
        }
    }
}
