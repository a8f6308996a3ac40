use std::collections::HashMap;

use bitvec::BitArr;
use grid::Grid;
use index_vec::IndexVec;
use itertools::Itertools;
use pathfinding::directed::dijkstra::dijkstra_all;
use smallvec::SmallVec;

use super::{Error, Result, ScannedValve, ValveName};
use crate::debugln;

/// The largest number of valves a [`ValveGraph`] can hold, so that any subset
/// of them fits in a [`ValveSet`].
pub const MAX_VALVES: usize = 64;

type Bits = BitArr!(for MAX_VALVES, in u64);

index_vec::define_index_type! {
    /// Dense index of a valve within one [`ValveGraph`].
    ///
    /// Ids follow the lexicographic order of the valve names.
    pub struct ValveId = u32;
}

/// A set of valves of one graph.
///
/// Two sets with the same members compare and hash equal no matter how they
/// were built, which makes this usable as a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValveSet(Bits);

impl ValveSet {
    pub const EMPTY: Self = Self(Bits::ZERO);

    #[inline]
    pub fn insert(&mut self, id: ValveId) {
        self.0.set(id.index(), true);
    }

    #[inline]
    pub fn remove(&mut self, id: ValveId) {
        self.0.set(id.index(), false);
    }

    #[inline]
    pub fn contains(&self, id: ValveId) -> bool {
        self.0[id.index()]
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.not_any()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.count_ones()
    }

    /// Members in ascending id order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = ValveId> + '_ {
        self.0.iter_ones().map(ValveId::from_usize)
    }
}

impl FromIterator<ValveId> for ValveSet {
    fn from_iter<T: IntoIterator<Item = ValveId>>(iter: T) -> Self {
        let mut set = Self::EMPTY;
        for id in iter {
            set.insert(id);
        }
        set
    }
}

#[derive(Debug, Clone)]
pub struct Valve {
    pub name: ValveName,
    pub flow_rate: u32,
    /// Tunnel targets in the order they were scanned.
    pub tunnels: SmallVec<[ValveId; 4]>,
}

/// Valves, the tunnels between them, and the length of the shortest walk
/// between every pair of valves.
///
/// Immutable once built.
#[derive(Debug)]
pub struct ValveGraph {
    name_to_id: HashMap<ValveName, ValveId>,
    /// Indexed by [`ValveId`].
    valves: IndexVec<ValveId, Valve>,
    /// Row is the source, column the destination. `None` if unreachable.
    distances: Grid<Option<u32>>,
}

impl ValveGraph {
    /// Builds a graph from a flow rate per valve and the tunnels leaving each
    /// valve. Valves without an entry in `connections` have no tunnels.
    pub fn new(
        flow_rates: &HashMap<ValveName, u32>,
        connections: &HashMap<ValveName, Vec<ValveName>>,
    ) -> Result<Self> {
        if let Some(name) = connections.keys().find(|name| !flow_rates.contains_key(*name)) {
            return Err(Error::UnknownValve(*name));
        }

        Self::from_valves(flow_rates.iter().map(|(&name, &flow_rate)| ScannedValve {
            name,
            flow_rate,
            tunnels: connections.get(&name).cloned().unwrap_or_default(),
        }))
    }

    pub fn from_valves(valves: impl IntoIterator<Item = ScannedValve>) -> Result<Self> {
        let mut scanned: Vec<ScannedValve> = valves.into_iter().collect();
        scanned.sort_by_key(|valve| valve.name);

        if let Some((duplicate, _)) = scanned
            .iter()
            .tuple_windows()
            .find(|(a, b)| a.name == b.name)
        {
            return Err(Error::DuplicateValve(duplicate.name));
        }
        if scanned.len() > MAX_VALVES {
            return Err(Error::TooManyValves {
                count: scanned.len(),
                max: MAX_VALVES,
            });
        }

        let name_to_id: HashMap<ValveName, ValveId> = scanned
            .iter()
            .enumerate()
            .map(|(i, valve)| (valve.name, ValveId::from_usize(i)))
            .collect();

        let valves = scanned
            .into_iter()
            .map(|valve| -> Result<Valve> {
                let tunnels = valve
                    .tunnels
                    .iter()
                    .map(|neighbor| {
                        name_to_id
                            .get(neighbor)
                            .copied()
                            .ok_or(Error::UnknownNeighbor {
                                valve: valve.name,
                                neighbor: *neighbor,
                            })
                    })
                    .collect::<Result<_>>()?;
                Ok(Valve {
                    name: valve.name,
                    flow_rate: valve.flow_rate,
                    tunnels,
                })
            })
            .collect::<Result<IndexVec<ValveId, Valve>>>()?;

        let distances = shortest_distances(&valves);
        debugln!(
            "Built graph of {} valves ({} useful)",
            valves.len(),
            valves.iter().filter(|valve| valve.flow_rate > 0).count()
        );

        Ok(Self {
            name_to_id,
            valves,
            distances,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.valves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.valves.is_empty()
    }

    #[inline]
    pub fn id(&self, name: ValveName) -> Result<ValveId> {
        self.name_to_id
            .get(&name)
            .copied()
            .ok_or(Error::UnknownValve(name))
    }

    /// Looks up several valves at once.
    pub fn ids(&self, names: &[ValveName]) -> Result<ValveSet> {
        names.iter().map(|&name| self.id(name)).collect()
    }

    #[inline]
    pub fn valve(&self, id: ValveId) -> &Valve {
        &self.valves[id]
    }

    #[inline]
    pub fn name(&self, id: ValveId) -> ValveName {
        self.valves[id].name
    }

    /// All valve names, sorted.
    pub fn valves(&self) -> impl Iterator<Item = ValveName> + '_ {
        self.valves.iter().map(|valve| valve.name)
    }

    pub fn flow_rate(&self, name: ValveName) -> Result<u32> {
        Ok(self.valve(self.id(name)?).flow_rate)
    }

    pub fn flow_rates(&self) -> impl Iterator<Item = (ValveName, u32)> + '_ {
        self.valves.iter().map(|valve| (valve.name, valve.flow_rate))
    }

    /// Valves reachable through one tunnel from `name`, in scan order.
    pub fn connections(&self, name: ValveName) -> Result<Vec<ValveName>> {
        let valve = self.valve(self.id(name)?);
        Ok(valve.tunnels.iter().map(|&id| self.name(id)).collect())
    }

    /// The fewest tunnels to walk from `from` to `to`, or `None` if `to`
    /// cannot be reached.
    pub fn minimal_distance(&self, from: ValveName, to: ValveName) -> Result<Option<u32>> {
        Ok(self.distance(self.id(from)?, self.id(to)?))
    }

    #[inline]
    pub fn distance(&self, from: ValveId, to: ValveId) -> Option<u32> {
        self.distances
            .get(from.index(), to.index())
            .copied()
            .flatten()
    }

    /// Valves worth opening, i.e. with a positive flow rate.
    pub fn useful_valves(&self) -> ValveSet {
        self.valves
            .iter_enumerated()
            .filter(|(_, valve)| valve.flow_rate > 0)
            .map(|(id, _)| id)
            .collect()
    }

    /// The graph as scan records, sorted by name.
    pub fn scan(&self) -> Vec<ScannedValve> {
        self.valves
            .iter()
            .map(|valve| ScannedValve {
                name: valve.name,
                flow_rate: valve.flow_rate,
                tunnels: valve.tunnels.iter().map(|&id| self.name(id)).collect(),
            })
            .collect()
    }
}

/// One unit-cost shortest path search per source valve.
fn shortest_distances(valves: &IndexVec<ValveId, Valve>) -> Grid<Option<u32>> {
    let mut distances = Grid::new(valves.len(), valves.len());

    for source in valves.indices() {
        let successors = move |id: &ValveId| valves[*id].tunnels.iter().map(|&next| (next, 1u32));
        let reached = dijkstra_all(&source, successors);

        let row = std::iter::once((source, 0)).chain(
            reached
                .into_iter()
                .map(|(target, (_parent, distance))| (target, distance)),
        );
        for (target, distance) in row {
            if let Some(cell) = distances.get_mut(source.index(), target.index()) {
                *cell = Some(distance);
            }
        }
    }

    distances
}
