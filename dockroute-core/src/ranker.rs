//! Rank docks by network distance from a query point.
//!
//! Ranking is pure: it knows nothing about availability. Callers walk the
//! ranking with [`first_available`](crate::first_available) to skip docks
//! that cannot serve the trip.

use geo::Coord;
use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{NodeId, ResolutionError, RoadGraph, resolve, resolve_many, shortest_distances_to};

/// One reachable dock in a ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RankedCandidate {
    /// Position of the dock in the candidate list passed to the ranker.
    pub dock_index: usize,
    /// Dock location as supplied.
    pub location: Coord<f64>,
    /// Graph node the dock snapped to.
    pub node: NodeId,
    /// Network distance in metres from the query node.
    pub distance: f64,
}

/// Dock locations snapped to a graph once and reused across queries.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use dockroute_core::{SnappedDocks, test_support::{LINE_COORDS, line_graph}};
///
/// let graph = line_graph()?;
/// let [a, _, c, _] = LINE_COORDS;
/// let docks = SnappedDocks::new(&graph, vec![c, a])?;
///
/// let ranked = docks.rank(&graph, a)?;
/// let order: Vec<_> = ranked.iter().map(|r| (r.dock_index, r.distance)).collect();
/// assert_eq!(order, vec![(1, 0.0), (0, 8.0)]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SnappedDocks {
    locations: Vec<Coord<f64>>,
    nodes: Vec<NodeId>,
}

impl SnappedDocks {
    /// Snap `locations` to `graph`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::InvalidPoint`] for a non-finite or
    /// out-of-range location and [`ResolutionError::EmptyGraph`] when there
    /// are locations to snap and the graph has no nodes.
    pub fn new<G>(graph: &G, locations: Vec<Coord<f64>>) -> Result<Self, ResolutionError>
    where
        G: RoadGraph + ?Sized,
    {
        let nodes = resolve_many(graph, &locations)?;
        Ok(Self { locations, nodes })
    }

    /// Number of docks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Whether there are no docks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Snapped node per dock, in input order.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Rank every reachable dock by network distance from `query`.
    ///
    /// The result is sorted ascending by distance; equal distances keep input
    /// order. Docks sharing a node are all listed. Docks snapped to the query
    /// node have distance `0.0`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::InvalidPoint`] or
    /// [`ResolutionError::EmptyGraph`] when the query cannot be snapped. An
    /// empty dock set returns an empty ranking without snapping.
    pub fn rank<G>(&self, graph: &G, query: Coord<f64>) -> Result<Vec<RankedCandidate>, ResolutionError>
    where
        G: RoadGraph + ?Sized,
    {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        let source = resolve(graph, query)?;
        let distances = shortest_distances_to(graph, source, &self.nodes);

        let mut ranked: Vec<RankedCandidate> = self
            .locations
            .iter()
            .zip(&self.nodes)
            .enumerate()
            .filter_map(|(dock_index, (location, node))| {
                let distance = if *node == source {
                    0.0
                } else {
                    *distances.get(node)?
                };
                Some(RankedCandidate {
                    dock_index,
                    location: *location,
                    node: *node,
                    distance,
                })
            })
            .collect();
        ranked.sort_by(|left, right| left.distance.total_cmp(&right.distance));

        debug!(
            "ranked {} of {} docks from {source}",
            ranked.len(),
            self.len()
        );
        Ok(ranked)
    }
}

/// Rank `docks` by network distance from `query`.
///
/// Convenience wrapper snapping the docks on every call; prefer
/// [`SnappedDocks`] when ranking repeatedly against the same dock set.
///
/// # Errors
///
/// Returns [`ResolutionError::EmptyGraph`] when `docks` is non-empty and the
/// graph has no nodes, and [`ResolutionError::InvalidPoint`] when the query
/// or a dock is not a finite WGS84 position.
pub fn rank_stations<G>(
    graph: &G,
    query: Coord<f64>,
    docks: &[Coord<f64>],
) -> Result<Vec<RankedCandidate>, ResolutionError>
where
    G: RoadGraph + ?Sized,
{
    if docks.is_empty() {
        return Ok(Vec::new());
    }
    SnappedDocks::new(graph, docks.to_vec())?.rank(graph, query)
}
