//! Road graph abstraction and coordinate snapping.
//!
//! [`RoadGraph`] is the seam between the routing algorithms and whatever
//! holds the street network. [`StreetGraph`] is the in-memory implementation
//! used by the planner and the data loaders.

use std::fmt;

use geo::Coord;
use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{DataIntegrityError, ResolutionError, haversine_metres};

mod street;

pub use street::{StreetGraph, StreetGraphBuilder};

/// Opaque handle to a node of a [`RoadGraph`].
///
/// Handles are only meaningful for the graph that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct NodeId(usize);

impl NodeId {
    /// Wrap a dense node index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the dense node index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}", self.0)
    }
}

/// Weighted, undirected road network whose nodes carry coordinates.
///
/// Edge lengths are metres and must be finite and non-negative; the
/// shortest-path routines rely on it.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use dockroute_core::{RoadGraph, StreetGraphBuilder};
///
/// let mut builder = StreetGraphBuilder::new();
/// let a = builder.add_node(Coord { x: 0.0, y: 0.0 })?;
/// let b = builder.add_node(Coord { x: 0.01, y: 0.0 })?;
/// builder.add_edge(a, b, 850.0)?;
/// let graph = builder.build();
///
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.neighbours(a).collect::<Vec<_>>(), vec![(b, 850.0)]);
/// assert_eq!(graph.nearest_node(Coord { x: 0.009, y: 0.0 }), Some(b));
/// # Ok::<(), dockroute_core::DataIntegrityError>(())
/// ```
pub trait RoadGraph {
    /// Number of nodes in the graph.
    fn node_count(&self) -> usize;

    /// Coordinate of `node`, or `None` when the handle is not part of the graph.
    fn coordinate(&self, node: NodeId) -> Option<Coord<f64>>;

    /// Nodes adjacent to `node` together with the connecting edge length.
    ///
    /// Parallel edges are reported individually.
    fn neighbours(&self, node: NodeId) -> Box<dyn Iterator<Item = (NodeId, f64)> + '_>;

    /// Node closest to `point`, or `None` for an empty graph or a
    /// non-finite point.
    ///
    /// Implementations must be deterministic: the same point always snaps to
    /// the same node.
    fn nearest_node(&self, point: Coord<f64>) -> Option<NodeId>;

    /// Whether the graph has no nodes.
    fn is_empty(&self) -> bool {
        self.node_count() == 0
    }
}

/// Snap `point` to its closest graph node.
///
/// # Errors
///
/// Returns [`ResolutionError::InvalidPoint`] when `point` is not a finite
/// WGS84 position and [`ResolutionError::EmptyGraph`] when the graph has no
/// nodes.
pub fn resolve<G>(graph: &G, point: Coord<f64>) -> Result<NodeId, ResolutionError>
where
    G: RoadGraph + ?Sized,
{
    if DataIntegrityError::check_coordinate(point).is_err() {
        return Err(ResolutionError::InvalidPoint {
            latitude: point.y,
            longitude: point.x,
        });
    }
    let node = graph
        .nearest_node(point)
        .ok_or(ResolutionError::EmptyGraph)?;
    if let Some(snapped) = graph.coordinate(node) {
        debug!(
            "snapped ({:.6}, {:.6}) to {node} {:.1} m away",
            point.y,
            point.x,
            haversine_metres(point, snapped)
        );
    }
    Ok(node)
}

/// Snap every point in `points`, preserving order and duplicates.
///
/// # Errors
///
/// Returns [`ResolutionError::EmptyGraph`] when `points` is non-empty and the
/// graph has no nodes.
pub fn resolve_many<G>(graph: &G, points: &[Coord<f64>]) -> Result<Vec<NodeId>, ResolutionError>
where
    G: RoadGraph + ?Sized,
{
    points.iter().map(|point| resolve(graph, *point)).collect()
}
