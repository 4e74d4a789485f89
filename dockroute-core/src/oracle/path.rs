//! Node sequences produced by single-pair searches.

use geo::Coord;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{NodeId, RoadGraph};

/// A simple path through the graph together with its total length.
///
/// Paths are never empty: a path from a node to itself holds that single
/// node and has length zero.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Path {
    /// Visited nodes from source to target.
    pub nodes: Vec<NodeId>,
    /// Sum of traversed edge lengths in metres.
    pub length: f64,
}

impl Path {
    /// Path consisting of `node` alone.
    #[must_use]
    pub fn trivial(node: NodeId) -> Self {
        Self {
            nodes: vec![node],
            length: 0.0,
        }
    }

    /// First node of the path.
    #[must_use]
    pub fn source(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    /// Last node of the path.
    #[must_use]
    pub fn target(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Project the node sequence onto coordinates.
    ///
    /// Nodes that `graph` does not know are skipped.
    pub fn coordinates<G>(&self, graph: &G) -> Vec<Coord<f64>>
    where
        G: RoadGraph + ?Sized,
    {
        self.nodes
            .iter()
            .filter_map(|node| graph.coordinate(*node))
            .collect()
    }
}
