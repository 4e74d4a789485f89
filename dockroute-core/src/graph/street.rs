//! In-memory street network backed by petgraph with an R\*-tree for snapping.

use geo::Coord;
use log::debug;
use petgraph::{
    graph::{NodeIndex, UnGraph},
    visit::EdgeRef,
};
use rstar::{RTree, primitives::GeomWithData};

use super::{NodeId, RoadGraph};
use crate::DataIntegrityError;

type NodeEntry = GeomWithData<[f64; 2], NodeId>;

/// Undirected street network with coordinate-carrying nodes.
///
/// Build one with [`StreetGraphBuilder`]. The graph is immutable once built
/// and can be shared freely between threads.
#[derive(Debug, Clone)]
pub struct StreetGraph {
    graph: UnGraph<Coord<f64>, f64>,
    index: RTree<NodeEntry>,
}

impl StreetGraph {
    /// Number of edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn node_index(&self, node: NodeId) -> Option<NodeIndex> {
        let raw = u32::try_from(node.index()).ok()?;
        let index = NodeIndex::from(raw);
        self.graph.node_weight(index).map(|_| index)
    }
}

impl RoadGraph for StreetGraph {
    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn coordinate(&self, node: NodeId) -> Option<Coord<f64>> {
        let index = self.node_index(node)?;
        self.graph.node_weight(index).copied()
    }

    fn neighbours(&self, node: NodeId) -> Box<dyn Iterator<Item = (NodeId, f64)> + '_> {
        let Some(index) = self.node_index(node) else {
            return Box::new(std::iter::empty());
        };
        Box::new(self.graph.edges(index).map(move |edge| {
            let other = if edge.source() == index {
                edge.target()
            } else {
                edge.source()
            };
            (NodeId::new(other.index()), *edge.weight())
        }))
    }

    fn nearest_node(&self, point: Coord<f64>) -> Option<NodeId> {
        if !(point.x.is_finite() && point.y.is_finite()) {
            return None;
        }
        self.index
            .nearest_neighbor(&[point.x, point.y])
            .map(|entry| entry.data)
    }
}

/// Incrementally assemble a [`StreetGraph`].
///
/// Nodes are numbered densely in insertion order. Lengths and coordinates are
/// validated as they are added so a built graph always satisfies the
/// [`RoadGraph`] contract.
#[derive(Debug, Default)]
pub struct StreetGraphBuilder {
    graph: UnGraph<Coord<f64>, f64>,
}

impl StreetGraphBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node at `location` and return its handle.
    ///
    /// # Errors
    ///
    /// Returns [`DataIntegrityError::InvalidCoordinate`] for non-finite or
    /// out-of-range coordinates.
    pub fn add_node(&mut self, location: Coord<f64>) -> Result<NodeId, DataIntegrityError> {
        DataIntegrityError::check_coordinate(location)?;
        Ok(NodeId::new(self.graph.add_node(location).index()))
    }

    /// Connect `from` and `to` with an undirected edge of `length` metres.
    ///
    /// # Errors
    ///
    /// Returns [`DataIntegrityError::UnknownNode`] if either endpoint was not
    /// created by this builder and [`DataIntegrityError::InvalidEdgeLength`]
    /// for negative or non-finite lengths.
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        length: f64,
    ) -> Result<(), DataIntegrityError> {
        let source = self.existing(from)?;
        let target = self.existing(to)?;
        if !length.is_finite() || length < 0.0 {
            return Err(DataIntegrityError::InvalidEdgeLength { from, to, length });
        }
        self.graph.add_edge(source, target, length);
        Ok(())
    }

    /// Number of nodes added so far.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Freeze the graph and build the snapping index.
    #[must_use]
    pub fn build(self) -> StreetGraph {
        let entries: Vec<NodeEntry> = self
            .graph
            .node_indices()
            .filter_map(|index| {
                self.graph
                    .node_weight(index)
                    .map(|coord| GeomWithData::new([coord.x, coord.y], NodeId::new(index.index())))
            })
            .collect();
        debug!(
            "built street graph with {} nodes and {} edges",
            self.graph.node_count(),
            self.graph.edge_count()
        );
        StreetGraph {
            index: RTree::bulk_load(entries),
            graph: self.graph,
        }
    }

    fn existing(&self, node: NodeId) -> Result<NodeIndex, DataIntegrityError> {
        u32::try_from(node.index())
            .ok()
            .map(NodeIndex::from)
            .filter(|index| self.graph.node_weight(*index).is_some())
            .ok_or(DataIntegrityError::UnknownNode { node })
    }
}
