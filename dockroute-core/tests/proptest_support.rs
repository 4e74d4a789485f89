//! Proptest strategies producing small street graphs and dock sets.

use std::collections::HashSet;

use dockroute_core::{NodeId, RoadGraph, StreetGraph, StreetGraphBuilder};
use geo::Coord;
use proptest::prelude::*;

/// Raw graph description kept alongside the built graph for shrinking output.
#[derive(Debug, Clone)]
pub struct GraphCase {
    pub coords: Vec<Coord<f64>>,
    pub edges: Vec<(usize, usize, f64)>,
}

impl GraphCase {
    /// Build the described graph.
    pub fn build(&self) -> StreetGraph {
        let mut builder = StreetGraphBuilder::new();
        let nodes: Vec<NodeId> = self
            .coords
            .iter()
            .map(|coord| builder.add_node(*coord).expect("generated coordinate is valid"))
            .collect();
        for &(from, to, length) in &self.edges {
            builder
                .add_edge(nodes[from], nodes[to], length)
                .expect("generated edge is valid");
        }
        builder.build()
    }
}

fn coord_strategy() -> impl Strategy<Value = Coord<f64>> {
    (-0.45_f64..-0.30_f64, 39.40_f64..39.52_f64).prop_map(|(x, y)| Coord { x, y })
}

/// Graphs with `1..=max_nodes` nodes and integral edge lengths.
///
/// Integral lengths keep sums exact so distances compare with `==`.
pub fn graph_strategy(max_nodes: usize) -> impl Strategy<Value = GraphCase> {
    proptest::collection::vec(coord_strategy(), 1..=max_nodes).prop_flat_map(|coords| {
        let count = coords.len();
        let edge = (0..count, 0..count, 0_u16..500).prop_map(|(a, b, length)| (a, b, f64::from(length)));
        proptest::collection::vec(edge, 0..=count * 2)
            .prop_map(move |edges| GraphCase {
                coords: coords.clone(),
                edges,
            })
    })
}

/// Up to `max` dock locations inside the generated graph's bounding box.
pub fn docks_strategy(max: usize) -> impl Strategy<Value = Vec<Coord<f64>>> {
    proptest::collection::vec(coord_strategy(), 0..=max)
}

/// A query point inside the generated graph's bounding box.
pub fn query_strategy() -> impl Strategy<Value = Coord<f64>> {
    coord_strategy()
}

/// Fail the case unless consecutive path nodes are adjacent, no node repeats
/// and the cheapest connecting edges add up to `length`.
pub fn assert_valid_path(
    graph: &StreetGraph,
    nodes: &[NodeId],
    length: f64,
) -> Result<(), TestCaseError> {
    let unique: HashSet<_> = nodes.iter().collect();
    prop_assert_eq!(unique.len(), nodes.len(), "path revisits a node");

    let mut total = 0.0;
    for pair in nodes.windows(2) {
        let cheapest = graph
            .neighbours(pair[0])
            .filter(|(next, _)| *next == pair[1])
            .map(|(_, weight)| weight)
            .min_by(f64::total_cmp);
        prop_assert!(cheapest.is_some(), "path steps between non-adjacent nodes");
        total += cheapest.unwrap_or_default();
    }
    prop_assert_eq!(total, length);
    Ok(())
}
