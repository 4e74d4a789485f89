//! Shortest-path distances over a [`RoadGraph`].
//!
//! All searches are Dijkstra over edge length. Distances are only reported
//! for nodes the search has settled, so every value returned is exact and
//! unreachable nodes never appear.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap, HashSet, hash_map::Entry},
};

use log::debug;

use crate::{NodeId, RoadGraph};

mod path;

pub use path::Path;

#[derive(Debug, Clone, Copy)]
struct State {
    cost: f64,
    node: NodeId,
}

// Min-heap on cost; ties pop the lower node first so runs are reproducible.
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

#[derive(Debug, Default)]
struct Search {
    settled: HashMap<NodeId, f64>,
    predecessors: HashMap<NodeId, NodeId>,
}

/// Run Dijkstra from `source` until `stop` returns true for a settled node or
/// the reachable component is exhausted.
fn search<G, F>(graph: &G, source: NodeId, mut stop: F) -> Search
where
    G: RoadGraph + ?Sized,
    F: FnMut(NodeId) -> bool,
{
    let mut result = Search::default();
    if graph.coordinate(source).is_none() {
        return result;
    }

    let mut tentative: HashMap<NodeId, f64> = HashMap::new();
    let mut heap = BinaryHeap::new();
    tentative.insert(source, 0.0);
    heap.push(State {
        cost: 0.0,
        node: source,
    });

    while let Some(State { cost, node }) = heap.pop() {
        if result.settled.contains_key(&node) {
            continue;
        }
        if tentative.get(&node).is_some_and(|best| cost > *best) {
            continue;
        }
        result.settled.insert(node, cost);
        if stop(node) {
            break;
        }

        for (next, length) in graph.neighbours(node) {
            if result.settled.contains_key(&next) {
                continue;
            }
            let next_cost = cost + length;
            let improved = match tentative.entry(next) {
                Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    true
                }
                Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        true
                    } else {
                        false
                    }
                }
            };
            if improved {
                result.predecessors.insert(next, node);
                heap.push(State {
                    cost: next_cost,
                    node: next,
                });
            }
        }
    }

    result
}

/// Minimum network distance from `source` to every reachable node.
///
/// `source` maps to `0.0`. Nodes absent from the map are unreachable. A
/// handle that is not part of the graph yields an empty map.
///
/// # Examples
///
/// ```rust
/// use dockroute_core::{NodeId, shortest_distances, test_support::line_graph};
///
/// // A -5- B -3- C -2- D
/// let graph = line_graph()?;
/// let distances = shortest_distances(&graph, NodeId::new(0));
/// assert_eq!(distances[&NodeId::new(0)], 0.0);
/// assert_eq!(distances[&NodeId::new(3)], 10.0);
/// # Ok::<(), dockroute_core::DataIntegrityError>(())
/// ```
pub fn shortest_distances<G>(graph: &G, source: NodeId) -> HashMap<NodeId, f64>
where
    G: RoadGraph + ?Sized,
{
    search(graph, source, |_| false).settled
}

/// Distances from `source`, stopping once every reachable target is settled.
///
/// The result always holds the exact distance of each reachable target and
/// may hold other settled nodes. Unreachable targets are absent.
pub fn shortest_distances_to<G>(
    graph: &G,
    source: NodeId,
    targets: &[NodeId],
) -> HashMap<NodeId, f64>
where
    G: RoadGraph + ?Sized,
{
    let mut remaining: HashSet<NodeId> = targets.iter().copied().collect();
    let result = search(graph, source, |node| {
        remaining.remove(&node);
        remaining.is_empty()
    });
    debug!(
        "settled {} nodes from {source}; {} of {} targets unreachable",
        result.settled.len(),
        remaining.len(),
        targets.len()
    );
    result.settled
}

/// Shortest path between two nodes, or `None` when they are disconnected.
///
/// # Examples
///
/// ```rust
/// use dockroute_core::{NodeId, shortest_path, test_support::line_graph};
///
/// let graph = line_graph()?;
/// let path = shortest_path(&graph, NodeId::new(0), NodeId::new(2)).expect("connected");
/// assert_eq!(path.nodes, vec![NodeId::new(0), NodeId::new(1), NodeId::new(2)]);
/// assert_eq!(path.length, 8.0);
/// # Ok::<(), dockroute_core::DataIntegrityError>(())
/// ```
pub fn shortest_path<G>(graph: &G, from: NodeId, to: NodeId) -> Option<Path>
where
    G: RoadGraph + ?Sized,
{
    let result = search(graph, from, |node| node == to);
    let length = *result.settled.get(&to)?;

    let mut nodes = vec![to];
    let mut current = to;
    while current != from {
        current = *result.predecessors.get(&current)?;
        nodes.push(current);
    }
    nodes.reverse();
    Some(Path { nodes, length })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{disconnected_graph, line_graph};
    use crate::{StreetGraph, StreetGraphBuilder};
    use geo::Coord;
    use rstest::{fixture, rstest};

    #[fixture]
    fn line() -> StreetGraph {
        line_graph().expect("line graph fixture")
    }

    fn n(index: usize) -> NodeId {
        NodeId::new(index)
    }

    #[rstest]
    fn line_distances_accumulate(line: StreetGraph) {
        let distances = shortest_distances(&line, n(0));
        assert_eq!(distances.len(), 4);
        assert_eq!(distances[&n(0)], 0.0);
        assert_eq!(distances[&n(1)], 5.0);
        assert_eq!(distances[&n(2)], 8.0);
        assert_eq!(distances[&n(3)], 10.0);
    }

    #[rstest]
    fn unreachable_nodes_are_absent() {
        let graph = disconnected_graph().expect("disconnected graph fixture");
        let distances = shortest_distances(&graph, n(0));
        assert_eq!(distances.len(), 2);
        assert!(!distances.contains_key(&n(2)));
        assert!(!distances.contains_key(&n(3)));
    }

    #[rstest]
    fn unknown_source_yields_nothing(line: StreetGraph) {
        assert!(shortest_distances(&line, n(40)).is_empty());
        assert!(shortest_path(&line, n(40), n(0)).is_none());
    }

    #[rstest]
    fn targeted_search_stops_early(line: StreetGraph) {
        let distances = shortest_distances_to(&line, n(0), &[n(1)]);
        assert_eq!(distances.get(&n(1)), Some(&5.0));
        assert!(!distances.contains_key(&n(3)));
    }

    #[rstest]
    fn targeted_search_reports_exact_target_distances(line: StreetGraph) {
        let distances = shortest_distances_to(&line, n(3), &[n(0), n(2)]);
        assert_eq!(distances[&n(0)], 10.0);
        assert_eq!(distances[&n(2)], 2.0);
    }

    #[rstest]
    fn shorter_detour_beats_direct_edge() {
        let mut builder = StreetGraphBuilder::new();
        let a = builder.add_node(Coord { x: 0.0, y: 0.0 }).expect("node");
        let b = builder.add_node(Coord { x: 0.01, y: 0.0 }).expect("node");
        let c = builder.add_node(Coord { x: 0.005, y: 0.01 }).expect("node");
        builder.add_edge(a, b, 10.0).expect("edge");
        builder.add_edge(a, c, 3.0).expect("edge");
        builder.add_edge(c, b, 4.0).expect("edge");
        let graph = builder.build();

        let path = shortest_path(&graph, a, b).expect("connected");
        assert_eq!(path.nodes, vec![a, c, b]);
        assert_eq!(path.length, 7.0);
    }

    #[rstest]
    fn path_to_self_is_a_single_node(line: StreetGraph) {
        let path = shortest_path(&line, n(2), n(2)).expect("trivially connected");
        assert_eq!(path, Path::trivial(n(2)));
    }

    #[rstest]
    fn path_across_components_is_none() {
        let graph = disconnected_graph().expect("disconnected graph fixture");
        assert!(shortest_path(&graph, n(0), n(3)).is_none());
    }

    #[rstest]
    fn path_coordinates_follow_nodes(line: StreetGraph) {
        let path = shortest_path(&line, n(3), n(1)).expect("connected");
        let coords = path.coordinates(&line);
        assert_eq!(coords.len(), 3);
        assert_eq!(Some(coords[0]), line.coordinate(n(3)));
        assert_eq!(Some(coords[2]), line.coordinate(n(1)));
    }
}
