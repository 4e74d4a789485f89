//! Street graph snapshot loader.
//!
//! A snapshot is a JSON document:
//!
//! ```json
//! {
//!   "nodes": [{ "id": 1, "lat": 39.4699, "lon": -0.3763 }],
//!   "edges": [{ "from": 1, "to": 2, "length": 120.5 }]
//! }
//! ```
//!
//! Node ids are arbitrary integers (typically OSM ids). Edges are undirected
//! and `length` is in metres; when omitted it defaults to the great-circle
//! distance between the endpoints.

use std::{
    collections::{HashMap, hash_map::Entry},
    io,
};

use camino::{Utf8Path, Utf8PathBuf};
use dockroute_core::{
    DataIntegrityError, NodeId, RoadGraph, StreetGraph, StreetGraphBuilder, haversine_metres,
};
use geo::Coord;
use log::info;
use serde::Deserialize;
use thiserror::Error;

use crate::fs;

/// Errors raised while loading a street graph snapshot.
#[derive(Debug, Error)]
pub enum GraphLoadError {
    /// The file could not be read.
    #[error("failed to read street graph {path}")]
    Io {
        /// Snapshot path.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The document is not a valid snapshot.
    #[error("failed to parse street graph {path}")]
    Json {
        /// Snapshot path.
        path: Utf8PathBuf,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// Two nodes share an identifier.
    #[error("duplicate node id {id} in {path}")]
    DuplicateNode {
        /// Snapshot path.
        path: Utf8PathBuf,
        /// Repeated identifier.
        id: u64,
    },
    /// A node or edge violates a graph invariant.
    #[error("invalid street graph {path}")]
    Integrity {
        /// Snapshot path.
        path: Utf8PathBuf,
        /// Violated constraint.
        #[source]
        source: DataIntegrityError,
    },
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    nodes: Vec<NodeRecord>,
    #[serde(default)]
    edges: Vec<EdgeRecord>,
}

#[derive(Debug, Deserialize)]
struct NodeRecord {
    id: u64,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct EdgeRecord {
    from: u64,
    to: u64,
    length: Option<f64>,
}

/// Build a graph from snapshot JSON `content`; `path` is only used for error
/// context.
///
/// # Errors
///
/// Returns [`GraphLoadError::Json`] for malformed documents,
/// [`GraphLoadError::DuplicateNode`] for repeated node ids and
/// [`GraphLoadError::Integrity`] for invalid coordinates, negative or
/// non-finite lengths and edges naming unknown nodes.
///
/// # Examples
/// ```
/// use camino::Utf8Path;
/// use dockroute_core::RoadGraph;
/// use dockroute_data::parse_graph;
///
/// let json = r#"{
///     "nodes": [
///         { "id": 10, "lat": 39.4699, "lon": -0.3763 },
///         { "id": 20, "lat": 39.4702, "lon": -0.3740 }
///     ],
///     "edges": [{ "from": 10, "to": 20, "length": 200.0 }]
/// }"#;
/// let graph = parse_graph(json, Utf8Path::new("graph.json"))?;
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 1);
/// # Ok::<(), dockroute_data::GraphLoadError>(())
/// ```
pub fn parse_graph(content: &str, path: &Utf8Path) -> Result<StreetGraph, GraphLoadError> {
    let snapshot: Snapshot =
        serde_json::from_str(content).map_err(|source| GraphLoadError::Json {
            path: path.to_owned(),
            source,
        })?;
    let integrity = |source| GraphLoadError::Integrity {
        path: path.to_owned(),
        source,
    };

    let mut builder = StreetGraphBuilder::new();
    let mut nodes: HashMap<u64, (NodeId, Coord<f64>)> = HashMap::with_capacity(snapshot.nodes.len());
    for record in snapshot.nodes {
        let location = Coord {
            x: record.lon,
            y: record.lat,
        };
        match nodes.entry(record.id) {
            Entry::Occupied(_) => {
                return Err(GraphLoadError::DuplicateNode {
                    path: path.to_owned(),
                    id: record.id,
                });
            }
            Entry::Vacant(entry) => {
                let node = builder.add_node(location).map_err(integrity)?;
                entry.insert((node, location));
            }
        }
    }

    for edge in snapshot.edges {
        let endpoint = |id: u64| {
            nodes
                .get(&id)
                .copied()
                .ok_or(DataIntegrityError::UnknownNodeId { id })
        };
        let (from, from_location) = endpoint(edge.from).map_err(integrity)?;
        let (to, to_location) = endpoint(edge.to).map_err(integrity)?;
        let length = edge
            .length
            .unwrap_or_else(|| haversine_metres(from_location, to_location));
        builder.add_edge(from, to, length).map_err(integrity)?;
    }
    Ok(builder.build())
}

/// Load the street graph snapshot at `path`.
///
/// # Errors
///
/// Returns [`GraphLoadError::Io`] when the file cannot be read, otherwise as
/// [`parse_graph`].
pub fn load_graph(path: &Utf8Path) -> Result<StreetGraph, GraphLoadError> {
    let content = fs::read_to_string(path).map_err(|source| GraphLoadError::Io {
        path: path.to_owned(),
        source,
    })?;
    let graph = parse_graph(&content, path)?;
    info!(
        "loaded street graph with {} nodes and {} edges from {path}",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockroute_core::shortest_path;
    use rstest::rstest;

    fn path() -> &'static Utf8Path {
        Utf8Path::new("graph.json")
    }

    const TRIANGLE: &str = r#"{
        "nodes": [
            { "id": 100, "lat": 39.47, "lon": -0.40 },
            { "id": 200, "lat": 39.47, "lon": -0.39 },
            { "id": 300, "lat": 39.48, "lon": -0.39 }
        ],
        "edges": [
            { "from": 100, "to": 200, "length": 5.0 },
            { "from": 200, "to": 300, "length": 4.0 },
            { "from": 100, "to": 300, "length": 20.0 }
        ]
    }"#;

    #[rstest]
    fn builds_an_undirected_graph() {
        let graph = parse_graph(TRIANGLE, path()).expect("valid snapshot");
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);

        let from = graph
            .nearest_node(Coord { x: -0.39, y: 39.48 })
            .expect("node near 300");
        let to = graph
            .nearest_node(Coord { x: -0.40, y: 39.47 })
            .expect("node near 100");
        let route = shortest_path(&graph, from, to).expect("connected");
        assert_eq!(route.length, 9.0);
    }

    #[rstest]
    fn missing_lengths_default_to_great_circle_distance() {
        let json = r#"{
            "nodes": [
                { "id": 1, "lat": 0.0, "lon": 0.0 },
                { "id": 2, "lat": 1.0, "lon": 0.0 }
            ],
            "edges": [{ "from": 1, "to": 2 }]
        }"#;
        let graph = parse_graph(json, path()).expect("valid snapshot");
        let (_, length) = graph
            .neighbours(NodeId::new(0))
            .next()
            .expect("one neighbour");
        assert!((length - 111_195.0).abs() < 100.0, "got {length}");
    }

    #[rstest]
    fn nodes_without_edges_are_kept() {
        let json = r#"{ "nodes": [{ "id": 1, "lat": 39.47, "lon": -0.37 }] }"#;
        let graph = parse_graph(json, path()).expect("valid snapshot");
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[rstest]
    fn unknown_edge_endpoints_are_rejected() {
        let json = r#"{
            "nodes": [{ "id": 1, "lat": 39.47, "lon": -0.37 }],
            "edges": [{ "from": 1, "to": 9, "length": 3.0 }]
        }"#;
        let err = parse_graph(json, path()).expect_err("unknown node");
        match err {
            GraphLoadError::Integrity { source, .. } => {
                assert_eq!(source, DataIntegrityError::UnknownNodeId { id: 9 });
            }
            other => panic!("expected integrity error, got {other:?}"),
        }
    }

    #[rstest]
    #[case::negative("-1.0")]
    #[case::huge("1e400")]
    fn invalid_lengths_are_rejected(#[case] length: &str) {
        let json = format!(
            r#"{{
                "nodes": [
                    {{ "id": 1, "lat": 39.47, "lon": -0.37 }},
                    {{ "id": 2, "lat": 39.48, "lon": -0.37 }}
                ],
                "edges": [{{ "from": 1, "to": 2, "length": {length} }}]
            }}"#
        );
        let result = parse_graph(&json, path());
        assert!(
            matches!(
                result,
                Err(GraphLoadError::Integrity { .. } | GraphLoadError::Json { .. })
            ),
            "unexpected result {result:?}"
        );
    }

    #[rstest]
    fn duplicate_node_ids_are_rejected() {
        let json = r#"{
            "nodes": [
                { "id": 1, "lat": 39.47, "lon": -0.37 },
                { "id": 1, "lat": 39.48, "lon": -0.37 }
            ]
        }"#;
        assert!(matches!(
            parse_graph(json, path()),
            Err(GraphLoadError::DuplicateNode { id: 1, .. })
        ));
    }

    #[rstest]
    fn out_of_range_nodes_are_rejected() {
        let json = r#"{ "nodes": [{ "id": 1, "lat": 120.0, "lon": -0.37 }] }"#;
        assert!(matches!(
            parse_graph(json, path()),
            Err(GraphLoadError::Integrity {
                source: DataIntegrityError::InvalidCoordinate { .. },
                ..
            })
        ));
    }

    #[rstest]
    fn malformed_documents_are_json_errors() {
        assert!(matches!(
            parse_graph("{ \"nodes\": 3 }", path()),
            Err(GraphLoadError::Json { .. })
        ));
    }
}
