//! Core domain types and algorithms for the dockroute trip planner.
//!
//! Responsibilities:
//! - Model the road graph, docks and composed routes.
//! - Snap coordinates to graph nodes and run shortest-path searches.
//! - Rank docks by network distance and pick the first one that satisfies
//!   an availability predicate.
//!
//! Boundaries:
//! - No I/O. Datasets, graph snapshots and geocoding services are adapted in
//!   `dockroute-data`; this crate only consumes them through traits.
//!
//! Coordinates are WGS84 `geo::Coord<f64>` values with `x = longitude` and
//! `y = latitude`. Edge lengths are metres.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod availability;
mod dock;
mod error;
mod geocode;
mod geometry;
pub mod graph;
mod oracle;
mod planner;
mod ranker;
mod route;

#[doc(hidden)]
pub mod test_support;

pub use availability::{
    AlwaysAvailable, AvailabilityThresholds, DockAvailability, DockForecast, Purpose,
    first_available,
};
pub use dock::{Dock, DockId};
pub use error::{DataIntegrityError, PlanError, ResolutionError};
pub use geocode::{GeocodeCache, GeocodeError, Geocoder};
pub use geometry::haversine_metres;
pub use graph::{NodeId, RoadGraph, StreetGraph, StreetGraphBuilder, resolve, resolve_many};
pub use oracle::{Path, shortest_distances, shortest_distances_to, shortest_path};
pub use planner::{PlannedDock, TripPlan, TripPlanner};
pub use ranker::{RankedCandidate, SnappedDocks, rank_stations};
pub use route::{Leg, LegKind, Route, compose_route};
