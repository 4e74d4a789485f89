//! Facade crate for the dockroute bike-share trip planner.
//!
//! This crate re-exports the core domain types and algorithms. Dataset
//! loaders and the HTTP geocoder live in `dockroute-data`.

#![forbid(unsafe_code)]

pub use dockroute_core::{
    AlwaysAvailable, AvailabilityThresholds, DataIntegrityError, Dock, DockAvailability,
    DockForecast, DockId, GeocodeCache, GeocodeError, Geocoder, Leg, LegKind, NodeId, Path,
    PlanError, PlannedDock, Purpose, RankedCandidate, ResolutionError, RoadGraph, Route,
    SnappedDocks, StreetGraph, StreetGraphBuilder, TripPlan, TripPlanner, compose_route,
    first_available, haversine_metres, rank_stations, resolve, resolve_many, shortest_distances,
    shortest_distances_to, shortest_path,
};
