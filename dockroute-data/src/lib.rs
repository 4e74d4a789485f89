//! Dataset loaders and service adapters for dockroute.
//!
//! Responsibilities:
//! - Load dock inventories, availability forecasts and street graph
//!   snapshots from disk into `dockroute-core` types.
//! - Provide an HTTP [`dockroute_core::Geocoder`] backed by Nominatim.
//!
//! Boundaries:
//! - Do not encode trip-planning rules (live in `dockroute-core`).
//! - Keep blocking I/O off async executors; the geocoder bridges its async
//!   client onto the caller's thread.
//!
//! Invariants:
//! - Every loader validates coordinates and lengths before handing data to
//!   the core.
//! - No global mutable state.

#![forbid(unsafe_code)]

pub mod docks;
pub mod forecast;
pub mod fs;
pub mod geocoding;
pub mod graph;

pub use docks::{DockLoadError, load_docks, parse_docks};
pub use forecast::{ForecastLoadError, ForecastSnapshot, ForecastTable};
pub use geocoding::{
    DEFAULT_BASE_URL, DEFAULT_USER_AGENT, GeocoderBuildError, NominatimConfig, NominatimGeocoder,
    parse_lat_lon,
};
pub use graph::{GraphLoadError, load_graph, parse_graph};
