//! HTTP geocoding against a Nominatim service.
//!
//! This module provides [`NominatimGeocoder`], an implementation of
//! [`dockroute_core::Geocoder`] that resolves free-text addresses through
//! Nominatim's search endpoint.
//!
//! # Architecture
//!
//! The [`dockroute_core::Geocoder`] trait is synchronous so the planner stays
//! embeddable in synchronous contexts. The geocoder blocks on its async HTTP
//! client internally.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use dockroute_core::Geocoder;
//! use dockroute_data::{NominatimConfig, NominatimGeocoder};
//!
//! let config = NominatimConfig::default()
//!     .with_timeout(Duration::from_secs(5))
//!     .with_user_agent("my-app/1.0");
//! let geocoder = NominatimGeocoder::with_config(config)?;
//!
//! if let Some(coord) = geocoder.geocode("Plaza del Ayuntamiento, Valencia")? {
//!     println!("{}, {}", coord.y, coord.x);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use geo::Coord;

mod nominatim;
mod provider;

pub use provider::{
    DEFAULT_BASE_URL, DEFAULT_USER_AGENT, GeocoderBuildError, NominatimConfig, NominatimGeocoder,
};

/// Parse a literal `"lat, lon"` pair.
///
/// Returns `None` unless the text holds exactly two finite numbers separated
/// by a comma. Range checks are left to the caller.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use dockroute_data::parse_lat_lon;
///
/// assert_eq!(parse_lat_lon("39.4699, -0.3763"), Some(Coord { x: -0.3763, y: 39.4699 }));
/// assert_eq!(parse_lat_lon("Calle de Colón, 1"), None);
/// ```
#[must_use]
pub fn parse_lat_lon(text: &str) -> Option<Coord<f64>> {
    let (lat, lon) = text.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    (lat.is_finite() && lon.is_finite()).then_some(Coord { x: lon, y: lat })
}
