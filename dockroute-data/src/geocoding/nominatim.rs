//! Nominatim search response types.
//!
//! See: <https://nominatim.org/release-docs/latest/api/Search/>

use dockroute_core::{DataIntegrityError, GeocodeError};
use geo::Coord;
use serde::Deserialize;

/// One entry of a `format=jsonv2` search response.
///
/// Nominatim encodes coordinates as decimal strings.
#[derive(Debug, Deserialize)]
pub struct SearchResult {
    /// Latitude in decimal degrees.
    pub lat: String,
    /// Longitude in decimal degrees.
    pub lon: String,
    /// Full display name of the match.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Body of a search response: matches, or an error object.
///
/// Nominatim reports failures either as `{"error": "text"}` or as
/// `{"error": {"code": 400, "message": "text"}}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SearchResponse {
    /// Zero or more matches, best first.
    Matches(Vec<SearchResult>),
    /// The service rejected the request.
    Failure {
        /// Error payload.
        error: ServiceError,
    },
}

/// Error payload of a failed search.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ServiceError {
    /// Structured error with an optional status code.
    Detailed {
        /// HTTP-style status code reported by the service.
        #[serde(default)]
        code: Option<u16>,
        /// Human-readable description.
        message: String,
    },
    /// Bare error text.
    Text(String),
}

impl ServiceError {
    /// Convert into a [`GeocodeError::Service`].
    #[must_use]
    pub fn into_geocode_error(self) -> GeocodeError {
        let message = match self {
            Self::Detailed {
                code: Some(code),
                message,
            } => format!("{message} (code {code})"),
            Self::Detailed { code: None, message } | Self::Text(message) => message,
        };
        GeocodeError::Service { message }
    }
}

impl SearchResult {
    /// Decode the coordinate of this match.
    pub fn coordinate(&self) -> Result<Coord<f64>, GeocodeError> {
        let parse = |value: &str, axis: &str| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|err| GeocodeError::Parse {
                    message: format!("invalid {axis} {value:?}: {err}"),
                })
        };
        let coord = Coord {
            x: parse(&self.lon, "longitude")?,
            y: parse(&self.lat, "latitude")?,
        };
        DataIntegrityError::check_coordinate(coord).map_err(|err| GeocodeError::Parse {
            message: err.to_string(),
        })?;
        Ok(coord)
    }
}
