//! Address lookup seam and the caller-owned memo in front of it.

use std::{collections::HashMap, time::Duration};

use geo::Coord;
use log::{debug, warn};
use thiserror::Error;

use crate::{DataIntegrityError, ResolutionError};

/// Errors reported by a [`Geocoder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The service did not answer in time.
    #[error("geocoding request timed out after {timeout:?}")]
    Timeout {
        /// Timeout that elapsed.
        timeout: Duration,
    },
    /// The service answered with a non-success status.
    #[error("geocoding service returned HTTP {status}")]
    Http {
        /// HTTP status code.
        status: u16,
    },
    /// The request could not be sent or the response could not be read.
    #[error("geocoding request failed: {message}")]
    Network {
        /// Transport error description.
        message: String,
    },
    /// The response body was not in the expected format.
    #[error("failed to parse geocoding response: {message}")]
    Parse {
        /// Decoder error description.
        message: String,
    },
    /// Any other service failure.
    #[error("geocoding service error: {message}")]
    Service {
        /// Failure description.
        message: String,
    },
}

/// Turn free-text addresses into coordinates.
///
/// `Ok(None)` means the service answered but found nothing.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use dockroute_core::{GeocodeError, Geocoder};
///
/// struct TownHallOnly;
///
/// impl Geocoder for TownHallOnly {
///     fn geocode(&self, address: &str) -> Result<Option<Coord<f64>>, GeocodeError> {
///         Ok((address == "Plaza del Ayuntamiento").then_some(Coord { x: -0.3763, y: 39.4699 }))
///     }
/// }
///
/// assert!(TownHallOnly.geocode("Plaza del Ayuntamiento")?.is_some());
/// assert!(TownHallOnly.geocode("Atlantis")?.is_none());
/// # Ok::<(), GeocodeError>(())
/// ```
pub trait Geocoder {
    /// Look up `address`.
    fn geocode(&self, address: &str) -> Result<Option<Coord<f64>>, GeocodeError>;
}

/// Memo of resolved addresses plus the most recent query.
///
/// Only successful lookups are stored, so a miss is retried on the next
/// request. Keys are the trimmed address text.
#[derive(Debug, Clone, Default)]
pub struct GeocodeCache {
    entries: HashMap<String, Coord<f64>>,
    last_query: Option<String>,
}

impl GeocodeCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `address`, consulting the cache before `geocoder`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::AddressNotFound`] for blank addresses and
    /// geocoder misses, [`ResolutionError::InvalidPoint`] when the geocoder
    /// answers with a non-finite or out-of-range coordinate, and
    /// [`ResolutionError::Geocoder`] when the geocoder fails. All are logged
    /// at warn level and none is cached.
    pub fn resolve<G>(&mut self, geocoder: &G, address: &str) -> Result<Coord<f64>, ResolutionError>
    where
        G: Geocoder + ?Sized,
    {
        let key = address.trim();
        self.last_query = Some(key.to_owned());
        if key.is_empty() {
            warn!("location not found: empty address");
            return Err(ResolutionError::AddressNotFound {
                address: key.to_owned(),
            });
        }
        if let Some(coord) = self.entries.get(key) {
            debug!("geocode cache hit for {key:?}");
            return Ok(*coord);
        }

        match geocoder.geocode(key) {
            Ok(Some(coord)) if DataIntegrityError::check_coordinate(coord).is_err() => {
                warn!(
                    "location not found: geocoder placed {key:?} at invalid ({}, {})",
                    coord.y, coord.x
                );
                Err(ResolutionError::InvalidPoint {
                    latitude: coord.y,
                    longitude: coord.x,
                })
            }
            Ok(Some(coord)) => {
                debug!("geocoded {key:?} to ({:.6}, {:.6})", coord.y, coord.x);
                self.entries.insert(key.to_owned(), coord);
                Ok(coord)
            }
            Ok(None) => {
                warn!("location not found: {key:?}");
                Err(ResolutionError::AddressNotFound {
                    address: key.to_owned(),
                })
            }
            Err(source) => {
                warn!("location not found: geocoding {key:?} failed: {source}");
                Err(ResolutionError::Geocoder {
                    address: key.to_owned(),
                    source,
                })
            }
        }
    }

    /// Cached coordinate for `address`, if any.
    #[must_use]
    pub fn get(&self, address: &str) -> Option<Coord<f64>> {
        self.entries.get(address.trim()).copied()
    }

    /// Most recently requested address, whether or not it resolved.
    #[must_use]
    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// Number of cached addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no address is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every cached address and the last query.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.last_query = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryGeocoder;
    use rstest::{fixture, rstest};

    const TOWN_HALL: Coord<f64> = Coord {
        x: -0.3763,
        y: 39.4699,
    };

    #[fixture]
    fn geocoder() -> MemoryGeocoder {
        MemoryGeocoder::new().with_entry("Plaza del Ayuntamiento", TOWN_HALL)
    }

    #[rstest]
    fn hits_are_served_from_the_cache(geocoder: MemoryGeocoder) {
        let mut cache = GeocodeCache::new();
        for _ in 0..3 {
            let coord = cache
                .resolve(&geocoder, "Plaza del Ayuntamiento")
                .expect("known address");
            assert_eq!(coord, TOWN_HALL);
        }
        assert_eq!(geocoder.calls(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[rstest]
    fn surrounding_whitespace_shares_an_entry(geocoder: MemoryGeocoder) {
        let mut cache = GeocodeCache::new();
        cache
            .resolve(&geocoder, "Plaza del Ayuntamiento")
            .expect("known address");
        cache
            .resolve(&geocoder, "  Plaza del Ayuntamiento ")
            .expect("known address");
        assert_eq!(geocoder.calls(), 1);
        assert_eq!(cache.get(" Plaza del Ayuntamiento"), Some(TOWN_HALL));
    }

    #[rstest]
    fn misses_are_not_cached(geocoder: MemoryGeocoder) {
        let mut cache = GeocodeCache::new();
        for _ in 0..2 {
            let err = cache
                .resolve(&geocoder, "Atlantis")
                .expect_err("unknown address");
            assert_eq!(
                err,
                ResolutionError::AddressNotFound {
                    address: "Atlantis".into()
                }
            );
        }
        assert_eq!(geocoder.calls(), 2);
        assert!(cache.is_empty());
        assert_eq!(cache.last_query(), Some("Atlantis"));
    }

    #[rstest]
    fn geocoder_failures_are_wrapped() {
        let failure = GeocodeError::Timeout {
            timeout: Duration::from_secs(10),
        };
        let geocoder = MemoryGeocoder::failing(failure.clone());
        let mut cache = GeocodeCache::new();
        let err = cache
            .resolve(&geocoder, "Plaza del Ayuntamiento")
            .expect_err("geocoder fails");
        assert_eq!(
            err,
            ResolutionError::Geocoder {
                address: "Plaza del Ayuntamiento".into(),
                source: failure,
            }
        );
    }

    #[rstest]
    fn invalid_geocoder_coordinates_are_not_cached() {
        let geocoder = MemoryGeocoder::new().with_entry(
            "Nowhere",
            Coord {
                x: f64::NAN,
                y: f64::NAN,
            },
        );
        let mut cache = GeocodeCache::new();
        let err = cache
            .resolve(&geocoder, "Nowhere")
            .expect_err("invalid coordinate");
        assert!(matches!(err, ResolutionError::InvalidPoint { .. }));
        assert!(cache.is_empty());
    }

    #[rstest]
    fn blank_addresses_skip_the_geocoder(geocoder: MemoryGeocoder) {
        let mut cache = GeocodeCache::new();
        assert!(cache.resolve(&geocoder, "   ").is_err());
        assert_eq!(geocoder.calls(), 0);
    }

    #[rstest]
    fn clear_forgets_everything(geocoder: MemoryGeocoder) {
        let mut cache = GeocodeCache::new();
        cache
            .resolve(&geocoder, "Plaza del Ayuntamiento")
            .expect("known address");
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.last_query(), None);
    }
}
