//! Blocking Nominatim client.

use std::{io, time::Duration};

use dockroute_core::{DataIntegrityError, GeocodeError, Geocoder};
use geo::Coord;
use log::debug;
use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::{
    nominatim::{SearchResponse, SearchResult},
    parse_lat_lon,
};

/// Error type for [`NominatimGeocoder`] construction failures.
#[derive(Debug, Error)]
pub enum GeocoderBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime")]
    Runtime(#[source] io::Error),
    /// The base URL does not parse.
    #[error("invalid geocoder base URL {url:?}")]
    BaseUrl {
        /// Offending URL.
        url: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// The base URL cannot carry a path (for example, `mailto:` URLs).
    #[error("geocoder base URL {url:?} cannot carry a path")]
    NotABase {
        /// Offending URL.
        url: String,
    },
}

/// Public Nominatim instance.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Default user agent for Nominatim requests.
pub const DEFAULT_USER_AGENT: &str = "dockroute/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for [`NominatimGeocoder`].
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// Base URL of the Nominatim service; `/search` is appended.
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests. Nominatim's usage policy requires an
    /// identifying value.
    pub user_agent: String,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl NominatimConfig {
    /// Create a configuration for the service at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Geocoder backed by a Nominatim search endpoint.
///
/// Implements the synchronous [`Geocoder`] trait by blocking on an
/// asynchronous request. Outside any Tokio runtime, and inside a
/// `current_thread` runtime, the geocoder drives its own stored runtime.
/// Inside a multi-threaded runtime it uses that runtime's handle with
/// [`tokio::task::block_in_place`].
///
/// Addresses that are literal `"lat, lon"` pairs inside the valid WGS84 range
/// are answered without a request.
pub struct NominatimGeocoder {
    client: Client,
    config: NominatimConfig,
    search_url: Url,
    runtime: Runtime,
}

impl std::fmt::Debug for NominatimGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NominatimGeocoder")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("search_url", &self.search_url.as_str())
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl NominatimGeocoder {
    /// Create a geocoder for the service at `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, GeocoderBuildError> {
        Self::with_config(NominatimConfig::new(base_url))
    }

    /// Create a geocoder with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn with_config(config: NominatimConfig) -> Result<Self, GeocoderBuildError> {
        let search_url = search_endpoint(&config.base_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(GeocoderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(GeocoderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            search_url,
            runtime,
        })
    }

    /// Configuration this geocoder was built with.
    #[must_use]
    pub const fn config(&self) -> &NominatimConfig {
        &self.config
    }

    /// Build the search URL for `address`.
    fn build_search_url(&self, address: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("q", address)
            .append_pair("format", "jsonv2")
            .append_pair("limit", "1");
        url
    }

    async fn search_async(&self, address: &str) -> Result<Option<Coord<f64>>, GeocodeError> {
        let url = self.build_search_url(address);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?;

        let results = decode_response(status, &body)?;
        convert_results(address, &results)
    }

    /// Convert a reqwest error to a `GeocodeError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error) -> GeocodeError {
        if error.is_timeout() {
            return GeocodeError::Timeout {
                timeout: self.config.timeout,
            };
        }

        if let Some(status) = error.status() {
            return GeocodeError::Http {
                status: status.as_u16(),
            };
        }

        GeocodeError::Network {
            message: error.to_string(),
        }
    }
}

fn search_endpoint(base_url: &str) -> Result<Url, GeocoderBuildError> {
    let mut url = Url::parse(base_url).map_err(|source| GeocoderBuildError::BaseUrl {
        url: base_url.to_owned(),
        source,
    })?;
    url.path_segments_mut()
        .map_err(|()| GeocoderBuildError::NotABase {
            url: base_url.to_owned(),
        })?
        .pop_if_empty()
        .push("search");
    Ok(url)
}

/// Decode a search response body received with HTTP `status`.
///
/// Error bodies map to [`GeocodeError::Service`] whatever the status. Other
/// non-success responses map to [`GeocodeError::Http`].
fn decode_response(status: u16, body: &str) -> Result<Vec<SearchResult>, GeocodeError> {
    let parsed = serde_json::from_str::<SearchResponse>(body);
    match parsed {
        Ok(SearchResponse::Failure { error }) => Err(error.into_geocode_error()),
        _ if !(200..300).contains(&status) => Err(GeocodeError::Http { status }),
        Ok(SearchResponse::Matches(results)) => Ok(results),
        Err(err) => Err(GeocodeError::Parse {
            message: err.to_string(),
        }),
    }
}

/// Take the best match, if any.
fn convert_results(
    address: &str,
    results: &[SearchResult],
) -> Result<Option<Coord<f64>>, GeocodeError> {
    let Some(best) = results.first() else {
        return Ok(None);
    };
    let coord = best.coordinate()?;
    debug!(
        "nominatim matched {address:?} to {}",
        best.display_name.as_deref().unwrap_or("an unnamed place")
    );
    Ok(Some(coord))
}

impl Geocoder for NominatimGeocoder {
    /// Resolve `address` through Nominatim.
    ///
    /// # Runtime requirements
    ///
    /// When called from within an existing Tokio runtime, the runtime must be
    /// multi-threaded. Inside a `current_thread` runtime the call falls back
    /// to the internal runtime and blocks the caller's executor.
    fn geocode(&self, address: &str) -> Result<Option<Coord<f64>>, GeocodeError> {
        if let Some(coord) = parse_lat_lon(address)
            .filter(|coord| DataIntegrityError::check_coordinate(*coord).is_ok())
        {
            debug!("treating {address:?} as a literal coordinate");
            return Ok(Some(coord));
        }

        let future = self.search_async(address);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}
