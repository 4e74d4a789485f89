//! Error types shared by the planning pipeline.

use thiserror::Error;

use crate::{GeocodeError, LegKind, NodeId, Purpose};

/// Failure to turn an address or coordinate into a graph node.
///
/// Every variant renders as "location not found" so callers can surface a
/// single message to riders while logs keep the detail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolutionError {
    /// The road graph has no nodes to snap to.
    #[error("location not found: the road graph is empty")]
    EmptyGraph,
    /// The point was non-finite or outside the WGS84 range.
    #[error("location not found: invalid point (lat {latitude}, lon {longitude})")]
    InvalidPoint {
        /// Latitude in decimal degrees.
        latitude: f64,
        /// Longitude in decimal degrees.
        longitude: f64,
    },
    /// The geocoder returned no match for the address.
    #[error("location not found: {address:?}")]
    AddressNotFound {
        /// Address as supplied by the caller.
        address: String,
    },
    /// The geocoder failed while looking up the address.
    #[error("location not found: geocoding {address:?} failed")]
    Geocoder {
        /// Address as supplied by the caller.
        address: String,
        /// Underlying geocoder failure.
        #[source]
        source: GeocodeError,
    },
}

/// Malformed graph or dock input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataIntegrityError {
    /// An edge length was negative, NaN or infinite.
    #[error("edge {from} -> {to} has invalid length {length}")]
    InvalidEdgeLength {
        /// First endpoint.
        from: NodeId,
        /// Second endpoint.
        to: NodeId,
        /// Offending length in metres.
        length: f64,
    },
    /// An edge referenced a node the builder never created.
    #[error("edge references unknown {node}")]
    UnknownNode {
        /// Missing node.
        node: NodeId,
    },
    /// A dataset edge referenced a node id absent from the dataset.
    #[error("edge references unknown node id {id}")]
    UnknownNodeId {
        /// Dataset identifier of the missing node.
        id: u64,
    },
    /// A coordinate was non-finite or outside the WGS84 range.
    #[error("invalid coordinate (lat {latitude}, lon {longitude})")]
    InvalidCoordinate {
        /// Latitude in decimal degrees.
        latitude: f64,
        /// Longitude in decimal degrees.
        longitude: f64,
    },
}

impl DataIntegrityError {
    /// Check that `coord` is a finite WGS84 position.
    ///
    /// # Errors
    ///
    /// Returns [`DataIntegrityError::InvalidCoordinate`] otherwise.
    ///
    /// # Examples
    /// ```
    /// use geo::Coord;
    /// use dockroute_core::DataIntegrityError;
    ///
    /// assert!(DataIntegrityError::check_coordinate(Coord { x: -0.37, y: 39.47 }).is_ok());
    /// assert!(DataIntegrityError::check_coordinate(Coord { x: 0.0, y: 91.0 }).is_err());
    /// ```
    pub fn check_coordinate(coord: geo::Coord<f64>) -> Result<(), Self> {
        let valid = coord.x.is_finite()
            && coord.y.is_finite()
            && (-180.0..=180.0).contains(&coord.x)
            && (-90.0..=90.0).contains(&coord.y);
        if valid {
            Ok(())
        } else {
            Err(Self::InvalidCoordinate {
                latitude: coord.y,
                longitude: coord.x,
            })
        }
    }
}

/// Errors returned while planning a trip.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// An address or point could not be placed on the graph.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    /// The endpoints of a leg lie in disconnected parts of the graph.
    #[error("no route available between the given points ({leg})")]
    Unreachable {
        /// Leg that could not be routed.
        leg: LegKind,
    },
    /// Every reachable dock failed the availability check.
    #[error("no reachable dock is available for {purpose}")]
    NoAvailableStation {
        /// Whether a bike or a free slot was needed.
        purpose: Purpose,
    },
    /// Graph or dock input was malformed.
    #[error(transparent)]
    DataIntegrity(#[from] DataIntegrityError),
}
