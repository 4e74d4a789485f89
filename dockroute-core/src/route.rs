//! Three-leg bike-share routes.
//!
//! A route walks from the origin to the pickup dock, rides between the two
//! docks and walks from the drop-off dock to the destination. Each leg is an
//! independent shortest path over the same graph.

use std::fmt;

use geo::Coord;
use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{NodeId, Path, PlanError, RoadGraph, resolve, shortest_path};

/// Which part of the trip a leg covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum LegKind {
    /// Origin to pickup dock.
    ToPickup,
    /// Pickup dock to drop-off dock.
    BetweenDocks,
    /// Drop-off dock to destination.
    FromDropoff,
}

impl fmt::Display for LegKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ToPickup => "origin to pickup dock",
            Self::BetweenDocks => "pickup dock to drop-off dock",
            Self::FromDropoff => "drop-off dock to destination",
        })
    }
}

/// One shortest path within a route.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Leg {
    /// Part of the trip this leg covers.
    pub kind: LegKind,
    /// Visited nodes in travel order; never empty.
    pub nodes: Vec<NodeId>,
    /// Leg length in metres.
    pub length: f64,
}

impl Leg {
    fn from_path(kind: LegKind, path: Path) -> Self {
        Self {
            kind,
            nodes: path.nodes,
            length: path.length,
        }
    }

    /// Project the leg onto coordinates for rendering.
    pub fn coordinates<G>(&self, graph: &G) -> Vec<Coord<f64>>
    where
        G: RoadGraph + ?Sized,
    {
        self.nodes
            .iter()
            .filter_map(|node| graph.coordinate(*node))
            .collect()
    }
}

/// Door-to-door route through a pickup and a drop-off dock.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Route {
    /// Origin to pickup dock.
    pub to_pickup: Leg,
    /// Pickup dock to drop-off dock.
    pub between_docks: Leg,
    /// Drop-off dock to destination.
    pub from_dropoff: Leg,
}

impl Route {
    /// Legs in travel order.
    #[must_use]
    pub fn legs(&self) -> [&Leg; 3] {
        [&self.to_pickup, &self.between_docks, &self.from_dropoff]
    }

    /// Sum of the three leg lengths in metres.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.legs().iter().map(|leg| leg.length).sum()
    }

    /// Coordinate sequence per leg, in travel order.
    pub fn coordinates<G>(&self, graph: &G) -> [Vec<Coord<f64>>; 3]
    where
        G: RoadGraph + ?Sized,
    {
        self.legs().map(|leg| leg.coordinates(graph))
    }
}

/// Compose the three legs of a trip.
///
/// All four points are snapped to the graph first. Coincident snapped
/// endpoints yield a one-node leg of length zero.
///
/// # Errors
///
/// Returns [`PlanError::Resolution`] when the graph is empty or a point is
/// not a finite WGS84 position, and
/// [`PlanError::Unreachable`] naming the first leg whose endpoints are
/// disconnected.
///
/// # Examples
///
/// ```rust
/// use dockroute_core::{compose_route, test_support::{LINE_COORDS, line_graph}};
///
/// let graph = line_graph()?;
/// let [a, b, c, d] = LINE_COORDS;
/// let route = compose_route(&graph, a, d, b, c)?;
/// assert_eq!(route.to_pickup.length, 5.0);
/// assert_eq!(route.between_docks.length, 3.0);
/// assert_eq!(route.from_dropoff.length, 2.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn compose_route<G>(
    graph: &G,
    origin: Coord<f64>,
    destination: Coord<f64>,
    pickup: Coord<f64>,
    dropoff: Coord<f64>,
) -> Result<Route, PlanError>
where
    G: RoadGraph + ?Sized,
{
    let origin = resolve(graph, origin)?;
    let pickup = resolve(graph, pickup)?;
    let dropoff = resolve(graph, dropoff)?;
    let destination = resolve(graph, destination)?;

    let leg = |kind: LegKind, from: NodeId, to: NodeId| {
        shortest_path(graph, from, to)
            .map(|path| Leg::from_path(kind, path))
            .ok_or(PlanError::Unreachable { leg: kind })
    };
    let route = Route {
        to_pickup: leg(LegKind::ToPickup, origin, pickup)?,
        between_docks: leg(LegKind::BetweenDocks, pickup, dropoff)?,
        from_dropoff: leg(LegKind::FromDropoff, dropoff, destination)?,
    };
    debug!("composed route of {:.1} m", route.total_length());
    Ok(route)
}
