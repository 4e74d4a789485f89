//! End-to-end trip planning.
//!
//! [`TripPlanner`] owns the road graph and the dock set, snaps the docks once
//! and answers any number of origin/destination queries against them.

use geo::Coord;
use log::info;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    DataIntegrityError, Dock, DockAvailability, GeocodeCache, Geocoder, PlanError, Purpose,
    RankedCandidate, RoadGraph, Route, SnappedDocks, compose_route, first_available,
};

/// A dock chosen for one end of the trip.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlannedDock {
    /// The chosen dock.
    pub dock: Dock,
    /// Network distance in metres from the query point's node.
    pub distance: f64,
    /// Number of nearer docks skipped because they were unavailable.
    pub skipped: usize,
}

/// A complete plan ready for rendering.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TripPlan {
    /// Where the trip starts.
    pub origin: Coord<f64>,
    /// Where the trip ends.
    pub destination: Coord<f64>,
    /// Dock to collect the bike from.
    pub pickup: PlannedDock,
    /// Dock to return the bike to.
    pub dropoff: PlannedDock,
    /// The three legs as node sequences.
    pub route: Route,
    /// The three legs as coordinate sequences, in travel order.
    pub geometry: [Vec<Coord<f64>>; 3],
}

impl TripPlan {
    /// Total route length in metres.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.route.total_length()
    }
}

/// Plans trips over a fixed graph and dock set.
///
/// # Examples
///
/// ```rust
/// use dockroute_core::{AlwaysAvailable, Dock, DockId, TripPlanner};
/// use dockroute_core::test_support::{LINE_COORDS, line_graph};
///
/// let [a, b, c, d] = LINE_COORDS;
/// let docks = vec![
///     Dock::new(DockId(1), "Dock B", b, 10),
///     Dock::new(DockId(2), "Dock C", c, 10),
/// ];
/// let planner = TripPlanner::new(line_graph()?, docks)?;
/// let plan = planner.plan(a, d, &AlwaysAvailable)?;
///
/// assert_eq!(plan.pickup.dock.id, DockId(1));
/// assert_eq!(plan.dropoff.dock.id, DockId(2));
/// assert_eq!(plan.total_length(), 10.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct TripPlanner<G> {
    graph: G,
    docks: Vec<Dock>,
    snapped: SnappedDocks,
}

impl<G: RoadGraph> TripPlanner<G> {
    /// Validate and snap `docks` against `graph`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::DataIntegrity`] for docks with invalid
    /// coordinates and [`PlanError::Resolution`] when there are docks but the
    /// graph is empty.
    pub fn new(graph: G, docks: Vec<Dock>) -> Result<Self, PlanError> {
        for dock in &docks {
            DataIntegrityError::check_coordinate(dock.location)?;
        }
        let snapped = SnappedDocks::new(&graph, Dock::locations(&docks))?;
        info!(
            "snapped {} docks onto a graph of {} nodes",
            docks.len(),
            graph.node_count()
        );
        Ok(Self {
            graph,
            docks,
            snapped,
        })
    }

    /// The road graph.
    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// The dock set in input order.
    pub fn docks(&self) -> &[Dock] {
        &self.docks
    }

    /// Rank every reachable dock by network distance from `point`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Resolution`] when `point` is not a finite WGS84
    /// position or cannot be snapped.
    pub fn rank(&self, point: Coord<f64>) -> Result<Vec<RankedCandidate>, PlanError> {
        Ok(self.snapped.rank(&self.graph, point)?)
    }

    /// Plan a trip between two coordinates.
    ///
    /// The pickup is the nearest dock to `origin` with a bike; the drop-off
    /// is the nearest dock to `destination` with a free slot.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::NoAvailableStation`] when no reachable dock
    /// qualifies, [`PlanError::Unreachable`] when a leg cannot be routed and
    /// [`PlanError::Resolution`] when the graph is empty or either endpoint
    /// is not a finite WGS84 position.
    pub fn plan<A>(
        &self,
        origin: Coord<f64>,
        destination: Coord<f64>,
        availability: &A,
    ) -> Result<TripPlan, PlanError>
    where
        A: DockAvailability + ?Sized,
    {
        let pickup = self.choose(origin, Purpose::Pickup, availability)?;
        let dropoff = self.choose(destination, Purpose::Dropoff, availability)?;
        let route = compose_route(
            &self.graph,
            origin,
            destination,
            pickup.dock.location,
            dropoff.dock.location,
        )?;
        let geometry = route.coordinates(&self.graph);
        info!(
            "planned trip via {} and {} ({:.0} m)",
            pickup.dock.id,
            dropoff.dock.id,
            route.total_length()
        );
        Ok(TripPlan {
            origin,
            destination,
            pickup,
            dropoff,
            route,
            geometry,
        })
    }

    /// Geocode both addresses through `cache` and plan a trip between them.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Resolution`] when either address cannot be
    /// geocoded, plus every error of [`TripPlanner::plan`].
    pub fn plan_addresses<C, A>(
        &self,
        cache: &mut GeocodeCache,
        geocoder: &C,
        origin: &str,
        destination: &str,
        availability: &A,
    ) -> Result<TripPlan, PlanError>
    where
        C: Geocoder + ?Sized,
        A: DockAvailability + ?Sized,
    {
        let origin = cache.resolve(geocoder, origin)?;
        let destination = cache.resolve(geocoder, destination)?;
        self.plan(origin, destination, availability)
    }

    fn choose<A>(
        &self,
        point: Coord<f64>,
        purpose: Purpose,
        availability: &A,
    ) -> Result<PlannedDock, PlanError>
    where
        A: DockAvailability + ?Sized,
    {
        let ranked = self.rank(point)?;
        let mut skipped = 0;
        let chosen = first_available(&ranked, purpose, |candidate| {
            let usable = self
                .docks
                .get(candidate.dock_index)
                .is_some_and(|dock| availability.is_available(dock, purpose));
            if !usable {
                skipped += 1;
            }
            usable
        })?;
        let dock = self
            .docks
            .get(chosen.dock_index)
            .cloned()
            .ok_or(PlanError::NoAvailableStation { purpose })?;
        Ok(PlannedDock {
            dock,
            distance: chosen.distance,
            skipped,
        })
    }
}
