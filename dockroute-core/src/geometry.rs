//! Great-circle helpers.

use geo::{Coord, Distance, Haversine, Point};

/// Great-circle distance in metres between two WGS84 coordinates.
///
/// Ranking never uses this value. It reports how far a point sits from the
/// node it was snapped to and fills in edge lengths missing from snapshots.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use dockroute_core::haversine_metres;
///
/// let town_hall = Coord { x: -0.3763, y: 39.4699 };
/// let arts_centre = Coord { x: -0.3551, y: 39.4541 };
/// let metres = haversine_metres(town_hall, arts_centre);
/// assert!((2_400.0..2_800.0).contains(&metres));
/// ```
#[must_use]
pub fn haversine_metres(from: Coord<f64>, to: Coord<f64>) -> f64 {
    Haversine.distance(Point::from(from), Point::from(to))
}
