//! Bike-share docks.

use std::fmt;

use geo::Coord;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a dock within its dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct DockId(pub u32);

impl fmt::Display for DockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dock #{}", self.0)
    }
}

/// A physical bike-share station with a fixed location and finite capacity.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use dockroute_core::{Dock, DockId};
///
/// let dock = Dock::new(DockId(7), "Plaza del Ayuntamiento", Coord { x: -0.3763, y: 39.4699 }, 20);
/// assert_eq!(dock.id, DockId(7));
/// assert_eq!(dock.capacity, 20);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dock {
    /// Dataset identifier.
    pub id: DockId,
    /// Street address or display name.
    pub address: String,
    /// Dock position.
    pub location: Coord<f64>,
    /// Total number of slots.
    pub capacity: u16,
}

impl Dock {
    /// Construct a dock.
    pub fn new(id: DockId, address: impl Into<String>, location: Coord<f64>, capacity: u16) -> Self {
        Self {
            id,
            address: address.into(),
            location,
            capacity,
        }
    }

    /// Return the locations of `docks` in input order.
    ///
    /// The ranker identifies docks by their position in this list.
    pub fn locations(docks: &[Self]) -> Vec<Coord<f64>> {
        docks.iter().map(|dock| dock.location).collect()
    }
}
