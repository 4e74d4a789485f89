//! Dock availability and the "skip unusable docks" policy.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Dock, PlanError, RankedCandidate};

/// What the rider needs from a dock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Purpose {
    /// Collect a bike at the start of the trip.
    Pickup,
    /// Return the bike at the end of the trip.
    Dropoff,
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pickup => "pickup",
            Self::Dropoff => "drop-off",
        })
    }
}

/// Per-dock availability supplied at query time.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use dockroute_core::{Dock, DockAvailability, DockId, Purpose};
///
/// struct EvenDocksOnly;
///
/// impl DockAvailability for EvenDocksOnly {
///     fn has_bike(&self, dock: &Dock) -> bool {
///         dock.id.0 % 2 == 0
///     }
///
///     fn has_slot(&self, _dock: &Dock) -> bool {
///         true
///     }
/// }
///
/// let dock = Dock::new(DockId(3), "Calle de Colón", Coord { x: -0.37, y: 39.47 }, 15);
/// assert!(!EvenDocksOnly.is_available(&dock, Purpose::Pickup));
/// assert!(EvenDocksOnly.is_available(&dock, Purpose::Dropoff));
/// ```
pub trait DockAvailability {
    /// Whether a bike can be collected from `dock`.
    fn has_bike(&self, dock: &Dock) -> bool;

    /// Whether a bike can be returned to `dock`.
    fn has_slot(&self, dock: &Dock) -> bool;

    /// Dispatch on `purpose`.
    fn is_available(&self, dock: &Dock, purpose: Purpose) -> bool {
        match purpose {
            Purpose::Pickup => self.has_bike(dock),
            Purpose::Dropoff => self.has_slot(dock),
        }
    }
}

/// Availability source treating every dock as usable.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysAvailable;

impl DockAvailability for AlwaysAvailable {
    fn has_bike(&self, _dock: &Dock) -> bool {
        true
    }

    fn has_slot(&self, _dock: &Dock) -> bool {
        true
    }
}

/// Safety margins applied to predicted occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct AvailabilityThresholds {
    /// A dock has a bike only if the low prediction exceeds this many bikes.
    pub pickup_margin: u16,
    /// A dock has a slot only if the high prediction stays this many bikes
    /// below capacity.
    pub dropoff_margin: u16,
}

impl Default for AvailabilityThresholds {
    fn default() -> Self {
        Self {
            pickup_margin: 1,
            dropoff_margin: 1,
        }
    }
}

impl AvailabilityThresholds {
    /// Override the pickup margin.
    #[must_use]
    pub fn with_pickup_margin(mut self, margin: u16) -> Self {
        self.pickup_margin = margin;
        self
    }

    /// Override the drop-off margin.
    #[must_use]
    pub fn with_dropoff_margin(mut self, margin: u16) -> Self {
        self.dropoff_margin = margin;
        self
    }
}

/// Predicted bike count range for one dock at one time slot.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DockForecast {
    /// Lower bound of the predicted number of bikes.
    pub bikes_low: f64,
    /// Upper bound of the predicted number of bikes.
    pub bikes_high: f64,
}

impl DockForecast {
    /// Whether the pessimistic prediction leaves a bike to collect.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dockroute_core::{AvailabilityThresholds, DockForecast};
    ///
    /// let thresholds = AvailabilityThresholds::default();
    /// assert!(DockForecast { bikes_low: 2.0, bikes_high: 4.0 }.has_bike(thresholds));
    /// assert!(!DockForecast { bikes_low: 1.0, bikes_high: 4.0 }.has_bike(thresholds));
    /// ```
    #[must_use]
    pub fn has_bike(&self, thresholds: AvailabilityThresholds) -> bool {
        self.bikes_low > f64::from(thresholds.pickup_margin)
    }

    /// Whether the optimistic prediction leaves a free slot at a dock with
    /// `capacity` slots.
    #[must_use]
    pub fn has_slot(&self, capacity: u16, thresholds: AvailabilityThresholds) -> bool {
        self.bikes_high < f64::from(capacity) - f64::from(thresholds.dropoff_margin)
    }
}

/// Pick the nearest candidate satisfying `usable`.
///
/// `ranked` is expected in ranking order; the first match wins.
///
/// # Errors
///
/// Returns [`PlanError::NoAvailableStation`] when no candidate qualifies,
/// including when `ranked` is empty.
pub fn first_available<F>(
    ranked: &[RankedCandidate],
    purpose: Purpose,
    mut usable: F,
) -> Result<RankedCandidate, PlanError>
where
    F: FnMut(&RankedCandidate) -> bool,
{
    ranked
        .iter()
        .find(|candidate| usable(candidate))
        .copied()
        .ok_or(PlanError::NoAvailableStation { purpose })
}
