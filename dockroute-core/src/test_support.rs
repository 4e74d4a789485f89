//! Fixtures shared by unit, behaviour and downstream-crate tests.

use std::{
    cell::Cell,
    collections::{HashMap, HashSet},
};

use geo::Coord;

use crate::{
    DataIntegrityError, Dock, DockAvailability, DockId, GeocodeError, Geocoder, NodeId,
    StreetGraph, StreetGraphBuilder,
};

/// Node coordinates of [`line_graph`], in node order A, B, C, D.
pub const LINE_COORDS: [Coord<f64>; 4] = [
    Coord { x: -0.40, y: 39.47 },
    Coord { x: -0.39, y: 39.47 },
    Coord { x: -0.38, y: 39.47 },
    Coord { x: -0.37, y: 39.47 },
];

/// Node coordinates of [`disconnected_graph`], in node order A, B, C, D.
pub const DISCONNECTED_COORDS: [Coord<f64>; 4] = [
    Coord { x: -0.40, y: 39.50 },
    Coord { x: -0.39, y: 39.50 },
    Coord { x: -0.30, y: 39.40 },
    Coord { x: -0.29, y: 39.40 },
];

/// Line graph `A -5- B -3- C -2- D`.
pub fn line_graph() -> Result<StreetGraph, DataIntegrityError> {
    chain(&LINE_COORDS, &[(0, 1, 5.0), (1, 2, 3.0), (2, 3, 2.0)])
}

/// Two components, `A -4- B` and `C -6- D`.
pub fn disconnected_graph() -> Result<StreetGraph, DataIntegrityError> {
    chain(&DISCONNECTED_COORDS, &[(0, 1, 4.0), (2, 3, 6.0)])
}

fn chain(
    coords: &[Coord<f64>],
    edges: &[(usize, usize, f64)],
) -> Result<StreetGraph, DataIntegrityError> {
    let mut builder = StreetGraphBuilder::new();
    let nodes = coords
        .iter()
        .map(|coord| builder.add_node(*coord))
        .collect::<Result<Vec<_>, _>>()?;
    for &(from, to, length) in edges {
        let endpoint = |index: usize| {
            nodes
                .get(index)
                .copied()
                .ok_or(DataIntegrityError::UnknownNode {
                    node: NodeId::new(index),
                })
        };
        builder.add_edge(endpoint(from)?, endpoint(to)?, length)?;
    }
    Ok(builder.build())
}

/// Dock with ten slots and a generated address.
pub fn dock(id: u32, location: Coord<f64>) -> Dock {
    Dock::new(DockId(id), format!("Dock {id}"), location, 10)
}

/// In-memory `Geocoder` counting how often it is consulted.
#[derive(Debug, Default)]
pub struct MemoryGeocoder {
    entries: HashMap<String, Coord<f64>>,
    failure: Option<GeocodeError>,
    calls: Cell<usize>,
}

impl MemoryGeocoder {
    /// Geocoder that knows no addresses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Geocoder failing every lookup with `error`.
    pub fn failing(error: GeocodeError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Register `address` at `coord`.
    #[must_use]
    pub fn with_entry(mut self, address: &str, coord: Coord<f64>) -> Self {
        self.entries.insert(address.to_owned(), coord);
        self
    }

    /// Number of lookups served so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Geocoder for MemoryGeocoder {
    fn geocode(&self, address: &str) -> Result<Option<Coord<f64>>, GeocodeError> {
        self.calls.set(self.calls.get() + 1);
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(self.entries.get(address).copied()),
        }
    }
}

/// Availability with explicit sets of docks holding bikes and free slots.
#[derive(Debug, Default, Clone)]
pub struct FixedAvailability {
    bikes: HashSet<DockId>,
    slots: HashSet<DockId>,
}

impl FixedAvailability {
    /// No dock has bikes or slots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `docks` as holding a bike.
    #[must_use]
    pub fn with_bikes(mut self, docks: impl IntoIterator<Item = DockId>) -> Self {
        self.bikes.extend(docks);
        self
    }

    /// Mark `docks` as having a free slot.
    #[must_use]
    pub fn with_slots(mut self, docks: impl IntoIterator<Item = DockId>) -> Self {
        self.slots.extend(docks);
        self
    }
}

impl DockAvailability for FixedAvailability {
    fn has_bike(&self, dock: &Dock) -> bool {
        self.bikes.contains(&dock.id)
    }

    fn has_slot(&self, dock: &Dock) -> bool {
        self.slots.contains(&dock.id)
    }
}
