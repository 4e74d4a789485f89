//! Test helpers writing small datasets and stubbing the geocoder.

use super::*;
use crate::plan::{GeocoderBuilder, PlanConfig};
use camino::{Utf8Path, Utf8PathBuf};
use dockroute_core::{Geocoder, test_support::MemoryGeocoder};
use geo::Coord;
use std::fs;
use tempfile::TempDir;

/// West end of the avenue; the stub geocoder answers "Home" with it.
pub(super) const HOME: Coord<f64> = Coord { x: -0.40, y: 39.47 };
/// East end of the avenue; the stub geocoder answers "Work" with it.
pub(super) const WORK: Coord<f64> = Coord { x: -0.37, y: 39.47 };

const GRAPH: &str = r#"{
    "nodes": [
        { "id": 1, "lat": 39.47, "lon": -0.40 },
        { "id": 2, "lat": 39.47, "lon": -0.39 },
        { "id": 3, "lat": 39.47, "lon": -0.38 },
        { "id": 4, "lat": 39.47, "lon": -0.37 }
    ],
    "edges": [
        { "from": 1, "to": 2, "length": 500.0 },
        { "from": 2, "to": 3, "length": 300.0 },
        { "from": 3, "to": 4, "length": 200.0 }
    ]
}"#;

const DOCKS: &str = "\
id,address,capacity,geo_point_2d
1,Avenida 1,10,\"39.47, -0.40\"
2,Avenida 2,10,\"39.47, -0.39\"
3,Avenida 3,10,\"39.47, -0.38\"
4,Avenida 4,10,\"39.47, -0.37\"
";

/// Dock 1 is empty at 08:00 on 14 March; every other dock is comfortable.
const FORECAST: &str = "\
dock_id,month,day,hour,minute,bikes_pred_low,bikes_pred_up
1,3,14,8,0,0,2
2,3,14,8,0,3,5
3,3,14,8,0,3,5
4,3,14,8,0,3,5
";

/// Departure matching [`FORECAST`].
pub(super) const DEPARTURE: &str = "2025-03-14T08:00";

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path, contents).expect("write test file");
}

/// Temporary directory holding a graph, a dock inventory and a forecast.
#[derive(Debug)]
pub(super) struct Datasets {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Datasets {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        write_utf8(&root.join("graph.json"), GRAPH.as_bytes());
        write_utf8(&root.join("docks.csv"), DOCKS.as_bytes());
        write_utf8(&root.join("forecast.csv"), FORECAST.as_bytes());
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn graph(&self) -> Utf8PathBuf {
        self.root.join("graph.json")
    }

    pub(super) fn docks(&self) -> Utf8PathBuf {
        self.root.join("docks.csv")
    }

    pub(super) fn forecast(&self) -> Utf8PathBuf {
        self.root.join("forecast.csv")
    }

    /// Arguments for a trip from "Home" to "Work" without a forecast.
    pub(super) fn args(&self) -> PlanArgs {
        PlanArgs {
            graph: Some(self.graph()),
            docks: Some(self.docks()),
            from: Some("Home".to_owned()),
            to: Some("Work".to_owned()),
            ..PlanArgs::default()
        }
    }
}

/// Geocoder builder answering "Home" and "Work" from memory.
pub(super) struct StubGeocoderBuilder;

impl GeocoderBuilder for StubGeocoderBuilder {
    fn build(&self, _config: &PlanConfig) -> Result<Box<dyn Geocoder>, CliError> {
        Ok(Box::new(
            MemoryGeocoder::new()
                .with_entry("Home", HOME)
                .with_entry("Work", WORK),
        ))
    }
}
