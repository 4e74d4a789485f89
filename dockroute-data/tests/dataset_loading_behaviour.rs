//! Behavioural tests loading datasets from disk and planning over them.

use std::{cell::RefCell, error::Error, fs};

use camino::Utf8PathBuf;
use chrono::{NaiveDate, NaiveDateTime};
use dockroute_core::{
    AlwaysAvailable, AvailabilityThresholds, DockAvailability, DockId, TripPlan, TripPlanner,
};
use dockroute_data::{ForecastTable, load_docks, load_graph};
use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

/// Outcome of loading the datasets and planning a trip.
type OutcomeCell = RefCell<Option<Result<TripPlan, String>>>;

const WEST_END: Coord<f64> = Coord { x: -0.40, y: 39.47 };
const EAST_END: Coord<f64> = Coord { x: -0.37, y: 39.47 };

const AVENUE: &str = r#"{
    "nodes": [
        { "id": 11, "lat": 39.47, "lon": -0.40 },
        { "id": 12, "lat": 39.47, "lon": -0.39 },
        { "id": 13, "lat": 39.47, "lon": -0.38 },
        { "id": 14, "lat": 39.47, "lon": -0.37 }
    ],
    "edges": [
        { "from": 11, "to": 12, "length": 500.0 },
        { "from": 12, "to": 13, "length": 300.0 },
        { "from": 13, "to": 14 }
    ]
}"#;

const DANGLING: &str = r#"{
    "nodes": [
        { "id": 11, "lat": 39.47, "lon": -0.40 },
        { "id": 12, "lat": 39.47, "lon": -0.39 }
    ],
    "edges": [{ "from": 11, "to": 99, "length": 500.0 }]
}"#;

const DOCKS: &str = "\
Numero;Direccion;Espacios_totales;geo_point_2d
1;Avenida 1;10;39.47, -0.40
2;Avenida 2;10;39.47, -0.39
3;Avenida 3;10;39.47, -0.38
4;Avenida 4;10;39.47, -0.37
";

const STRAY_DOCKS: &str = "\
Numero;Direccion;Espacios_totales;geo_point_2d
1;Avenida 1;10;39.47, -0.40
2;Nowhere;10;139.47, -0.39
";

const FORECAST: &str = "\
Numero,Month,Day,Hour,Minute,bikes_pred_low,bikes_pred_up
1,3,14,8,0,0,2
2,3,14,8,0,3,5
3,3,14,8,0,3,5
4,3,14,8,0,3,5
";

#[fixture]
fn dir() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

#[fixture]
fn outcome() -> OutcomeCell {
    RefCell::new(None)
}

fn path_in(dir: &TempDir, name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().join(name)).expect("utf-8 temp path")
}

fn write(dir: &TempDir, name: &str, content: &str) {
    fs::write(path_in(dir, name), content).expect("write dataset");
}

fn eight_in_the_morning() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 14)
        .and_then(|date| date.and_hms_opt(8, 0, 0))
        .expect("valid departure")
}

fn plan(dir: &TempDir) -> Result<TripPlan, Box<dyn Error>> {
    let graph = load_graph(&path_in(dir, "graph.json"))?;
    let docks = load_docks(&path_in(dir, "docks.csv"))?;
    let forecast_path = path_in(dir, "forecast.csv");
    let availability: Box<dyn DockAvailability> = if forecast_path.exists() {
        let table = ForecastTable::load(&forecast_path)?;
        Box::new(table.snapshot(eight_in_the_morning(), AvailabilityThresholds::default()))
    } else {
        Box::new(AlwaysAvailable)
    };
    let planner = TripPlanner::new(graph, docks)?;
    Ok(planner.plan(WEST_END, EAST_END, availability.as_ref())?)
}

fn with_plan(outcome: &OutcomeCell, check: impl FnOnce(&TripPlan)) {
    let borrowed = outcome.borrow();
    match borrowed.as_ref() {
        Some(Ok(plan)) => check(plan),
        other => panic!("expected a plan, got {other:?}"),
    }
}

fn with_failure(outcome: &OutcomeCell, check: impl FnOnce(&str)) {
    let borrowed = outcome.borrow();
    match borrowed.as_ref() {
        Some(Err(message)) => check(message),
        other => panic!("expected a failure, got {other:?}"),
    }
}

// --- Given steps ---

#[given("a street graph snapshot along one avenue")]
fn avenue_snapshot(#[from(dir)] dir: &TempDir) {
    write(dir, "graph.json", AVENUE);
}

#[given("a street graph snapshot with an edge to a missing node")]
fn dangling_snapshot(#[from(dir)] dir: &TempDir) {
    write(dir, "graph.json", DANGLING);
}

#[given("a dock export with a station at every junction")]
fn dock_export(#[from(dir)] dir: &TempDir) {
    write(dir, "docks.csv", DOCKS);
}

#[given("a dock export with a station in the middle of nowhere")]
fn stray_dock_export(#[from(dir)] dir: &TempDir) {
    write(dir, "docks.csv", STRAY_DOCKS);
}

#[given("a forecast where the first dock is empty at eight")]
fn forecast(#[from(dir)] dir: &TempDir) {
    write(dir, "forecast.csv", FORECAST);
}

// --- When steps ---

#[when("a trip along the avenue is planned at eight in the morning")]
fn plan_trip(#[from(dir)] dir: &TempDir, #[from(outcome)] outcome: &OutcomeCell) {
    *outcome.borrow_mut() = Some(plan(dir).map_err(|err| err.to_string()));
}

// --- Then steps ---

#[then("the trip starts at the first dock")]
fn starts_at_first(#[from(outcome)] outcome: &OutcomeCell) {
    with_plan(outcome, |plan| {
        assert_eq!(plan.pickup.dock.id, DockId(1));
        assert_eq!(plan.pickup.skipped, 0);
        assert_eq!(plan.route.to_pickup.length, 0.0);
    });
}

#[then("the trip starts at the second dock after skipping one")]
fn starts_at_second(#[from(outcome)] outcome: &OutcomeCell) {
    with_plan(outcome, |plan| {
        assert_eq!(plan.pickup.dock.id, DockId(2));
        assert_eq!(plan.pickup.skipped, 1);
        assert_eq!(plan.pickup.distance, 500.0);
        assert_eq!(plan.route.to_pickup.length, 500.0);
    });
}

#[then("the trip ends at the last dock")]
fn ends_at_last(#[from(outcome)] outcome: &OutcomeCell) {
    with_plan(outcome, |plan| {
        assert_eq!(plan.dropoff.dock.id, DockId(4));
        assert_eq!(plan.route.from_dropoff.length, 0.0);
        assert!(plan.total_length() > 800.0, "got {}", plan.total_length());
    });
}

#[then("loading fails naming the graph snapshot")]
fn graph_failure(#[from(outcome)] outcome: &OutcomeCell) {
    with_failure(outcome, |message| {
        assert!(message.contains("graph.json"), "got {message}");
    });
}

#[then("loading fails naming the third line of the dock export")]
fn dock_failure(#[from(outcome)] outcome: &OutcomeCell) {
    with_failure(outcome, |message| {
        assert!(message.contains("docks.csv:3"), "got {message}");
    });
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/dataset_loading.feature", name = $title)]
        fn $fn_name(dir: TempDir, outcome: OutcomeCell) {
            let _ = (dir, outcome);
        }
    };
}

register_scenario!(planning_with_every_dock_available, "planning with every dock available");
register_scenario!(planning_around_an_empty_dock, "planning around an empty dock");
register_scenario!(
    rejecting_a_dangling_edge,
    "rejecting a snapshot with a dangling edge"
);
register_scenario!(
    rejecting_an_impossible_coordinate,
    "rejecting a dock export with an impossible coordinate"
);

