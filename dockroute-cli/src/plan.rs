//! Plan command implementation for the dockroute CLI.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDateTime;
use clap::Parser;
use dockroute_core::{
    AlwaysAvailable, AvailabilityThresholds, DockAvailability, GeocodeCache, Geocoder, TripPlan,
    TripPlanner,
};
use dockroute_data::{
    ForecastTable, NominatimConfig, NominatimGeocoder, fs::file_is_file, load_docks, load_graph,
};
use log::{info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_PLAN_DEPARTURE, ARG_PLAN_DOCKS, ARG_PLAN_DROPOFF_MARGIN, ARG_PLAN_FORECAST, ARG_PLAN_FROM,
    ARG_PLAN_GRAPH, ARG_PLAN_NOMINATIM_URL, ARG_PLAN_PICKUP_MARGIN, ARG_PLAN_TO, CliError,
    ENV_PLAN_DEPARTURE, ENV_PLAN_DOCKS, ENV_PLAN_FROM, ENV_PLAN_GRAPH, ENV_PLAN_TO,
};

/// Accepted `--departure` layout.
pub(crate) const DEPARTURE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Plan a bike-share trip between two addresses. The street \
                 graph and dock inventory are loaded from disk; addresses are \
                 geocoded through Nominatim unless given as \"lat, lon\". \
                 With a forecast, docks predicted to be empty or full at the \
                 departure time are skipped.",
    about = "Plan a trip between two addresses"
)]
#[ortho_config(prefix = "DOCKROUTE")]
pub(crate) struct PlanArgs {
    /// Path to the street graph snapshot (JSON).
    #[arg(long = ARG_PLAN_GRAPH, value_name = "path")]
    #[serde(default)]
    pub(crate) graph: Option<Utf8PathBuf>,
    /// Path to the dock inventory (CSV).
    #[arg(long = ARG_PLAN_DOCKS, value_name = "path")]
    #[serde(default)]
    pub(crate) docks: Option<Utf8PathBuf>,
    /// Path to the availability forecast (CSV). Every dock counts as
    /// available when omitted.
    #[arg(long = ARG_PLAN_FORECAST, value_name = "path")]
    #[serde(default)]
    pub(crate) forecast: Option<Utf8PathBuf>,
    /// Starting address.
    #[arg(long = ARG_PLAN_FROM, value_name = "address")]
    #[serde(default)]
    pub(crate) from: Option<String>,
    /// Destination address.
    #[arg(long = ARG_PLAN_TO, value_name = "address")]
    #[serde(default)]
    pub(crate) to: Option<String>,
    /// Departure time as `YYYY-MM-DDTHH:MM`; required with a forecast.
    #[arg(long = ARG_PLAN_DEPARTURE, value_name = "time")]
    #[serde(default)]
    pub(crate) departure: Option<String>,
    /// Base URL of the Nominatim service.
    #[arg(long = ARG_PLAN_NOMINATIM_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) nominatim_url: Option<String>,
    /// Bikes that must remain predicted at a pickup dock.
    #[arg(long = ARG_PLAN_PICKUP_MARGIN, value_name = "bikes")]
    #[serde(default)]
    pub(crate) pickup_margin: Option<u16>,
    /// Slots that must remain predicted free at a drop-off dock.
    #[arg(long = ARG_PLAN_DROPOFF_MARGIN, value_name = "slots")]
    #[serde(default)]
    pub(crate) dropoff_margin: Option<u16>,
}

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlanConfig::try_from(merged)
    }
}

/// Resolved `plan` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlanConfig {
    /// Street graph snapshot.
    pub(crate) graph: Utf8PathBuf,
    /// Dock inventory.
    pub(crate) docks: Utf8PathBuf,
    /// Forecast and the departure it is read at.
    pub(crate) forecast: Option<(Utf8PathBuf, NaiveDateTime)>,
    /// Starting address.
    pub(crate) from: String,
    /// Destination address.
    pub(crate) to: String,
    /// Nominatim base URL.
    pub(crate) nominatim_url: String,
    /// Forecast safety margins.
    pub(crate) thresholds: AvailabilityThresholds,
}

impl PlanConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.graph, ARG_PLAN_GRAPH)?;
        Self::require_existing(&self.docks, ARG_PLAN_DOCKS)?;
        if let Some((forecast, _)) = &self.forecast {
            Self::require_existing(forecast, ARG_PLAN_FORECAST)?;
        }
        Ok(())
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

pub(crate) fn parse_departure(value: &str) -> Result<NaiveDateTime, CliError> {
    NaiveDateTime::parse_from_str(value.trim(), DEPARTURE_FORMAT).map_err(|source| {
        CliError::InvalidDeparture {
            value: value.to_owned(),
            source,
        }
    })
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let graph = args.graph.ok_or(CliError::MissingArgument {
            field: ARG_PLAN_GRAPH,
            env: ENV_PLAN_GRAPH,
        })?;
        let docks = args.docks.ok_or(CliError::MissingArgument {
            field: ARG_PLAN_DOCKS,
            env: ENV_PLAN_DOCKS,
        })?;
        let from = args.from.ok_or(CliError::MissingArgument {
            field: ARG_PLAN_FROM,
            env: ENV_PLAN_FROM,
        })?;
        let to = args.to.ok_or(CliError::MissingArgument {
            field: ARG_PLAN_TO,
            env: ENV_PLAN_TO,
        })?;

        let departure = args.departure.as_deref().map(parse_departure).transpose()?;
        let forecast = match (args.forecast, departure) {
            (Some(path), Some(at)) => Some((path, at)),
            (Some(_), None) => {
                return Err(CliError::MissingArgument {
                    field: ARG_PLAN_DEPARTURE,
                    env: ENV_PLAN_DEPARTURE,
                });
            }
            (None, Some(_)) => {
                warn!("ignoring --{ARG_PLAN_DEPARTURE} without --{ARG_PLAN_FORECAST}");
                None
            }
            (None, None) => None,
        };

        let defaults = AvailabilityThresholds::default();
        let thresholds = AvailabilityThresholds {
            pickup_margin: args.pickup_margin.unwrap_or(defaults.pickup_margin),
            dropoff_margin: args.dropoff_margin.unwrap_or(defaults.dropoff_margin),
        };
        let nominatim_url = args
            .nominatim_url
            .unwrap_or_else(|| NominatimConfig::default().base_url);

        Ok(Self {
            graph,
            docks,
            forecast,
            from,
            to,
            nominatim_url,
            thresholds,
        })
    }
}

/// Builds a geocoder for the current plan invocation.
pub(super) trait GeocoderBuilder {
    fn build(&self, config: &PlanConfig) -> Result<Box<dyn Geocoder>, CliError>;
}

pub(super) struct DefaultGeocoderBuilder;

impl GeocoderBuilder for DefaultGeocoderBuilder {
    fn build(&self, config: &PlanConfig) -> Result<Box<dyn Geocoder>, CliError> {
        let geocoder = NominatimGeocoder::new(config.nominatim_url.clone()).map_err(|source| {
            CliError::BuildGeocoder {
                base_url: config.nominatim_url.clone(),
                source,
            }
        })?;
        Ok(Box::new(geocoder))
    }
}

pub(super) fn run_plan(args: PlanArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    let builder = DefaultGeocoderBuilder;
    run_plan_with(args, &builder, &mut stdout)
}

pub(super) fn run_plan_with(
    args: PlanArgs,
    builder: &dyn GeocoderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let plan = execute_plan(args, builder)?;
    write_plan(writer, &plan)
}

fn execute_plan(args: PlanArgs, builder: &dyn GeocoderBuilder) -> Result<TripPlan, CliError> {
    let config = resolve_plan_config(args)?;
    let graph = load_graph(&config.graph)?;
    let docks = load_docks(&config.docks)?;
    let availability = load_availability(&config)?;
    let planner = TripPlanner::new(graph, docks)?;
    let geocoder = builder.build(&config)?;

    let mut cache = GeocodeCache::new();
    let plan = planner.plan_addresses(
        &mut cache,
        geocoder.as_ref(),
        &config.from,
        &config.to,
        availability.as_ref(),
    )?;
    info!(
        "trip from {:?} to {:?} covers {:.0} m",
        config.from,
        config.to,
        plan.total_length()
    );
    Ok(plan)
}

fn load_availability(config: &PlanConfig) -> Result<Box<dyn DockAvailability>, CliError> {
    let Some((path, departure)) = &config.forecast else {
        return Ok(Box::new(AlwaysAvailable));
    };
    let table = ForecastTable::load(path)?;
    let snapshot = table.snapshot(*departure, config.thresholds);
    if snapshot.is_empty() {
        warn!("forecast {path} has no slot for {departure}; every dock is unavailable");
    }
    Ok(Box::new(snapshot))
}

fn resolve_plan_config(args: PlanArgs) -> Result<PlanConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

fn write_plan(writer: &mut dyn Write, plan: &TripPlan) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(plan).map_err(CliError::SerialisePlan)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WritePlan)?;
    writer.write_all(b"\n").map_err(CliError::WritePlan)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PlanConfig, CliError> {
    let merged = PlanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PlanConfig::try_from(merged)
}
