//! Error types emitted by the dockroute CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use dockroute_core::PlanError;
use dockroute_data::{DockLoadError, ForecastLoadError, GeocoderBuildError, GraphLoadError};
use thiserror::Error;

/// Errors emitted by the dockroute CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name without dashes.
        field: &'static str,
        /// Environment variable carrying the same setting.
        env: &'static str,
    },
    /// The departure time does not match `YYYY-MM-DDTHH:MM`.
    #[error("invalid departure {value:?}, expected YYYY-MM-DDTHH:MM")]
    InvalidDeparture {
        /// Rejected input.
        value: String,
        /// Parser failure.
        #[source]
        source: chrono::ParseError,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Flag naming the path.
        field: &'static str,
        /// Missing path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Flag naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}")]
    InspectSourcePath {
        /// Flag naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// Loading the street graph failed.
    #[error(transparent)]
    LoadGraph(#[from] GraphLoadError),
    /// Loading the dock inventory failed.
    #[error(transparent)]
    LoadDocks(#[from] DockLoadError),
    /// Loading the availability forecast failed.
    #[error(transparent)]
    LoadForecast(#[from] ForecastLoadError),
    /// Constructing the geocoder failed.
    #[error("failed to build geocoder for {base_url:?}")]
    BuildGeocoder {
        /// Configured service URL.
        base_url: String,
        /// Underlying failure.
        #[source]
        source: GeocoderBuildError,
    },
    /// No trip could be planned.
    #[error(transparent)]
    Plan(#[from] PlanError),
    /// Serialising the trip plan failed.
    #[error("failed to serialise trip plan")]
    SerialisePlan(#[source] serde_json::Error),
    /// Writing the trip plan failed.
    #[error("failed to write trip plan")]
    WritePlan(#[source] std::io::Error),
}
