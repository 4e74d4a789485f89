//! Command-line interface for planning bike-share trips.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod plan;

pub use error::CliError;

use plan::{PlanArgs, run_plan};

pub(crate) const ARG_PLAN_GRAPH: &str = "graph";
pub(crate) const ARG_PLAN_DOCKS: &str = "docks";
pub(crate) const ARG_PLAN_FORECAST: &str = "forecast";
pub(crate) const ARG_PLAN_FROM: &str = "from";
pub(crate) const ARG_PLAN_TO: &str = "to";
pub(crate) const ARG_PLAN_DEPARTURE: &str = "departure";
pub(crate) const ARG_PLAN_NOMINATIM_URL: &str = "nominatim-url";
pub(crate) const ARG_PLAN_PICKUP_MARGIN: &str = "pickup-margin";
pub(crate) const ARG_PLAN_DROPOFF_MARGIN: &str = "dropoff-margin";
pub(crate) const ENV_PLAN_GRAPH: &str = "DOCKROUTE_CMDS_PLAN_GRAPH";
pub(crate) const ENV_PLAN_DOCKS: &str = "DOCKROUTE_CMDS_PLAN_DOCKS";
pub(crate) const ENV_PLAN_FROM: &str = "DOCKROUTE_CMDS_PLAN_FROM";
pub(crate) const ENV_PLAN_TO: &str = "DOCKROUTE_CMDS_PLAN_TO";
pub(crate) const ENV_PLAN_DEPARTURE: &str = "DOCKROUTE_CMDS_PLAN_DEPARTURE";

/// Run the dockroute CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments are invalid, a dataset fails to load
/// or no trip can be planned.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Plan(args) => run_plan(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "dockroute",
    about = "Plan bike-share trips between two addresses",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Choose pickup and drop-off docks and route a trip through them.
    Plan(PlanArgs),
}

#[cfg(test)]
mod tests;
