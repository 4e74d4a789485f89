//! Dock inventory loader.
//!
//! Reads the station list as CSV. Both the plain column names (`id`,
//! `address`, `capacity`, `geo_point_2d`) and the Valencia open-data export
//! (`Numero`, `Direccion`, `Espacios_totales`, `geo_point_2d`, semicolon
//! separated) are accepted; extra columns are ignored.

use std::{collections::HashMap, io};

use camino::{Utf8Path, Utf8PathBuf};
use csv::{ReaderBuilder, Trim};
use dockroute_core::{DataIntegrityError, Dock, DockId};
use geo::Coord;
use log::info;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::{fs, geocoding::parse_lat_lon};

/// Errors raised while loading a dock dataset.
#[derive(Debug, Error)]
pub enum DockLoadError {
    /// The file could not be read.
    #[error("failed to read dock dataset {path}")]
    Io {
        /// Dataset path.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The CSV structure is broken (for example, ragged rows).
    #[error("malformed dock CSV in {path}")]
    Csv {
        /// Dataset path.
        path: Utf8PathBuf,
        /// Underlying CSV failure.
        #[source]
        source: csv::Error,
    },
    /// A row is missing a column or holds an unparsable value.
    #[error("invalid dock record at {path}:{line}: {message}")]
    Row {
        /// Dataset path.
        path: Utf8PathBuf,
        /// One-based line number of the record.
        line: u64,
        /// Decoder message.
        message: String,
    },
    /// A row parsed but holds an impossible coordinate.
    #[error("invalid dock record at {path}:{line}")]
    Integrity {
        /// Dataset path.
        path: Utf8PathBuf,
        /// One-based line number of the record.
        line: u64,
        /// Violated constraint.
        #[source]
        source: DataIntegrityError,
    },
    /// Two rows share an identifier.
    #[error("duplicate {id} at {path}:{line}")]
    DuplicateId {
        /// Dataset path.
        path: Utf8PathBuf,
        /// One-based line number of the second occurrence.
        line: u64,
        /// Repeated identifier.
        id: DockId,
    },
}

#[derive(Debug, Deserialize)]
struct DockRecord {
    #[serde(alias = "Numero")]
    id: u32,
    #[serde(alias = "Direccion")]
    address: String,
    #[serde(alias = "Espacios_totales")]
    capacity: u16,
    #[serde(deserialize_with = "deserialize_geo_point")]
    geo_point_2d: Coord<f64>,
}

fn deserialize_geo_point<'de, D>(deserializer: D) -> Result<Coord<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_geo_point(&text)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid geo_point_2d {text:?}")))
}

/// Parse a `"lat, lon"` pair, optionally wrapped in parentheses.
///
/// Returns `None` when either number is missing or not finite. Range checks
/// are left to the caller.
///
/// # Examples
/// ```
/// use dockroute_data::docks::parse_geo_point;
///
/// let coord = parse_geo_point("(39.4699, -0.3763)").expect("valid point");
/// assert_eq!((coord.x, coord.y), (-0.3763, 39.4699));
/// assert!(parse_geo_point("39.4699").is_none());
/// ```
#[must_use]
pub fn parse_geo_point(text: &str) -> Option<Coord<f64>> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(trimmed);
    parse_lat_lon(inner)
}

fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or_default();
    if header.matches(';').count() > header.matches(',').count() {
        b';'
    } else {
        b','
    }
}

/// Parse dock CSV `content`; `path` is only used for error context.
///
/// # Errors
///
/// Returns a [`DockLoadError`] naming the offending line for malformed rows,
/// out-of-range coordinates and repeated identifiers.
pub fn parse_docks(content: &str, path: &Utf8Path) -> Result<Vec<Dock>, DockLoadError> {
    let body = content.trim_start_matches('\u{feff}');
    let csv_error = |source| DockLoadError::Csv {
        path: path.to_owned(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .delimiter(sniff_delimiter(body))
        .trim(Trim::All)
        .from_reader(body.as_bytes());
    let headers = reader.headers().map_err(csv_error)?.clone();

    let mut docks = Vec::new();
    let mut seen = HashMap::new();
    for row in reader.records() {
        let record = row.map_err(csv_error)?;
        let line = record.position().map_or(0, csv::Position::line);
        let parsed: DockRecord =
            record
                .deserialize(Some(&headers))
                .map_err(|err| DockLoadError::Row {
                    path: path.to_owned(),
                    line,
                    message: err.to_string(),
                })?;
        DataIntegrityError::check_coordinate(parsed.geo_point_2d).map_err(|source| {
            DockLoadError::Integrity {
                path: path.to_owned(),
                line,
                source,
            }
        })?;
        let id = DockId(parsed.id);
        if seen.insert(id, line).is_some() {
            return Err(DockLoadError::DuplicateId {
                path: path.to_owned(),
                line,
                id,
            });
        }
        docks.push(Dock::new(
            id,
            parsed.address,
            parsed.geo_point_2d,
            parsed.capacity,
        ));
    }
    Ok(docks)
}

/// Load the dock dataset at `path`.
///
/// # Errors
///
/// Returns [`DockLoadError::Io`] when the file cannot be read, otherwise as
/// [`parse_docks`].
pub fn load_docks(path: &Utf8Path) -> Result<Vec<Dock>, DockLoadError> {
    let content = fs::read_to_string(path).map_err(|source| DockLoadError::Io {
        path: path.to_owned(),
        source,
    })?;
    let docks = parse_docks(&content, path)?;
    info!("loaded {} docks from {path}", docks.len());
    Ok(docks)
}
