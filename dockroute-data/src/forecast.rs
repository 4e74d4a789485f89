//! Availability forecast loader and time-slot lookup.
//!
//! The forecast is a CSV with one row per dock and time slot:
//! `dock_id, month, day, hour, minute, bikes_pred_low, bikes_pred_up`.
//! Upstream column spellings (`Numero`, `Month`, `Day`, `Hour`, `Minute`)
//! are accepted as aliases.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap, btree_map::Entry},
    io,
};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{Datelike, NaiveDateTime, Timelike};
use csv::{ReaderBuilder, Trim};
use dockroute_core::{AvailabilityThresholds, Dock, DockAvailability, DockForecast, DockId};
use log::{debug, info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::fs;

/// Errors raised while loading a forecast.
#[derive(Debug, Error)]
pub enum ForecastLoadError {
    /// The file could not be read.
    #[error("failed to read forecast {path}")]
    Io {
        /// Forecast path.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The CSV structure is broken.
    #[error("malformed forecast CSV in {path}")]
    Csv {
        /// Forecast path.
        path: Utf8PathBuf,
        /// Underlying CSV failure.
        #[source]
        source: csv::Error,
    },
    /// A row holds an unparsable or out-of-range value.
    #[error("invalid forecast record at {path}:{line}: {message}")]
    Row {
        /// Forecast path.
        path: Utf8PathBuf,
        /// One-based line number of the record.
        line: u64,
        /// What was wrong with the row.
        message: String,
    },
}

#[derive(Debug, Deserialize)]
struct ForecastRecord {
    #[serde(alias = "Numero")]
    dock_id: u32,
    #[serde(alias = "Month")]
    month: u32,
    #[serde(alias = "Day")]
    day: u32,
    #[serde(alias = "Hour")]
    hour: u32,
    #[serde(alias = "Minute")]
    minute: u32,
    bikes_pred_low: f64,
    bikes_pred_up: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Slot {
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
}

impl Slot {
    fn at(departure: NaiveDateTime) -> Self {
        Self {
            month: departure.month(),
            day: departure.day(),
            hour: departure.hour(),
            minute: departure.minute(),
        }
    }

    const fn end_of_hour(self) -> Self {
        Self { minute: 59, ..self }
    }

    fn check(self) -> Result<Self, String> {
        if !(1..=12).contains(&self.month) {
            return Err(format!("month {} out of range", self.month));
        }
        if !(1..=31).contains(&self.day) {
            return Err(format!("day {} out of range", self.day));
        }
        if self.hour > 23 {
            return Err(format!("hour {} out of range", self.hour));
        }
        if self.minute > 59 {
            return Err(format!("minute {} out of range", self.minute));
        }
        Ok(self)
    }
}

impl ForecastRecord {
    fn into_entry(self) -> Result<(DockId, Slot, DockForecast), String> {
        let slot = Slot {
            month: self.month,
            day: self.day,
            hour: self.hour,
            minute: self.minute,
        }
        .check()?;
        if !self.bikes_pred_low.is_finite() || !self.bikes_pred_up.is_finite() {
            return Err("bike predictions must be finite".to_owned());
        }
        let forecast = DockForecast {
            bikes_low: self.bikes_pred_low,
            bikes_high: self.bikes_pred_up,
        };
        Ok((DockId(self.dock_id), slot, forecast))
    }
}

/// Predicted bike counts per dock and time slot.
#[derive(Debug, Clone, Default)]
pub struct ForecastTable {
    docks: HashMap<DockId, BTreeMap<Slot, DockForecast>>,
}

impl ForecastTable {
    /// Parse forecast CSV `content`; `path` is only used for error context.
    ///
    /// When a dock has two rows for the same slot the first one is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastLoadError::Row`] for unparsable values, slots outside
    /// the calendar and non-finite predictions. Crossed bands, where the low
    /// prediction exceeds the high one, are kept as given and logged.
    pub fn parse(content: &str, path: &Utf8Path) -> Result<Self, ForecastLoadError> {
        let csv_error = |source| ForecastLoadError::Csv {
            path: path.to_owned(),
            source,
        };
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_reader(content.trim_start_matches('\u{feff}').as_bytes());
        let headers = reader.headers().map_err(csv_error)?.clone();

        let mut table = Self::default();
        for row in reader.records() {
            let record = row.map_err(csv_error)?;
            let line = record.position().map_or(0, csv::Position::line);
            let row_error = |message: String| ForecastLoadError::Row {
                path: path.to_owned(),
                line,
                message,
            };
            let (dock, slot, forecast) = record
                .deserialize::<ForecastRecord>(Some(&headers))
                .map_err(|err| row_error(err.to_string()))?
                .into_entry()
                .map_err(row_error)?;
            if forecast.bikes_low > forecast.bikes_high {
                warn!(
                    "{path}:{line}: crossed prediction band for {dock} ({} > {}), using it as given",
                    forecast.bikes_low, forecast.bikes_high
                );
            }
            match table.docks.entry(dock).or_default().entry(slot) {
                Entry::Vacant(entry) => {
                    entry.insert(forecast);
                }
                Entry::Occupied(_) => {
                    warn!("ignoring repeated forecast slot for {dock} at {path}:{line}");
                }
            }
        }
        Ok(table)
    }

    /// Load the forecast at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastLoadError::Io`] when the file cannot be read,
    /// otherwise as [`ForecastTable::parse`].
    pub fn load(path: &Utf8Path) -> Result<Self, ForecastLoadError> {
        let content = fs::read_to_string(path).map_err(|source| ForecastLoadError::Io {
            path: path.to_owned(),
            source,
        })?;
        let table = Self::parse(&content, path)?;
        info!(
            "loaded forecast for {} docks over {} days from {path}",
            table.dock_count(),
            table.available_dates().len()
        );
        Ok(table)
    }

    /// Number of docks with at least one slot.
    #[must_use]
    pub fn dock_count(&self) -> usize {
        self.docks.len()
    }

    /// Whether the table holds no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docks.is_empty()
    }

    /// Distinct `(month, day)` pairs covered, in calendar order.
    #[must_use]
    pub fn available_dates(&self) -> Vec<(u32, u32)> {
        self.docks
            .values()
            .flat_map(BTreeMap::keys)
            .map(|slot| (slot.month, slot.day))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Forecast for `dock` at the first slot not earlier than `departure`
    /// within the same hour.
    ///
    /// # Examples
    /// ```
    /// use camino::Utf8Path;
    /// use chrono::NaiveDate;
    /// use dockroute_core::DockId;
    /// use dockroute_data::ForecastTable;
    ///
    /// let csv = "dock_id,month,day,hour,minute,bikes_pred_low,bikes_pred_up\n\
    ///            7,3,14,8,0,2,5\n\
    ///            7,3,14,8,30,0,1\n";
    /// let table = ForecastTable::parse(csv, Utf8Path::new("forecast.csv"))?;
    /// let departure = NaiveDate::from_ymd_opt(2025, 3, 14)
    ///     .and_then(|date| date.and_hms_opt(8, 10, 0))
    ///     .expect("valid departure");
    /// let forecast = table.forecast_at(DockId(7), departure).expect("slot at 08:30");
    /// assert_eq!(forecast.bikes_high, 1.0);
    /// # Ok::<(), dockroute_data::ForecastLoadError>(())
    /// ```
    #[must_use]
    pub fn forecast_at(&self, dock: DockId, departure: NaiveDateTime) -> Option<DockForecast> {
        let start = Slot::at(departure);
        self.docks
            .get(&dock)?
            .range(start..=start.end_of_hour())
            .next()
            .map(|(_, forecast)| *forecast)
    }

    /// Freeze the forecast at `departure` into an availability source.
    #[must_use]
    pub fn snapshot(
        &self,
        departure: NaiveDateTime,
        thresholds: AvailabilityThresholds,
    ) -> ForecastSnapshot {
        let forecasts: HashMap<_, _> = self
            .docks
            .keys()
            .filter_map(|dock| Some((*dock, self.forecast_at(*dock, departure)?)))
            .collect();
        debug!(
            "forecast at {departure} covers {} of {} docks",
            forecasts.len(),
            self.dock_count()
        );
        ForecastSnapshot {
            forecasts,
            thresholds,
        }
    }
}

/// Forecast frozen at one departure time.
///
/// Docks without a slot in the departure hour are treated as unavailable for
/// both pickup and drop-off.
#[derive(Debug, Clone, Default)]
pub struct ForecastSnapshot {
    forecasts: HashMap<DockId, DockForecast>,
    thresholds: AvailabilityThresholds,
}

impl ForecastSnapshot {
    /// Forecast used for `dock`, if any.
    #[must_use]
    pub fn forecast(&self, dock: DockId) -> Option<DockForecast> {
        self.forecasts.get(&dock).copied()
    }

    /// Number of docks with a forecast.
    #[must_use]
    pub fn len(&self) -> usize {
        self.forecasts.len()
    }

    /// Whether no dock has a forecast.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forecasts.is_empty()
    }
}

impl DockAvailability for ForecastSnapshot {
    fn has_bike(&self, dock: &Dock) -> bool {
        self.forecast(dock.id)
            .is_some_and(|forecast| forecast.has_bike(self.thresholds))
    }

    fn has_slot(&self, dock: &Dock) -> bool {
        self.forecast(dock.id)
            .is_some_and(|forecast| forecast.has_slot(dock.capacity, self.thresholds))
    }
}
