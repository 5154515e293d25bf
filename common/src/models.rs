// Statically declared record types for the climate dataset

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Precipitation reading for one date
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct PrecipitationReading {
    pub date: String,
    pub prcp: Option<f64>,
}

/// Temperature reading for one date
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct TemperatureReading {
    pub date: String,
    pub tobs: f64,
}

/// Observation count for a single station
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StationActivity {
    pub station: String,
    pub observations: i64,
}

/// MIN/AVG/MAX of `tobs` over a date range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSummary {
    pub min_temperature: f64,
    pub avg_temperature: f64,
    pub max_temperature: f64,
}

/// Columns the queries read, checked against the dataset at startup
pub mod columns {
    pub const STATION_TABLE: &str = "station";
    pub const MEASUREMENT_TABLE: &str = "measurement";

    pub const STATION: &[&str] = &["id", "station", "name", "latitude", "longitude", "elevation"];
    pub const MEASUREMENT: &[&str] = &["id", "station", "date", "prcp", "tobs"];
}
