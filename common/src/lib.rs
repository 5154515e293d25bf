// Shared library for the climate API: configuration, dataset access, telemetry

pub mod config;
pub mod dates;
pub mod db;
pub mod errors;
pub mod models;
pub mod telemetry;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;
