use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    Json,
};
use common::dates::parse_date;
use common::db::repositories::ClimateRepository;
use common::models::TemperatureSummary;

use crate::handlers::ErrorResponse;
use crate::state::AppState;

pub const INVALID_START_DATE: &str = "Invalid start date format. Please use YYYY-MM-DD.";
pub const INVALID_DATE: &str = "Invalid date format. Please use YYYY-MM-DD.";
pub const START_AFTER_END: &str = "Start date must be before end date.";
pub const NO_DATA_FOR_START: &str = "No data found for the given start date.";
pub const NO_DATA_FOR_RANGE: &str = "No data found for the given date range.";

/// Precipitation for the trailing year, keyed by date.
///
/// When two stations report the same date, the row read last wins.
#[tracing::instrument(skip(state))]
pub async fn precipitation(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, Option<f64>>>, ErrorResponse> {
    let mut repo = ClimateRepository::acquire(&state.db_pool).await?;
    let since = repo.one_year_ago().await?;
    let readings = repo.precipitation_since(since).await?;

    let by_date: BTreeMap<String, Option<f64>> =
        readings.into_iter().map(|r| (r.date, r.prcp)).collect();

    tracing::debug!(dates = by_date.len(), since = %since, "Listed precipitation");
    Ok(Json(by_date))
}

/// Every station identifier
#[tracing::instrument(skip(state))]
pub async fn stations(State(state): State<AppState>) -> Result<Json<Vec<String>>, ErrorResponse> {
    let mut repo = ClimateRepository::acquire(&state.db_pool).await?;
    let ids = repo.station_ids().await?;

    tracing::debug!(count = ids.len(), "Listed stations");
    Ok(Json(ids))
}

/// Trailing-year temperatures of the most active station
#[tracing::instrument(skip(state))]
pub async fn tobs(State(state): State<AppState>) -> Result<Json<Vec<f64>>, ErrorResponse> {
    let mut repo = ClimateRepository::acquire(&state.db_pool).await?;
    let since = repo.one_year_ago().await?;
    let station = repo.most_active_station().await?;
    let readings = repo.tobs_for_station_since(&station.station, since).await?;

    let temperatures: Vec<f64> = readings.into_iter().map(|r| r.tobs).collect();

    tracing::debug!(
        station = %station.station,
        count = temperatures.len(),
        "Listed temperature observations"
    );
    Ok(Json(temperatures))
}

/// MIN/AVG/MAX temperature from `start` onwards
#[tracing::instrument(skip(state))]
pub async fn temperature_from(
    State(state): State<AppState>,
    Path(start): Path<String>,
) -> Result<Json<TemperatureSummary>, ErrorResponse> {
    let start = parse_date(&start).map_err(|e| {
        tracing::debug!(error = %e, "Rejected start date");
        ErrorResponse::bad_request(INVALID_START_DATE)
    })?;

    let mut repo = ClimateRepository::acquire(&state.db_pool).await?;
    let summary = repo
        .temperature_summary(start, None)
        .await?
        .ok_or_else(|| ErrorResponse::not_found(NO_DATA_FOR_START))?;

    Ok(Json(summary))
}

/// MIN/AVG/MAX temperature for `start..=end`
#[tracing::instrument(skip(state))]
pub async fn temperature_between(
    State(state): State<AppState>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<TemperatureSummary>, ErrorResponse> {
    // Format errors on either date take priority over ordering
    let (start, end) = match (parse_date(&start), parse_date(&end)) {
        (Ok(start), Ok(end)) => (start, end),
        (start_result, end_result) => {
            tracing::debug!(
                start_error = ?start_result.err(),
                end_error = ?end_result.err(),
                "Rejected date range"
            );
            return Err(ErrorResponse::bad_request(INVALID_DATE));
        }
    };

    if start > end {
        return Err(ErrorResponse::bad_request(START_AFTER_END));
    }

    let mut repo = ClimateRepository::acquire(&state.db_pool).await?;
    let summary = repo
        .temperature_summary(start, Some(end))
        .await?
        .ok_or_else(|| ErrorResponse::not_found(NO_DATA_FOR_RANGE))?;

    Ok(Json(summary))
}
