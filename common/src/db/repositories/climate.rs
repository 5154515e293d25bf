// Climate dataset repository: aggregate and filter queries over station/measurement

use crate::dates::{format_date, one_year_before, parse_date};
use crate::db::repositories::queries::{measurement_queries, station_queries};
use crate::db::DbPool;
use crate::errors::DatabaseError;
use crate::models::{
    PrecipitationReading, StationActivity, TemperatureReading, TemperatureSummary,
};
use crate::telemetry;
use chrono::NaiveDate;
use sqlx::pool::PoolConnection;
use sqlx::Sqlite;
use std::time::Instant;
use tracing::instrument;

/// Per-request session over the climate dataset.
///
/// Holds exactly one pooled connection for its whole lifetime. Every query a
/// request issues runs on that connection, and the connection is handed back
/// to the pool when the repository is dropped, whichever way the request ends.
pub struct ClimateRepository {
    conn: PoolConnection<Sqlite>,
}

impl ClimateRepository {
    /// Borrow a connection from the pool and open a session on it
    #[instrument(skip(pool))]
    pub async fn acquire(pool: &DbPool) -> Result<Self, DatabaseError> {
        let conn = pool.acquire().await?;
        Ok(Self { conn })
    }

    /// Most recent measurement date in the dataset
    ///
    /// # Errors
    /// `DatabaseError::EmptyDataset` when `measurement` has no rows,
    /// `DatabaseError::CorruptDate` when the stored maximum is not `YYYY-MM-DD`
    #[instrument(skip(self))]
    pub async fn latest_date(&mut self) -> Result<NaiveDate, DatabaseError> {
        let started = Instant::now();
        let latest: Option<String> = sqlx::query_scalar(measurement_queries::LATEST_DATE)
            .fetch_one(&mut *self.conn)
            .await?;
        telemetry::record_query_duration("latest_date", started.elapsed().as_secs_f64());

        let latest =
            latest.ok_or_else(|| DatabaseError::EmptyDataset("measurement".to_string()))?;

        parse_date(&latest).map_err(|_| DatabaseError::CorruptDate { value: latest })
    }

    /// Start of the trailing one-year window: 365 days before the latest date
    #[instrument(skip(self))]
    pub async fn one_year_ago(&mut self) -> Result<NaiveDate, DatabaseError> {
        let latest = self.latest_date().await?;
        let since = one_year_before(latest);
        tracing::debug!(latest = %latest, since = %since, "Resolved one-year window");
        Ok(since)
    }

    /// Station with the most measurement rows; ties go to the lowest identifier
    ///
    /// # Errors
    /// `DatabaseError::EmptyDataset` when `measurement` has no rows
    #[instrument(skip(self))]
    pub async fn most_active_station(&mut self) -> Result<StationActivity, DatabaseError> {
        let started = Instant::now();
        let top =
            sqlx::query_as::<_, StationActivity>(measurement_queries::MOST_ACTIVE_STATION)
                .fetch_optional(&mut *self.conn)
                .await?;
        telemetry::record_query_duration("most_active_station", started.elapsed().as_secs_f64());

        let top = top.ok_or_else(|| DatabaseError::EmptyDataset("measurement".to_string()))?;
        tracing::debug!(
            station = %top.station,
            observations = top.observations,
            "Resolved most active station"
        );
        Ok(top)
    }

    /// Every `(date, prcp)` pair on or after `since`, ordered by date then row id
    #[instrument(skip(self))]
    pub async fn precipitation_since(
        &mut self,
        since: NaiveDate,
    ) -> Result<Vec<PrecipitationReading>, DatabaseError> {
        let started = Instant::now();
        let readings = sqlx::query_as::<_, PrecipitationReading>(
            measurement_queries::PRECIPITATION_SINCE,
        )
        .bind(format_date(since))
        .fetch_all(&mut *self.conn)
        .await?;
        telemetry::record_query_duration("precipitation_since", started.elapsed().as_secs_f64());

        tracing::debug!(count = readings.len(), "Fetched precipitation readings");
        Ok(readings)
    }

    /// Identifier of every station, in table order
    #[instrument(skip(self))]
    pub async fn station_ids(&mut self) -> Result<Vec<String>, DatabaseError> {
        let started = Instant::now();
        let ids: Vec<String> = sqlx::query_scalar(station_queries::SELECT_IDS)
            .fetch_all(&mut *self.conn)
            .await?;
        telemetry::record_query_duration("station_ids", started.elapsed().as_secs_f64());

        Ok(ids)
    }

    /// Temperature readings for one station on or after `since`, ordered by date
    #[instrument(skip(self))]
    pub async fn tobs_for_station_since(
        &mut self,
        station: &str,
        since: NaiveDate,
    ) -> Result<Vec<TemperatureReading>, DatabaseError> {
        let started = Instant::now();
        let readings = sqlx::query_as::<_, TemperatureReading>(
            measurement_queries::TOBS_FOR_STATION_SINCE,
        )
        .bind(station)
        .bind(format_date(since))
        .fetch_all(&mut *self.conn)
        .await?;
        telemetry::record_query_duration(
            "tobs_for_station_since",
            started.elapsed().as_secs_f64(),
        );

        tracing::debug!(station, count = readings.len(), "Fetched temperature readings");
        Ok(readings)
    }

    /// MIN/AVG/MAX of `tobs` for `start <= date` and, when given, `date <= end`.
    ///
    /// Returns `None` when no row falls in the range.
    #[instrument(skip(self))]
    pub async fn temperature_summary(
        &mut self,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<Option<TemperatureSummary>, DatabaseError> {
        let started = Instant::now();
        let (min, avg, max) = sqlx::query_as::<_, (Option<f64>, Option<f64>, Option<f64>)>(
            measurement_queries::TEMPERATURE_SUMMARY,
        )
        .bind(format_date(start))
        .bind(end.map(format_date))
        .fetch_one(&mut *self.conn)
        .await?;
        telemetry::record_query_duration("temperature_summary", started.elapsed().as_secs_f64());

        // A null minimum means the range matched nothing
        let summary = match (min, avg, max) {
            (Some(min), Some(avg), Some(max)) => Some(TemperatureSummary {
                min_temperature: min,
                avg_temperature: avg,
                max_temperature: max,
            }),
            _ => None,
        };

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use proptest::prelude::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    async fn seeded() -> DbPool {
        let pool = testing::memory_pool().await;
        testing::seed_hawaii(&pool).await;
        pool
    }

    #[tokio::test]
    async fn test_one_year_ago_anchors_on_latest_measurement() {
        let pool = seeded().await;
        let mut repo = ClimateRepository::acquire(&pool).await.unwrap();

        assert_eq!(repo.latest_date().await.unwrap(), date("2017-08-23"));
        assert_eq!(repo.one_year_ago().await.unwrap(), date("2016-08-23"));
    }

    #[tokio::test]
    async fn test_empty_measurement_table_is_an_error() {
        let pool = testing::memory_pool().await;
        testing::create_schema(&pool).await;
        let mut repo = ClimateRepository::acquire(&pool).await.unwrap();

        assert!(matches!(
            repo.one_year_ago().await,
            Err(DatabaseError::EmptyDataset(_))
        ));
        assert!(matches!(
            repo.most_active_station().await,
            Err(DatabaseError::EmptyDataset(_))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_latest_date_is_reported() {
        let pool = testing::memory_pool().await;
        testing::create_schema(&pool).await;
        testing::insert_measurement(&pool, "USC00519281", "2017-08-23T00:00", None, 70.0).await;
        let mut repo = ClimateRepository::acquire(&pool).await.unwrap();

        assert!(matches!(
            repo.latest_date().await,
            Err(DatabaseError::CorruptDate { .. })
        ));
    }

    #[tokio::test]
    async fn test_most_active_station_by_row_count() {
        let pool = seeded().await;
        let mut repo = ClimateRepository::acquire(&pool).await.unwrap();

        let top = repo.most_active_station().await.unwrap();
        assert_eq!(top.station, "USC00519281");
        assert_eq!(top.observations, 5);
    }

    #[tokio::test]
    async fn test_most_active_station_tie_goes_to_lowest_identifier() {
        let pool = testing::memory_pool().await;
        testing::create_schema(&pool).await;
        for station in ["USC00519523", "USC00511918", "USC00517948"] {
            testing::insert_measurement(&pool, station, "2017-01-01", None, 70.0).await;
            testing::insert_measurement(&pool, station, "2017-01-02", None, 71.0).await;
        }
        let mut repo = ClimateRepository::acquire(&pool).await.unwrap();

        let top = repo.most_active_station().await.unwrap();
        assert_eq!(top.station, "USC00511918");
    }

    #[tokio::test]
    async fn test_precipitation_window_is_inclusive_and_ordered() {
        let pool = seeded().await;
        let mut repo = ClimateRepository::acquire(&pool).await.unwrap();

        let readings = repo.precipitation_since(date("2016-08-23")).await.unwrap();
        let dates: Vec<&str> = readings.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(
            dates,
            vec![
                "2016-08-23",
                "2017-01-15",
                "2017-03-01",
                "2017-03-03",
                "2017-08-18",
                "2017-08-23",
                "2017-08-23",
            ]
        );
        assert_eq!(readings[1].prcp, None);
        assert_eq!(readings.last().unwrap().prcp, Some(0.45));
    }

    #[tokio::test]
    async fn test_station_ids_in_table_order() {
        let pool = seeded().await;
        let mut repo = ClimateRepository::acquire(&pool).await.unwrap();

        let ids = repo.station_ids().await.unwrap();
        assert_eq!(ids, vec!["USC00519397", "USC00513117", "USC00519281"]);
    }

    #[tokio::test]
    async fn test_tobs_filters_station_and_window() {
        let pool = seeded().await;
        let mut repo = ClimateRepository::acquire(&pool).await.unwrap();

        let readings = repo
            .tobs_for_station_since("USC00519281", date("2016-08-23"))
            .await
            .unwrap();
        let temps: Vec<f64> = readings.iter().map(|r| r.tobs).collect();
        assert_eq!(temps, vec![77.0, 72.0, 79.0, 76.0]);
    }

    #[tokio::test]
    async fn test_temperature_summary_open_ended() {
        let pool = seeded().await;
        let mut repo = ClimateRepository::acquire(&pool).await.unwrap();

        let summary = repo
            .temperature_summary(date("2017-08-18"), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(summary.min_temperature, 76.0);
        assert_eq!(summary.max_temperature, 81.0);
        assert!((summary.avg_temperature - 236.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_temperature_summary_bounded_range_includes_both_ends() {
        let pool = seeded().await;
        let mut repo = ClimateRepository::acquire(&pool).await.unwrap();

        let summary = repo
            .temperature_summary(date("2017-03-01"), Some(date("2017-03-03")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(summary.min_temperature, 70.0);
        assert_eq!(summary.max_temperature, 72.0);
        assert_eq!(summary.avg_temperature, 71.0);
    }

    #[tokio::test]
    async fn test_temperature_summary_without_rows_is_none() {
        let pool = seeded().await;
        let mut repo = ClimateRepository::acquire(&pool).await.unwrap();

        let summary = repo.temperature_summary(date("2018-01-01"), None).await.unwrap();
        assert!(summary.is_none());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_summary_is_ordered(
            temps in prop::collection::vec(40.0f64..100.0, 1..20),
            start_offset in 0i64..10,
            span in 0i64..30,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let pool = testing::memory_pool().await;
                testing::create_schema(&pool).await;
                let first = date("2017-01-01");
                for (i, t) in temps.iter().enumerate() {
                    let day = format_date(first + chrono::Duration::days(i as i64));
                    testing::insert_measurement(&pool, "USC00519281", &day, None, *t).await;
                }

                let start = first + chrono::Duration::days(start_offset);
                let end = start + chrono::Duration::days(span);
                let mut repo = ClimateRepository::acquire(&pool).await.unwrap();
                let summary = repo.temperature_summary(start, Some(end)).await.unwrap();

                let in_range = temps.len() as i64 > start_offset;
                prop_assert_eq!(summary.is_some(), in_range);
                if let Some(s) = summary {
                    prop_assert!(s.min_temperature <= s.avg_temperature + 1e-9);
                    prop_assert!(s.avg_temperature <= s.max_temperature + 1e-9);
                }
                Ok(())
            })?;
        }
    }
}
