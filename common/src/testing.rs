// In-memory dataset fixtures shared by unit and integration tests

use crate::db::DbPool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Single-connection pool over a private in-memory database.
///
/// The database lives as long as its one connection, so idle reaping is off.
pub async fn memory_pool() -> DbPool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid in-memory connection string");

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
        .expect("in-memory sqlite pool");

    DbPool::from_pool(pool)
}

/// Create `station` and `measurement` with the dataset's column layout
pub async fn create_schema(pool: &DbPool) {
    sqlx::query(
        r#"
        CREATE TABLE station (
            id INTEGER PRIMARY KEY,
            station TEXT,
            name TEXT,
            latitude FLOAT,
            longitude FLOAT,
            elevation FLOAT
        )
        "#,
    )
    .execute(pool.pool())
    .await
    .expect("create station table");

    sqlx::query(
        r#"
        CREATE TABLE measurement (
            id INTEGER PRIMARY KEY,
            station TEXT,
            date TEXT,
            prcp FLOAT,
            tobs FLOAT
        )
        "#,
    )
    .execute(pool.pool())
    .await
    .expect("create measurement table");
}

pub async fn insert_station(pool: &DbPool, code: &str, name: &str) {
    sqlx::query(
        "INSERT INTO station (station, name, latitude, longitude, elevation) VALUES (?1, ?2, 21.3, -157.8, 3.0)",
    )
    .bind(code)
    .bind(name)
    .execute(pool.pool())
    .await
    .expect("insert station");
}

pub async fn insert_measurement(
    pool: &DbPool,
    station: &str,
    date: &str,
    prcp: Option<f64>,
    tobs: f64,
) {
    sqlx::query("INSERT INTO measurement (station, date, prcp, tobs) VALUES (?1, ?2, ?3, ?4)")
        .bind(station)
        .bind(date)
        .bind(prcp)
        .bind(tobs)
        .execute(pool.pool())
        .await
        .expect("insert measurement");
}

/// Small dataset shaped like the Hawaii observations.
///
/// - latest date is `2017-08-23`, so the one-year window starts `2016-08-23`
/// - `USC00519281` has the most rows (5), `USC00513117` has 3, `USC00519397` has 2
/// - `2017-08-23` appears twice for precipitation; the later row (`0.45`) wins
pub async fn seed_hawaii(pool: &DbPool) {
    create_schema(pool).await;

    insert_station(pool, "USC00519397", "WAIKIKI 717.2, HI US").await;
    insert_station(pool, "USC00513117", "KANEOHE 838.1, HI US").await;
    insert_station(pool, "USC00519281", "WAIHEE 837.5, HI US").await;

    insert_measurement(pool, "USC00519397", "2016-08-22", Some(0.10), 80.0).await;
    insert_measurement(pool, "USC00519397", "2017-08-23", Some(0.00), 81.0).await;

    insert_measurement(pool, "USC00513117", "2010-01-01", Some(0.08), 65.0).await;
    insert_measurement(pool, "USC00513117", "2017-01-15", None, 68.0).await;
    insert_measurement(pool, "USC00513117", "2017-03-03", Some(0.20), 70.0).await;

    insert_measurement(pool, "USC00519281", "2015-06-01", Some(0.30), 70.0).await;
    insert_measurement(pool, "USC00519281", "2016-08-23", Some(1.79), 77.0).await;
    insert_measurement(pool, "USC00519281", "2017-03-01", Some(0.02), 72.0).await;
    insert_measurement(pool, "USC00519281", "2017-08-18", None, 79.0).await;
    insert_measurement(pool, "USC00519281", "2017-08-23", Some(0.45), 76.0).await;
}
