// SQL query constants for repositories
// Dates are stored as YYYY-MM-DD text, so lexical comparison is calendar order

/// Queries over the `measurement` table
pub mod measurement_queries {
    pub const LATEST_DATE: &str = "SELECT MAX(date) FROM measurement";

    /// Busiest station by row count, ties by ascending identifier
    pub const MOST_ACTIVE_STATION: &str = r#"
        SELECT station, COUNT(*) AS observations
        FROM measurement
        WHERE station IS NOT NULL
        GROUP BY station
        ORDER BY observations DESC, station ASC
        LIMIT 1"#;

    /// `?1` = first date of the window
    pub const PRECIPITATION_SINCE: &str = r#"
        SELECT date, CAST(prcp AS REAL) AS prcp
        FROM measurement
        WHERE date >= ?1
        ORDER BY date ASC, id ASC"#;

    /// `?1` = station identifier, `?2` = first date of the window
    pub const TOBS_FOR_STATION_SINCE: &str = r#"
        SELECT date, CAST(tobs AS REAL) AS tobs
        FROM measurement
        WHERE station = ?1 AND date >= ?2
        ORDER BY date ASC, id ASC"#;

    /// `?1` = start date, `?2` = optional end date (NULL for open-ended)
    ///
    /// # NULL Handling
    /// Every aggregate is NULL when no row matches.
    pub const TEMPERATURE_SUMMARY: &str = r#"
        SELECT CAST(MIN(tobs) AS REAL), AVG(tobs), CAST(MAX(tobs) AS REAL)
        FROM measurement
        WHERE date >= ?1 AND (?2 IS NULL OR date <= ?2)"#;
}

/// Queries over the `station` table
pub mod station_queries {
    pub const SELECT_IDS: &str = "SELECT station FROM station ORDER BY id ASC";
}
