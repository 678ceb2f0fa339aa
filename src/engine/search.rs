use super::helpers::{driver_profile, DRIVER_RATINGS};
use super::Engine;

use chrono::{DateTime, Utc};
use sqlx::{types::Json, Executor, Row};

use crate::{
    entities::{Account, Ride, RideListing, SearchQuery, SearchResult},
    error::Error,
};

// $1 departure city, $2 arrival city, $3 seats, $4 max price, $5 eco only,
// $6 max duration (minutes), $7 min rating; the departure window follows.
const SEARCH_FILTERS: &str = "
    r.status = 'planned'
    AND a.status = 'active'
    AND lower(r.departure_city) = lower($1)
    AND lower(r.arrival_city) = lower($2)
    AND r.departure_time > now()
    AND r.seats_available >= $3
    AND ($4::INT4 IS NULL OR r.price <= $4::INT4)
    AND (NOT $5::BOOLEAN OR r.eco)
    AND ($6::FLOAT8 IS NULL OR EXTRACT(EPOCH FROM (r.arrival_time - r.departure_time)) / 60 <= $6::FLOAT8)
    AND ($7::FLOAT8 IS NULL OR COALESCE(rt.average_rating, 0) >= $7::FLOAT8)
";

fn search_sql(select: &str, window: &str, tail: &str) -> String {
    format!(
        "
        SELECT
            {select}
        FROM
            rides r
            JOIN accounts a ON a.id = r.driver_id
            LEFT JOIN ({ratings}) rt ON rt.driver_id = r.driver_id
        WHERE
            {filters}
            AND {window}
        {tail}
        ",
        select = select,
        ratings = DRIVER_RATINGS,
        filters = SEARCH_FILTERS,
        window = window,
        tail = tail,
    )
}

impl Engine {
    #[tracing::instrument(skip(self))]
    pub(super) async fn search(&self, query: SearchQuery) -> Result<SearchResult, Error> {
        query.validate()?;

        let (day_start, day_end) = query.day_bounds()?;
        let departure_city = query.departure_city.trim().to_string();
        let arrival_city = query.arrival_city.trim().to_string();
        let max_duration = query.max_duration_minutes.map(|m| m as f64);

        let mut conn = self.pool.acquire().await?;

        let sql = search_sql(
            "r.data AS ride, a.data AS driver, rt.average_rating, rt.review_count",
            "r.departure_time >= $8 AND r.departure_time < $9",
            "ORDER BY r.departure_time ASC",
        );

        let results = conn
            .fetch_all(
                sqlx::query(&sql)
                    .bind(&departure_city)
                    .bind(&arrival_city)
                    .bind(query.seats())
                    .bind(query.max_price)
                    .bind(query.eco_only())
                    .bind(max_duration)
                    .bind(query.min_rating)
                    .bind(day_start)
                    .bind(day_end),
            )
            .await?;

        let mut rides = Vec::with_capacity(results.len());

        for result in results.iter() {
            let Json(ride): Json<Ride> = result.try_get("ride")?;
            let Json(driver): Json<Account> = result.try_get("driver")?;
            let average_rating: Option<f64> = result.try_get("average_rating")?;
            let review_count: Option<i64> = result.try_get("review_count")?;

            rides.push(RideListing::new(
                ride,
                driver_profile(driver, average_rating, review_count),
            ));
        }

        if !rides.is_empty() {
            return Ok(SearchResult {
                rides,
                next_available_date: None,
            });
        }

        tracing::info!("no ride on the requested day, looking for the next available one");

        let sql = search_sql(
            "MIN(r.departure_time) AS next_departure",
            "r.departure_time >= $8",
            "",
        );

        let next_departure: Option<DateTime<Utc>> = conn
            .fetch_one(
                sqlx::query(&sql)
                    .bind(&departure_city)
                    .bind(&arrival_city)
                    .bind(query.seats())
                    .bind(query.max_price)
                    .bind(query.eco_only())
                    .bind(max_duration)
                    .bind(query.min_rating)
                    .bind(day_end),
            )
            .await?
            .try_get("next_departure")?;

        Ok(SearchResult {
            rides,
            next_available_date: next_departure.map(|d| d.date_naive()),
        })
    }
}
