use super::Database;

use sqlx::{types::Json, Executor, Row, Transaction};
use uuid::Uuid;

use crate::{
    entities::{Account, DriverProfile, Participation, Review, Ride, Vehicle},
    error::{not_found_error, Error},
};

/// Average rating and count of approved reviews, per driver.
pub const DRIVER_RATINGS: &str = "
    SELECT
        driver_id,
        AVG(rating)::FLOAT8 AS average_rating,
        COUNT(*) AS review_count
    FROM
        reviews
    WHERE
        status = 'approved'
    GROUP BY
        driver_id
";

pub fn driver_profile(
    account: Account,
    average_rating: Option<f64>,
    review_count: Option<i64>,
) -> DriverProfile {
    DriverProfile {
        id: account.id,
        pseudo: account.pseudo,
        preferences: account.preferences,
        average_rating,
        review_count: review_count.unwrap_or(0),
    }
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_ride_for_update(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<Ride, Error> {
    let Json(ride): Json<Ride> = tx
        .fetch_optional(sqlx::query("SELECT data FROM rides WHERE id = $1 FOR UPDATE").bind(id))
        .await?
        .ok_or_else(not_found_error)?
        .try_get("data")?;

    Ok(ride)
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_account_for_update(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<Account, Error> {
    let Json(account): Json<Account> = tx
        .fetch_optional(sqlx::query("SELECT data FROM accounts WHERE id = $1 FOR UPDATE").bind(id))
        .await?
        .ok_or_else(not_found_error)?
        .try_get("data")?;

    Ok(account)
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_participation_for_update(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<Participation, Error> {
    let Json(participation): Json<Participation> = tx
        .fetch_optional(
            sqlx::query("SELECT data FROM participations WHERE id = $1 FOR UPDATE").bind(id),
        )
        .await?
        .ok_or_else(not_found_error)?
        .try_get("data")?;

    Ok(participation)
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_review_for_update(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<Review, Error> {
    let Json(review): Json<Review> = tx
        .fetch_optional(sqlx::query("SELECT data FROM reviews WHERE id = $1 FOR UPDATE").bind(id))
        .await?
        .ok_or_else(not_found_error)?
        .try_get("data")?;

    Ok(review)
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_vehicle_for_update(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<Vehicle, Error> {
    let Json(vehicle): Json<Vehicle> = tx
        .fetch_optional(
            sqlx::query("SELECT data FROM vehicles WHERE id = $1 AND deleted_at IS NULL FOR UPDATE")
                .bind(id),
        )
        .await?
        .ok_or_else(not_found_error)?
        .try_get("data")?;

    Ok(vehicle)
}

#[tracing::instrument(skip(executor))]
pub async fn fetch_ride<'c, E>(executor: E, id: &Uuid) -> Result<Ride, Error>
where
    E: Executor<'c, Database = Database>,
{
    let Json(ride): Json<Ride> = executor
        .fetch_optional(sqlx::query("SELECT data FROM rides WHERE id = $1").bind(id))
        .await?
        .ok_or_else(not_found_error)?
        .try_get("data")?;

    Ok(ride)
}

#[tracing::instrument(skip(executor))]
pub async fn fetch_account<'c, E>(executor: E, id: &Uuid) -> Result<Account, Error>
where
    E: Executor<'c, Database = Database>,
{
    let Json(account): Json<Account> = executor
        .fetch_optional(sqlx::query("SELECT data FROM accounts WHERE id = $1").bind(id))
        .await?
        .ok_or_else(not_found_error)?
        .try_get("data")?;

    Ok(account)
}

#[tracing::instrument(skip(executor))]
pub async fn fetch_vehicle<'c, E>(executor: E, id: &Uuid) -> Result<Vehicle, Error>
where
    E: Executor<'c, Database = Database>,
{
    let Json(vehicle): Json<Vehicle> = executor
        .fetch_optional(
            sqlx::query("SELECT data FROM vehicles WHERE id = $1 AND deleted_at IS NULL").bind(id),
        )
        .await?
        .ok_or_else(not_found_error)?
        .try_get("data")?;

    Ok(vehicle)
}

#[tracing::instrument(skip(executor, password_hash))]
pub async fn insert_account<'c, E>(
    executor: E,
    account: &Account,
    password_hash: &str,
) -> Result<(), Error>
where
    E: Executor<'c, Database = Database>,
{
    executor
        .execute(
            sqlx::query(
                "INSERT INTO accounts (id, email, pseudo, password_hash, status, data) VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(account.id)
            .bind(&account.email)
            .bind(&account.pseudo)
            .bind(password_hash)
            .bind(account.status.name())
            .bind(Json(account)),
        )
        .await?;

    Ok(())
}

#[tracing::instrument(skip(tx))]
pub async fn update_account(
    tx: &mut Transaction<'_, Database>,
    account: &Account,
) -> Result<(), Error> {
    tx.execute(
        sqlx::query("UPDATE accounts SET status = $2, data = $3 WHERE id = $1")
            .bind(account.id)
            .bind(account.status.name())
            .bind(Json(account)),
    )
    .await?;

    Ok(())
}

#[tracing::instrument(skip(executor))]
pub async fn insert_ride<'c, E>(executor: E, ride: &Ride) -> Result<(), Error>
where
    E: Executor<'c, Database = Database>,
{
    executor
        .execute(
            sqlx::query(
                "INSERT INTO rides (id, driver_id, vehicle_id, status, departure_city, arrival_city, departure_time, arrival_time, price, seats_available, eco, data) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
            )
            .bind(ride.id)
            .bind(ride.driver_id)
            .bind(ride.vehicle_id)
            .bind(ride.status.name())
            .bind(ride.departure.city.trim())
            .bind(ride.arrival.city.trim())
            .bind(ride.departure_time)
            .bind(ride.arrival_time)
            .bind(ride.price)
            .bind(ride.seats_available)
            .bind(ride.is_eco())
            .bind(Json(ride)),
        )
        .await?;

    Ok(())
}

#[tracing::instrument(skip(tx))]
pub async fn update_ride(tx: &mut Transaction<'_, Database>, ride: &Ride) -> Result<(), Error> {
    tx.execute(
        sqlx::query("UPDATE rides SET status = $2, seats_available = $3, data = $4 WHERE id = $1")
            .bind(ride.id)
            .bind(ride.status.name())
            .bind(ride.seats_available)
            .bind(Json(ride)),
    )
    .await?;

    Ok(())
}

#[tracing::instrument(skip(tx))]
pub async fn insert_participation(
    tx: &mut Transaction<'_, Database>,
    participation: &Participation,
) -> Result<(), Error> {
    tx.execute(
        sqlx::query(
            "INSERT INTO participations (id, ride_id, passenger_id, status, data) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(participation.id)
        .bind(participation.ride_id)
        .bind(participation.passenger_id)
        .bind(participation.status.name())
        .bind(Json(participation)),
    )
    .await?;

    Ok(())
}

#[tracing::instrument(skip(tx))]
pub async fn update_participation(
    tx: &mut Transaction<'_, Database>,
    participation: &Participation,
) -> Result<(), Error> {
    tx.execute(
        sqlx::query("UPDATE participations SET status = $2, data = $3 WHERE id = $1")
            .bind(participation.id)
            .bind(participation.status.name())
            .bind(Json(participation)),
    )
    .await?;

    Ok(())
}

#[tracing::instrument(skip(tx))]
pub async fn update_review(tx: &mut Transaction<'_, Database>, review: &Review) -> Result<(), Error> {
    tx.execute(
        sqlx::query("UPDATE reviews SET status = $2, data = $3 WHERE id = $1")
            .bind(review.id)
            .bind(review.status.name())
            .bind(Json(review)),
    )
    .await?;

    Ok(())
}

/// Confirmed participations of a ride, locked, in a stable order.
#[tracing::instrument(skip(tx))]
pub async fn fetch_confirmed_participations_for_update(
    tx: &mut Transaction<'_, Database>,
    ride_id: &Uuid,
) -> Result<Vec<Participation>, Error> {
    let rows = tx
        .fetch_all(
            sqlx::query(
                "SELECT data FROM participations WHERE ride_id = $1 AND status = 'confirmed' ORDER BY passenger_id FOR UPDATE",
            )
            .bind(ride_id),
        )
        .await?;

    let mut participations = Vec::with_capacity(rows.len());

    for row in rows.iter() {
        let Json(participation): Json<Participation> = row.try_get("data")?;
        participations.push(participation);
    }

    Ok(participations)
}
