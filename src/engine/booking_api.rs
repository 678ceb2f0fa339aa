use super::helpers::{
    fetch_account_for_update, fetch_participation_for_update, fetch_ride_for_update,
    insert_participation, update_account, update_participation, update_ride,
};
use super::Engine;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{types::Json, Executor, Row};
use uuid::Uuid;

use crate::{
    api::BookingAPI,
    auth::User,
    entities::Participation,
    error::{invalid_invocation_error, not_found_error, Error},
};

#[async_trait]
impl BookingAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn book_seats(
        &self,
        user: User,
        ride_id: Uuid,
        seats: i32,
    ) -> Result<Participation, Error> {
        let mut tx = self.pool.begin().await?;

        // the ride row lock serialises every booking on this ride
        let mut ride = fetch_ride_for_update(&mut tx, &ride_id).await?;

        self.authorize(user.clone(), "book", ride.clone())?;

        if ride.departure_time <= Utc::now() {
            tracing::info!("ride has already departed, refusing booking");
            return Err(invalid_invocation_error());
        }

        let already_booked: bool = tx
            .fetch_one(
                sqlx::query(
                    "SELECT EXISTS (SELECT 1 FROM participations WHERE ride_id = $1 AND passenger_id = $2 AND status = 'confirmed') AS booked",
                )
                .bind(ride.id)
                .bind(user.id),
            )
            .await?
            .try_get("booked")?;

        if already_booked {
            tracing::info!("passenger already has a confirmed participation on this ride");
            return Err(invalid_invocation_error());
        }

        ride.book_seats(seats)?;
        let cost = ride.cost(seats)?;

        let mut passenger = fetch_account_for_update(&mut tx, &user.id).await?;
        passenger.debit(cost)?;

        let participation = Participation::new(ride.id, passenger.id, seats, cost)?;

        insert_participation(&mut tx, &participation).await?;
        update_ride(&mut tx, &ride).await?;
        update_account(&mut tx, &passenger).await?;

        tx.commit().await?;

        tracing::info!(
            participation_id = %participation.id,
            seats_available = ride.seats_available,
            "seats booked"
        );

        Ok(participation)
    }

    #[tracing::instrument(skip(self))]
    async fn cancel_booking(&self, user: User, id: Uuid) -> Result<Participation, Error> {
        let mut tx = self.pool.begin().await?;

        // lock the ride before the participation, like booking does
        let ride_id: Uuid = tx
            .fetch_optional(sqlx::query("SELECT ride_id FROM participations WHERE id = $1").bind(id))
            .await?
            .ok_or_else(not_found_error)?
            .try_get("ride_id")?;

        let mut ride = fetch_ride_for_update(&mut tx, &ride_id).await?;
        let mut participation = fetch_participation_for_update(&mut tx, &id).await?;

        self.authorize(user.clone(), "cancel", participation.clone())?;

        let refund = participation.cancel(Utc::now())?;
        ride.release_seats(participation.seats)?;

        let mut passenger = fetch_account_for_update(&mut tx, &participation.passenger_id).await?;
        passenger.credit(refund)?;

        update_participation(&mut tx, &participation).await?;
        update_ride(&mut tx, &ride).await?;
        update_account(&mut tx, &passenger).await?;

        tx.commit().await?;

        tracing::info!(
            participation_id = %participation.id,
            refund,
            "booking cancelled"
        );

        Ok(participation)
    }

    #[tracing::instrument(skip(self))]
    async fn list_participations(&self, user: User) -> Result<Vec<Participation>, Error> {
        let mut conn = self.pool.acquire().await?;

        let results = conn
            .fetch_all(
                sqlx::query(
                    "
                    SELECT
                        p.data
                    FROM
                        participations p
                        JOIN rides r ON r.id = p.ride_id
                    WHERE
                        p.passenger_id = $1
                    ORDER BY
                        r.departure_time DESC
                    ",
                )
                .bind(user.id),
            )
            .await?;

        let mut participations = Vec::with_capacity(results.len());

        for result in results.iter() {
            let Json(participation): Json<Participation> = result.try_get("data")?;
            participations.push(participation);
        }

        Ok(participations)
    }
}
