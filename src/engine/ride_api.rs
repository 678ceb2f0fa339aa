use super::helpers::{
    driver_profile, fetch_account_for_update, fetch_confirmed_participations_for_update,
    fetch_ride, fetch_ride_for_update, fetch_vehicle, insert_ride, update_account,
    update_participation, update_ride, DRIVER_RATINGS,
};
use super::Engine;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{types::Json, Executor, Row};
use uuid::Uuid;

use crate::{
    api::RideAPI,
    auth::{Platform, User},
    entities::{
        total_driver_payout, Account, Participation, Ride, RideDetails, RideListing, RidePlan,
        SearchQuery, SearchResult, Vehicle,
    },
    error::{not_found_error, Error},
};

#[async_trait]
impl RideAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_ride(&self, user: User, plan: RidePlan) -> Result<Ride, Error> {
        self.authorize(user.clone(), "create_ride", Platform::default())?;

        let vehicle = fetch_vehicle(&self.pool, &plan.vehicle_id).await?;

        self.authorize(user.clone(), "read", vehicle.clone())?;

        let ride = Ride::new(user.id, &vehicle, plan, Utc::now())?;

        insert_ride(&self.pool, &ride).await?;

        tracing::info!(ride_id = %ride.id, "ride published");

        Ok(ride)
    }

    #[tracing::instrument(skip(self))]
    async fn find_ride(&self, id: Uuid) -> Result<RideDetails, Error> {
        let query = format!(
            "
            SELECT
                r.data AS ride,
                a.data AS driver,
                v.data AS vehicle,
                rt.average_rating,
                rt.review_count
            FROM
                rides r
                JOIN accounts a ON a.id = r.driver_id
                JOIN vehicles v ON v.id = r.vehicle_id
                LEFT JOIN ({}) rt ON rt.driver_id = r.driver_id
            WHERE
                r.id = $1
            ",
            DRIVER_RATINGS
        );

        let mut conn = self.pool.acquire().await?;

        let result = conn
            .fetch_optional(sqlx::query(&query).bind(id))
            .await?
            .ok_or_else(not_found_error)?;

        let Json(ride): Json<Ride> = result.try_get("ride")?;
        let Json(driver): Json<Account> = result.try_get("driver")?;
        let Json(vehicle): Json<Vehicle> = result.try_get("vehicle")?;
        let average_rating: Option<f64> = result.try_get("average_rating")?;
        let review_count: Option<i64> = result.try_get("review_count")?;

        let driver = driver_profile(driver, average_rating, review_count);

        Ok(RideDetails {
            listing: RideListing::new(ride, driver),
            vehicle: vehicle.into(),
        })
    }

    async fn search_rides(&self, query: SearchQuery) -> Result<SearchResult, Error> {
        self.search(query).await
    }

    #[tracing::instrument(skip(self))]
    async fn list_driver_rides(&self, user: User) -> Result<Vec<Ride>, Error> {
        let mut conn = self.pool.acquire().await?;

        let results = conn
            .fetch_all(
                sqlx::query("SELECT data FROM rides WHERE driver_id = $1 ORDER BY departure_time DESC")
                    .bind(user.id),
            )
            .await?;

        let mut rides = Vec::with_capacity(results.len());

        for result in results.iter() {
            let Json(ride): Json<Ride> = result.try_get("data")?;
            rides.push(ride);
        }

        Ok(rides)
    }

    #[tracing::instrument(skip(self))]
    async fn start_ride(&self, user: User, id: Uuid) -> Result<Ride, Error> {
        let mut tx = self.pool.begin().await?;

        let mut ride = fetch_ride_for_update(&mut tx, &id).await?;

        self.authorize(user.clone(), "start", ride.clone())?;

        ride.start(Utc::now())?;

        update_ride(&mut tx, &ride).await?;

        tx.commit().await?;

        Ok(ride)
    }

    #[tracing::instrument(skip(self))]
    async fn complete_ride(&self, user: User, id: Uuid) -> Result<Ride, Error> {
        let mut tx = self.pool.begin().await?;

        let mut ride = fetch_ride_for_update(&mut tx, &id).await?;

        self.authorize(user.clone(), "complete", ride.clone())?;

        ride.complete(Utc::now())?;

        let mut participations =
            fetch_confirmed_participations_for_update(&mut tx, &ride.id).await?;

        for participation in participations.iter_mut() {
            participation.complete()?;
            update_participation(&mut tx, participation).await?;
        }

        let payout = total_driver_payout(&participations, self.market.platform_fee)?;

        let mut driver = fetch_account_for_update(&mut tx, &ride.driver_id).await?;
        driver.credit(payout)?;

        update_account(&mut tx, &driver).await?;
        update_ride(&mut tx, &ride).await?;

        tx.commit().await?;

        tracing::info!(ride_id = %ride.id, payout, "ride completed, driver credited");

        Ok(ride)
    }

    #[tracing::instrument(skip(self))]
    async fn cancel_ride(&self, user: User, id: Uuid) -> Result<Ride, Error> {
        let mut tx = self.pool.begin().await?;

        let mut ride = fetch_ride_for_update(&mut tx, &id).await?;

        self.authorize(user.clone(), "cancel", ride.clone())?;

        let now = Utc::now();
        ride.cancel(now)?;

        let participations = fetch_confirmed_participations_for_update(&mut tx, &ride.id).await?;

        for mut participation in participations {
            let refund = participation.cancel(now)?;

            let mut passenger =
                fetch_account_for_update(&mut tx, &participation.passenger_id).await?;
            passenger.credit(refund)?;

            update_account(&mut tx, &passenger).await?;
            update_participation(&mut tx, &participation).await?;

            tracing::info!(
                participation_id = %participation.id,
                refund,
                "participation cancelled with the ride, passenger refunded"
            );
        }

        update_ride(&mut tx, &ride).await?;

        tx.commit().await?;

        Ok(ride)
    }

    #[tracing::instrument(skip(self))]
    async fn list_ride_passengers(
        &self,
        user: User,
        id: Uuid,
    ) -> Result<Vec<Participation>, Error> {
        let mut conn = self.pool.acquire().await?;

        let ride = fetch_ride(&mut conn, &id).await?;

        self.authorize(user.clone(), "read_passengers", ride.clone())?;

        let results = conn
            .fetch_all(
                sqlx::query(
                    "SELECT data FROM participations WHERE ride_id = $1 AND status <> 'cancelled'",
                )
                .bind(ride.id),
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
