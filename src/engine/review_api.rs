use super::helpers::{fetch_review_for_update, update_review};
use super::Engine;

use async_trait::async_trait;
use sqlx::{types::Json, Executor, Row};
use uuid::Uuid;

use crate::{
    api::ReviewAPI,
    auth::{Platform, User},
    entities::{Decision, DriverReviews, Participation, Review},
    error::{invalid_invocation_error, Error},
};

#[async_trait]
impl ReviewAPI for Engine {
    #[tracing::instrument(skip(self, comment))]
    async fn submit_review(
        &self,
        user: User,
        ride_id: Uuid,
        rating: i32,
        comment: String,
    ) -> Result<Review, Error> {
        let mut conn = self.pool.acquire().await?;

        let query = "
            SELECT
                p.data AS participation,
                r.driver_id
            FROM
                participations p
                JOIN rides r ON r.id = p.ride_id
            WHERE
                p.ride_id = $1
                AND p.passenger_id = $2
                AND p.status = 'completed'
        ";

        let result = conn
            .fetch_optional(sqlx::query(query).bind(ride_id).bind(user.id))
            .await?
            .ok_or_else(|| {
                tracing::info!("no completed participation on this ride");
                invalid_invocation_error()
            })?;

        let Json(participation): Json<Participation> = result.try_get("participation")?;
        let driver_id: Uuid = result.try_get("driver_id")?;

        self.authorize(user.clone(), "review", participation.clone())?;

        let review = Review::new(ride_id, driver_id, user.id, rating, comment)?;

        conn.execute(
            sqlx::query(
                "INSERT INTO reviews (id, ride_id, driver_id, author_id, status, rating, data) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(review.id)
            .bind(review.ride_id)
            .bind(review.driver_id)
            .bind(review.author_id)
            .bind(review.status.name())
            .bind(review.rating)
            .bind(Json(&review)),
        )
        .await?;

        Ok(review)
    }

    #[tracing::instrument(skip(self))]
    async fn list_driver_reviews(&self, driver_id: Uuid) -> Result<DriverReviews, Error> {
        let mut conn = self.pool.acquire().await?;

        let results = conn
            .fetch_all(
                sqlx::query("SELECT data FROM reviews WHERE driver_id = $1 AND status = 'approved'")
                    .bind(driver_id),
            )
            .await?;

        let mut reviews = Vec::with_capacity(results.len());

        for result in results.iter() {
            let Json(review): Json<Review> = result.try_get("data")?;
            reviews.push(review);
        }

        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(DriverReviews::new(driver_id, reviews))
    }

    #[tracing::instrument(skip(self))]
    async fn list_pending_reviews(&self, user: User) -> Result<Vec<Review>, Error> {
        self.authorize(user.clone(), "moderate_reviews", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        let results = conn
            .fetch_all(sqlx::query("SELECT data FROM reviews WHERE status = 'pending'"))
            .await?;

        let mut reviews = Vec::with_capacity(results.len());

        for result in results.iter() {
            let Json(review): Json<Review> = result.try_get("data")?;
            reviews.push(review);
        }

        reviews.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(reviews)
    }

    #[tracing::instrument(skip(self))]
    async fn moderate_review(
        &self,
        user: User,
        id: Uuid,
        decision: Decision,
    ) -> Result<Review, Error> {
        let mut tx = self.pool.begin().await?;

        let mut review = fetch_review_for_update(&mut tx, &id).await?;

        self.authorize(user.clone(), "moderate", review.clone())?;

        review.moderate(user.id, decision)?;

        update_review(&mut tx, &review).await?;

        tx.commit().await?;

        tracing::info!(review_id = %review.id, status = %review.status.name(), "review moderated");

        Ok(review)
    }
}
