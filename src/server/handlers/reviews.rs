use axum::extract::{Extension, Json, Path};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::DynAPI;
use crate::auth::User;
use crate::entities::{Decision, DriverReviews, Review};
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    rating: i32,
    #[serde(default)]
    comment: String,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(ride_id): Path<Uuid>,
    Json(params): Json<CreateParams>,
) -> Result<(StatusCode, Json<Review>), Error> {
    let review = api
        .submit_review(user, ride_id, params.rating, params.comment)
        .await?;

    Ok((StatusCode::CREATED, review.into()))
}

pub async fn list_for_driver(
    Extension(api): Extension<DynAPI>,
    Path(driver_id): Path<Uuid>,
) -> Result<Json<DriverReviews>, Error> {
    let reviews = api.list_driver_reviews(driver_id).await?;

    Ok(reviews.into())
}

pub async fn list_pending(
    Extension(api): Extension<DynAPI>,
    user: User,
) -> Result<Json<Vec<Review>>, Error> {
    let reviews = api.list_pending_reviews(user).await?;

    Ok(reviews.into())
}

pub async fn approve(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Review>, Error> {
    let review = api.moderate_review(user, id, Decision::Approve).await?;

    Ok(review.into())
}

pub async fn reject(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Review>, Error> {
    let review = api.moderate_review(user, id, Decision::Reject).await?;

    Ok(review.into())
}
