use axum::extract::{Extension, Json, Path, Query};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::api::DynAPI;
use crate::auth::User;
use crate::entities::{Participation, Ride, RideDetails, RidePlan, SearchQuery, SearchResult};
use crate::error::Error;

pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(plan): Json<RidePlan>,
) -> Result<(StatusCode, Json<Ride>), Error> {
    let ride = api.create_ride(user, plan).await?;

    Ok((StatusCode::CREATED, ride.into()))
}

pub async fn search(
    Extension(api): Extension<DynAPI>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResult>, Error> {
    let result = api.search_rides(query).await?;

    Ok(result.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
) -> Result<Json<RideDetails>, Error> {
    let ride = api.find_ride(id).await?;

    Ok(ride.into())
}

pub async fn start(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Ride>, Error> {
    let ride = api.start_ride(user, id).await?;

    Ok(ride.into())
}

pub async fn complete(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Ride>, Error> {
    let ride = api.complete_ride(user, id).await?;

    Ok(ride.into())
}

pub async fn cancel(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Ride>, Error> {
    let ride = api.cancel_ride(user, id).await?;

    Ok(ride.into())
}

pub async fn passengers(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Participation>>, Error> {
    let participations = api.list_ride_passengers(user, id).await?;

    Ok(participations.into())
}
