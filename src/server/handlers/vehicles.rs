use axum::extract::{Extension, Json, Path};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::api::DynAPI;
use crate::auth::User;
use crate::entities::{Vehicle, VehicleSpec};
use crate::error::Error;

pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(spec): Json<VehicleSpec>,
) -> Result<(StatusCode, Json<Vehicle>), Error> {
    let vehicle = api.create_vehicle(user, spec).await?;

    Ok((StatusCode::CREATED, vehicle.into()))
}

pub async fn list(Extension(api): Extension<DynAPI>, user: User) -> Result<Json<Vec<Vehicle>>, Error> {
    let vehicles = api.list_vehicles(user).await?;

    Ok(vehicles.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Vehicle>, Error> {
    let vehicle = api.find_vehicle(user, id).await?;

    Ok(vehicle.into())
}

pub async fn delete(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Error> {
    api.delete_vehicle(user, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
