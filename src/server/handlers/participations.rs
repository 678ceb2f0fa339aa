use axum::extract::{Extension, Json, Path};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::DynAPI;
use crate::auth::User;
use crate::entities::Participation;
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    #[serde(default = "one_seat")]
    seats: i32,
}

fn one_seat() -> i32 {
    1
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(ride_id): Path<Uuid>,
    Json(params): Json<CreateParams>,
) -> Result<(StatusCode, Json<Participation>), Error> {
    let participation = api.book_seats(user, ride_id, params.seats).await?;

    Ok((StatusCode::CREATED, participation.into()))
}

pub async fn cancel(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Participation>, Error> {
    let participation = api.cancel_booking(user, id).await?;

    Ok(participation.into())
}
