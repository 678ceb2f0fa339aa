use axum::extract::{Extension, Json};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::api::{DynAPI, Registration};
use crate::auth::User;
use crate::entities::{Account, Participation, Preferences, Ride, Role};
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct RegisterParams {
    pub email: String,
    pub pseudo: String,
    pub password: String,
}

impl From<RegisterParams> for Registration {
    fn from(params: RegisterParams) -> Self {
        Self {
            email: params.email,
            pseudo: params.pseudo,
            password: params.password,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct UpdateRolesParams {
    roles: Vec<Role>,
}

pub async fn register(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<RegisterParams>,
) -> Result<(StatusCode, Json<Account>), Error> {
    let account = api.register(params.into()).await?;

    Ok((StatusCode::CREATED, account.into()))
}

pub async fn me(Extension(api): Extension<DynAPI>, user: User) -> Result<Json<Account>, Error> {
    let id = user.id;
    let account = api.find_account(user, id).await?;

    Ok(account.into())
}

pub async fn update_roles(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(params): Json<UpdateRolesParams>,
) -> Result<Json<Account>, Error> {
    let account = api.update_roles(user, params.roles).await?;

    Ok(account.into())
}

pub async fn update_preferences(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(preferences): Json<Preferences>,
) -> Result<Json<Account>, Error> {
    let account = api.update_preferences(user, preferences).await?;

    Ok(account.into())
}

pub async fn rides(Extension(api): Extension<DynAPI>, user: User) -> Result<Json<Vec<Ride>>, Error> {
    let rides = api.list_driver_rides(user).await?;

    Ok(rides.into())
}

pub async fn participations(
    Extension(api): Extension<DynAPI>,
    user: User,
) -> Result<Json<Vec<Participation>>, Error> {
    let participations = api.list_participations(user).await?;

    Ok(participations.into())
}
