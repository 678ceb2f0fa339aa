use axum::extract::{Extension, Json};
use axum::http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};

use crate::api::DynAPI;
use crate::entities::Session;
use crate::error::Error;
use crate::server::bearer_token;

#[derive(Serialize, Deserialize)]
pub struct LoginParams {
    email: String,
    password: String,
}

pub async fn login(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<LoginParams>,
) -> Result<(StatusCode, Json<Session>), Error> {
    let session = api.login(params.email, params.password).await?;

    Ok((StatusCode::CREATED, session.into()))
}

pub async fn logout(
    Extension(api): Extension<DynAPI>,
    headers: HeaderMap,
) -> Result<StatusCode, Error> {
    let token = bearer_token(&headers)?;

    api.logout(token).await?;

    Ok(StatusCode::NO_CONTENT)
}
