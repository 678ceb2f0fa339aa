use axum::extract::{Extension, Json, Path};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::api::DynAPI;
use crate::auth::User;
use crate::entities::Account;
use crate::error::Error;
use crate::server::handlers::accounts::RegisterParams;

pub async fn create_employee(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(params): Json<RegisterParams>,
) -> Result<(StatusCode, Json<Account>), Error> {
    let account = api.create_employee(user, params.into()).await?;

    Ok((StatusCode::CREATED, account.into()))
}

pub async fn suspend(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Account>, Error> {
    let account = api.suspend_account(user, id).await?;

    Ok(account.into())
}

pub async fn reactivate(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Account>, Error> {
    let account = api.reactivate_account(user, id).await?;

    Ok(account.into())
}
