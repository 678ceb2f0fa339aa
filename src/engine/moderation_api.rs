use super::helpers::{fetch_account_for_update, update_account};
use super::Engine;

use async_trait::async_trait;
use sqlx::Executor;
use uuid::Uuid;

use crate::{
    api::{ModerationAPI, Registration},
    auth::{Platform, User},
    entities::{Account, Role},
    error::Error,
};

#[async_trait]
impl ModerationAPI for Engine {
    #[tracing::instrument(skip(self, registration), fields(email = %registration.email))]
    async fn create_employee(
        &self,
        user: User,
        registration: Registration,
    ) -> Result<Account, Error> {
        self.authorize(user.clone(), "create_employee", Platform::default())?;

        self.create_account(registration, vec![Role::Employee], 0)
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn suspend_account(&self, user: User, id: Uuid) -> Result<Account, Error> {
        let mut tx = self.pool.begin().await?;

        let mut account = fetch_account_for_update(&mut tx, &id).await?;

        self.authorize(user.clone(), "moderate", account.clone())?;

        account.suspend()?;

        update_account(&mut tx, &account).await?;

        let revoked = tx
            .execute(sqlx::query("DELETE FROM sessions WHERE account_id = $1").bind(account.id))
            .await?
            .rows_affected();

        tx.commit().await?;

        tracing::info!(account_id = %account.id, revoked, "account suspended");

        Ok(account)
    }

    #[tracing::instrument(skip(self))]
    async fn reactivate_account(&self, user: User, id: Uuid) -> Result<Account, Error> {
        let mut tx = self.pool.begin().await?;

        let mut account = fetch_account_for_update(&mut tx, &id).await?;

        self.authorize(user.clone(), "moderate", account.clone())?;

        account.reactivate()?;

        update_account(&mut tx, &account).await?;

        tx.commit().await?;

        tracing::info!(account_id = %account.id, "account reactivated");

        Ok(account)
    }
}
