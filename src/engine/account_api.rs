use super::helpers::{fetch_account, fetch_account_for_update, insert_account, update_account};
use super::Engine;

use async_trait::async_trait;
use sqlx::{types::Json, Executor, Row};
use uuid::Uuid;

use crate::{
    api::{AccountAPI, Registration},
    auth::{password, User},
    entities::{Account, Preferences, Role, Session},
    error::{unauthenticated_error, Error},
};

impl Engine {
    /// Validates, hashes and stores a new account with the given roles.
    pub(super) async fn create_account(
        &self,
        registration: Registration,
        roles: Vec<Role>,
        credits: i32,
    ) -> Result<Account, Error> {
        password::validate(&registration.password)?;

        let account = Account::new(registration.email, registration.pseudo, roles, credits)?;
        let password_hash = password::hash(&registration.password)?;

        insert_account(&self.pool, &account, &password_hash).await?;

        tracing::info!(account_id = %account.id, "account created");

        Ok(account)
    }
}

#[async_trait]
impl AccountAPI for Engine {
    #[tracing::instrument(skip(self, registration), fields(email = %registration.email))]
    async fn register(&self, registration: Registration) -> Result<Account, Error> {
        self.create_account(
            registration,
            vec![Role::Passenger],
            self.market.signup_credits,
        )
        .await
    }

    #[tracing::instrument(skip(self, password))]
    async fn login(&self, email: String, password: String) -> Result<Session, Error> {
        let mut conn = self.pool.acquire().await?;

        let email = email.trim().to_lowercase();

        let maybe_result = conn
            .fetch_optional(
                sqlx::query("SELECT password_hash, data FROM accounts WHERE email = $1")
                    .bind(&email),
            )
            .await?;

        let result = maybe_result.ok_or_else(unauthenticated_error)?;
        let password_hash: String = result.try_get("password_hash")?;
        let Json(account): Json<Account> = result.try_get("data")?;

        if !password::verify(&password, &password_hash)? {
            tracing::info!("password mismatch");
            return Err(unauthenticated_error());
        }

        if !account.is_active() {
            tracing::info!(account_id = %account.id, "suspended account attempted to log in");
            return Err(unauthenticated_error());
        }

        let session = Session::new(account, self.market.session_ttl);

        conn.execute(
            sqlx::query("DELETE FROM sessions WHERE account_id = $1 AND expiry <= now()")
                .bind(session.account.id),
        )
        .await?;

        conn.execute(
            sqlx::query("INSERT INTO sessions (token, account_id, expiry) VALUES ($1, $2, $3)")
                .bind(session.token)
                .bind(session.account.id)
                .bind(session.expires_at),
        )
        .await?;

        Ok(session)
    }

    #[tracing::instrument(skip_all)]
    async fn logout(&self, token: Uuid) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await?;

        conn.execute(sqlx::query("DELETE FROM sessions WHERE token = $1").bind(token))
            .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all)]
    async fn authenticate(&self, token: Uuid) -> Result<User, Error> {
        let mut conn = self.pool.acquire().await?;

        let query = "
            SELECT
                a.data
            FROM
                sessions s
                JOIN accounts a ON a.id = s.account_id
            WHERE
                s.token = $1
                AND s.expiry > now()
                AND a.status = 'active'
        ";

        let Json(account): Json<Account> = conn
            .fetch_optional(sqlx::query(query).bind(token))
            .await?
            .ok_or_else(unauthenticated_error)?
            .try_get("data")?;

        Ok(User::from(&account))
    }

    #[tracing::instrument(skip(self))]
    async fn find_account(&self, user: User, id: Uuid) -> Result<Account, Error> {
        let account = fetch_account(&self.pool, &id).await?;

        self.authorize(user.clone(), "read", account.clone())?;

        Ok(account)
    }

    #[tracing::instrument(skip(self))]
    async fn update_roles(&self, user: User, roles: Vec<Role>) -> Result<Account, Error> {
        let mut tx = self.pool.begin().await?;

        let mut account = fetch_account_for_update(&mut tx, &user.id).await?;

        self.authorize(user.clone(), "update", account.clone())?;

        account.set_roles(roles)?;

        update_account(&mut tx, &account).await?;

        tx.commit().await?;

        Ok(account)
    }

    #[tracing::instrument(skip(self))]
    async fn update_preferences(
        &self,
        user: User,
        preferences: Preferences,
    ) -> Result<Account, Error> {
        let mut tx = self.pool.begin().await?;

        let mut account = fetch_account_for_update(&mut tx, &user.id).await?;

        self.authorize(user.clone(), "update", account.clone())?;

        account.preferences = Preferences {
            smoking: preferences.smoking,
            pets: preferences.pets,
            notes: preferences
                .notes
                .into_iter()
                .map(|note| note.trim().to_string())
                .filter(|note| !note.is_empty())
                .collect(),
        };

        update_account(&mut tx, &account).await?;

        tx.commit().await?;

        Ok(account)
    }

    #[tracing::instrument(skip(self, registration), fields(email = %registration.email))]
    async fn bootstrap_admin(&self, registration: Registration) -> Result<Account, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_result = conn
            .fetch_optional(
                sqlx::query("SELECT data FROM accounts WHERE email = $1")
                    .bind(registration.email.trim().to_lowercase()),
            )
            .await?;

        if let Some(result) = maybe_result {
            let Json(account): Json<Account> = result.try_get("data")?;

            if !account.has_role(Role::Admin) {
                tracing::warn!(account_id = %account.id, "bootstrap admin email belongs to a non-admin account");
            }

            return Ok(account);
        }

        self.create_account(registration, vec![Role::Admin], 0).await
    }
}
