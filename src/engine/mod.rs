mod account_api;
mod booking_api;
mod helpers;
mod moderation_api;
mod review_api;
mod ride_api;
mod search;
mod vehicle_api;


use oso::Oso;
use sqlx::Pool;

use crate::{
    api::API,
    auth::authorizor,
    config::MarketConfig,
    db::{self, Database},
    error::{unauthorized_error, Error},
};

pub struct Engine {
    pool: Pool<Database>,
    authorizor: Oso,
    market: MarketConfig,
}

impl Engine {
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub async fn new(pool: Pool<Database>, market: MarketConfig) -> Result<Self, Error> {
        db::create_schema(&pool).await?;

        Ok(Self {
            pool,
            authorizor: authorizor::new()?,
            market,
        })
    }
}

impl Engine {
    pub fn authorize<Actor, Action, Resource>(
        &self,
        actor: Actor,
        action: Action,
        resource: Resource,
    ) -> Result<(), Error>
    where
        Actor: oso::ToPolar,
        Action: oso::ToPolar,
        Resource: oso::ToPolar,
    {
        if self.authorizor.is_allowed(actor, action, resource)? {
            return Ok(());
        }

        Err(unauthorized_error())
    }
}

impl API for Engine {}
