use ecoride::api::{AccountAPI, Registration};
use ecoride::config::Config;
use ecoride::db::PgPool;
use ecoride::engine::Engine;
use ecoride::error::Error;
use ecoride::server::serve;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ecoride=info")),
        )
        .init();

    let config = Config::load()?;

    let PgPool(pool) = PgPool::new(&config.database.url, config.database.max_connections).await?;

    let engine = Engine::new(pool, config.market.clone()).await?;

    if let Some(admin) = config.admin.clone() {
        let account = engine
            .bootstrap_admin(Registration {
                email: admin.email,
                pseudo: admin.pseudo,
                password: admin.password,
            })
            .await?;

        tracing::info!(account_id = %account.id, "administrator account ready");
    }

    serve(engine, config.addr).await
}
