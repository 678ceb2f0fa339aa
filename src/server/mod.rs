mod extract;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, patch, post},
    Router,
};
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

use crate::api::{DynAPI, API};
use crate::error::{unexpected_error, Error};
use crate::server::handlers::{accounts, admin, participations, reviews, rides, sessions, vehicles};

pub use extract::bearer_token;

pub fn router(api: DynAPI) -> Router {
    Router::new()
        .route("/accounts", post(accounts::register))
        .route("/accounts/me", get(accounts::me))
        .route("/accounts/me/roles", patch(accounts::update_roles))
        .route("/accounts/me/preferences", patch(accounts::update_preferences))
        .route("/accounts/me/rides", get(accounts::rides))
        .route("/accounts/me/participations", get(accounts::participations))
        .route("/sessions", post(sessions::login).delete(sessions::logout))
        .route("/vehicles", post(vehicles::create).get(vehicles::list))
        .route("/vehicles/:id", get(vehicles::find).delete(vehicles::delete))
        .route("/rides", post(rides::create).get(rides::search))
        .route("/rides/:id", get(rides::find))
        .route("/rides/:id/start", patch(rides::start))
        .route("/rides/:id/complete", patch(rides::complete))
        .route("/rides/:id/cancel", patch(rides::cancel))
        .route("/rides/:id/passengers", get(rides::passengers))
        .route("/rides/:id/participations", post(participations::create))
        .route("/rides/:id/reviews", post(reviews::create))
        .route("/participations/:id/cancel", patch(participations::cancel))
        .route("/drivers/:id/reviews", get(reviews::list_for_driver))
        .route("/moderation/reviews", get(reviews::list_pending))
        .route("/moderation/reviews/:id/approve", patch(reviews::approve))
        .route("/moderation/reviews/:id/reject", patch(reviews::reject))
        .route("/admin/employees", post(admin::create_employee))
        .route("/admin/accounts/:id/suspend", patch(admin::suspend))
        .route("/admin/accounts/:id/reactivate", patch(admin::reactivate))
        .layer(Extension(api))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

pub async fn serve<T: API + Sync + Send + 'static>(api: T, addr: SocketAddr) -> Result<(), Error> {
    let api = Arc::new(api) as DynAPI;

    let app = router(api);

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| {
            tracing::error!("server error: {}", err);
            unexpected_error()
        })?;

    tracing::info!("server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", err);
            std::future::pending::<()>().await;
        }

        tracing::info!("received ctrl-c, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("received terminate signal, shutting down");
            }
            Err(err) => {
                tracing::error!("failed to install terminate handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
