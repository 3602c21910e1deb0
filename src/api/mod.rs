//! Web API module for Dolt
//!
//! - `/api/v1/*`: JSON API, optionally HMAC-signed, acting for the user named in
//!   the `x-dolt-user` header
//! - `/slack/commands`: Slack slash-command webhook, signature-checked

pub mod auth;
pub mod handlers;
pub mod state;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

pub use state::AppState;

/// Create the JSON API router
pub fn create_api_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/version", get(handlers::version::get_version))
        // Tasks API
        .route(
            "/tasks",
            get(handlers::tasks::list_tasks).post(handlers::tasks::create_task),
        )
        .route(
            "/tasks/{id}",
            get(handlers::tasks::get_task)
                .patch(handlers::tasks::update_task)
                .delete(handlers::tasks::delete_task),
        )
        .route(
            "/tasks/{id}/complete",
            post(handlers::tasks::complete_task),
        )
        // Groups API
        .route(
            "/groups",
            get(handlers::groups::list_groups).post(handlers::groups::create_group),
        )
        .route(
            "/groups/{id}",
            get(handlers::groups::get_group).delete(handlers::groups::delete_group),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ))
        // Public: added after the layer so it stays unauthenticated
        .route("/auth/info", get(auth::auth_info))
}

/// Create the Slack webhook router
pub fn create_slack_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/commands", post(handlers::slack::slash_command))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::slack_signature_middleware,
        ))
}

/// Create the full router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", create_api_router(&state))
        .nest("/slack", create_slack_router(&state))
        .layer(cors)
        .with_state(state)
}

/// Start the server and run until Ctrl+C
pub async fn start_server(host: &str, port: u16, state: AppState) -> std::io::Result<()> {
    let app = create_router(state);
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Dolt API server: http://{}/api/v1", addr);
    tracing::info!("Slack slash commands: http://{}/slack/commands", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
}
