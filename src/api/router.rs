use axum::{
    extract::Request,
    http::{header, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::api::{auth, cleanup};
use crate::config::FrontendConfig;
use crate::AppState;

/// Simple request logger middleware
async fn log_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    tracing::info!(">>> {} {}", method, uri);
    let res = next.run(req).await;
    tracing::info!("<<< {} {} -> {}", method, uri, res.status());
    res
}

fn cors_layer(frontend: &FrontendConfig) -> CorsLayer {
    let origins: Vec<_> = frontend
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// Build the API router
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.frontend);

    Router::new()
        // Login flow
        .route("/api/auth/login", get(auth::login))
        .route("/api/auth/callback", get(auth::callback))
        .route("/api/auth/user", get(auth::user))
        .route("/api/auth/logout", post(auth::logout))
        // Mailbox operations
        .route("/api/gmail/stats", get(cleanup::stats))
        .route("/api/gmail/preview", post(cleanup::preview))
        .route("/api/gmail/cleanup", post(cleanup::cleanup))
        // Apply logger middleware
        .layer(middleware::from_fn(log_middleware))
        .layer(cors)
        .with_state(state)
}
