//! HTTP front of the booking calendar.
//!
//! Everything except `/health` and `/login` needs a bearer token. Browser
//! access is limited to the configured origins.

pub mod auth;
pub mod config;
pub mod routes;
pub mod state;

use std::time::Instant;

use axum::{
    extract::Request,
    http::{header, request::Parts, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    Router,
};
use log::info;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::ServerConfig;
use crate::state::AppState;

/// Assembles the application router.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let protected = routes::protected_router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_auth,
    ));

    Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .with_state(state)
        .layer(middleware::from_fn(log_requests))
        .layer(cors_layer(config))
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let config = config.clone();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .is_ok_and(|origin| config.origin_allowed(origin))
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;
    let code = response.status();
    info!(
        "event=http_request module=http status={} code={} method={} path={} duration_ms={}",
        if code.is_server_error() { "error" } else { "ok" },
        code.as_u16(),
        method,
        path,
        started.elapsed().as_millis()
    );
    response
}
