//! API route definitions.

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::auth::{LOGIN_PATH, authenticate};

use super::handlers;
use super::state::AppState;

/// Route stored media files are served under.
pub const MEDIA_ROUTE: &str = "/media";

/// Create the application router.
///
/// Every route passes through the authentication middleware, which attaches
/// the caller's principal when a valid bearer token is present. Access rules
/// are enforced by the services, not by the routing.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let auth_state = state.auth.clone();
    let media_dir = state.media.dir.clone();
    let upload_limit = state.media.max_upload_bytes;

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route(LOGIN_PATH, post(handlers::login))
        .route("/auth/refresh_token", post(handlers::refresh_token))
        // Catalog and locations
        .route("/categories", get(handlers::list_categories))
        .route("/categories/{id}", get(handlers::get_category))
        .route("/states", get(handlers::list_states))
        .route("/states/{state_id}/cities", get(handlers::list_cities))
        // Clients
        .route(
            "/clients",
            get(handlers::list_clients).post(handlers::insert_client),
        )
        .route("/clients/email", get(handlers::find_client_by_email))
        .route("/clients/page", get(handlers::page_clients))
        .route(
            "/clients/picture",
            post(handlers::upload_profile_picture).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/clients/{id}",
            get(handlers::get_client)
                .put(handlers::update_client)
                .delete(handlers::delete_client),
        )
        .with_state(state);

    Router::new()
        .merge(api_routes)
        .nest_service(MEDIA_ROUTE, ServeDir::new(media_dir))
        .layer(middleware::from_fn_with_state(auth_state, authenticate))
        .layer(cors)
        .layer(trace_layer)
}

/// Build the CORS layer based on configuration.
///
/// With no valid configured origin, cross-origin requests are denied.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let headers = [
        header::AUTHORIZATION,
        header::CONTENT_TYPE,
        header::ACCEPT,
        header::ORIGIN,
    ];

    let origins: Vec<HeaderValue> = state
        .auth
        .allowed_origins()
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("CORS: Invalid origin in config: {}", origin);
                None
            })
        })
        .collect();

    if origins.is_empty() {
        tracing::warn!("CORS: No valid origins configured, denying all cross-origin requests");
        CorsLayer::new().allow_origin(AllowOrigin::exact(HeaderValue::from_static("null")))
    } else {
        tracing::info!("CORS: Allowing {} origin(s)", origins.len());
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(true)
    }
}
