//! HTTP request handlers.

mod auth;
mod catalog;
mod clients;

pub use auth::{login, refresh_token};
pub use catalog::{get_category, list_categories, list_cities, list_states};
pub use clients::{
    delete_client, find_client_by_email, get_client, insert_client, list_clients,
    page_clients, update_client, upload_profile_picture,
};

use axum::Json;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
