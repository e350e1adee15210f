//! Client handlers.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header::LOCATION},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::auth::MaybePrincipal;
use crate::auth::policy::require_authenticated;
use crate::client::{
    Client, ClientSummary, NewClientRequest, Page, PageRequest, UpdateClientRequest,
};
use crate::error::ServiceError;

/// Multipart field carrying the uploaded picture.
const PICTURE_FIELD: &str = "file";

/// Query for `GET /clients/email`.
#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub value: String,
}

/// Register a new client.
#[instrument(skip(state, request))]
pub async fn insert_client(
    State(state): State<AppState>,
    Json(request): Json<NewClientRequest>,
) -> ApiResult<impl IntoResponse> {
    let id = state.clients.insert(request).await?;
    Ok((StatusCode::CREATED, [(LOCATION, format!("/clients/{id}"))]))
}

pub async fn get_client(
    State(state): State<AppState>,
    principal: MaybePrincipal,
    Path(id): Path<i64>,
) -> ApiResult<Json<Client>> {
    Ok(Json(state.clients.find(principal.principal(), id).await?))
}

pub async fn find_client_by_email(
    State(state): State<AppState>,
    principal: MaybePrincipal,
    Query(query): Query<EmailQuery>,
) -> ApiResult<Json<Client>> {
    Ok(Json(
        state
            .clients
            .find_by_email(principal.principal(), &query.value)
            .await?,
    ))
}

pub async fn list_clients(
    State(state): State<AppState>,
    principal: MaybePrincipal,
) -> ApiResult<Json<Vec<ClientSummary>>> {
    Ok(Json(state.clients.find_all(principal.principal()).await?))
}

pub async fn page_clients(
    State(state): State<AppState>,
    principal: MaybePrincipal,
    Query(request): Query<PageRequest>,
) -> ApiResult<Json<Page<ClientSummary>>> {
    Ok(Json(
        state
            .clients
            .find_page(principal.principal(), &request)
            .await?,
    ))
}

#[instrument(skip(state, principal, request))]
pub async fn update_client(
    State(state): State<AppState>,
    principal: MaybePrincipal,
    Path(id): Path<i64>,
    Json(request): Json<UpdateClientRequest>,
) -> ApiResult<StatusCode> {
    state
        .clients
        .update(principal.principal(), id, request)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, principal))]
pub async fn delete_client(
    State(state): State<AppState>,
    principal: MaybePrincipal,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.clients.delete(principal.principal(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Upload the caller's profile picture.
#[instrument(skip(state, principal, multipart))]
pub async fn upload_profile_picture(
    State(state): State<AppState>,
    principal: MaybePrincipal,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    require_authenticated(principal.principal()).map_err(ServiceError::from)?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() == Some(PICTURE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            upload = Some(bytes.to_vec());
            break;
        }
    }

    let upload = upload
        .ok_or_else(|| ApiError::bad_request(format!("Missing '{PICTURE_FIELD}' field")))?;
    let url = state
        .clients
        .upload_profile_picture(principal.principal(), upload)
        .await?;

    Ok((StatusCode::CREATED, [(LOCATION, url)]))
}
