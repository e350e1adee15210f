//! Category, state and city handlers. All public.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::category::Category;
use crate::city::{City, State as FederativeUnit};

pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.categories.find_all().await?))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Category>> {
    Ok(Json(state.categories.find(id).await?))
}

pub async fn list_states(State(state): State<AppState>) -> ApiResult<Json<Vec<FederativeUnit>>> {
    Ok(Json(state.cities.states().await?))
}

/// Cities of a state, ordered by name.
pub async fn list_cities(
    State(state): State<AppState>,
    Path(state_id): Path<i64>,
) -> ApiResult<Json<Vec<City>>> {
    Ok(Json(state.cities.cities_of_state(state_id).await?))
}
