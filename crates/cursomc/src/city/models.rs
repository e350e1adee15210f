//! Location data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Federative unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct State {
    pub id: i64,
    pub name: String,
}

/// City as listed under its state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct City {
    pub id: i64,
    pub name: String,
}

/// City together with the state it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityDetail {
    pub id: i64,
    pub name: String,
    pub state: State,
}
