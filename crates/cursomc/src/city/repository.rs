//! Location repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::instrument;

use super::models::{City, State};

/// Repository for states and cities.
#[derive(Debug, Clone)]
pub struct CityRepository {
    pool: SqlitePool,
}

impl CityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All states ordered by name.
    #[instrument(skip(self))]
    pub async fn list_states(&self) -> Result<Vec<State>> {
        sqlx::query_as::<_, State>("SELECT id, name FROM states ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list states")
    }

    /// Cities of a state ordered by name.
    #[instrument(skip(self))]
    pub async fn list_cities(&self, state_id: i64) -> Result<Vec<City>> {
        sqlx::query_as::<_, City>(
            r#"
            SELECT id, name
            FROM cities
            WHERE state_id = ?
            ORDER BY name
            "#,
        )
        .bind(state_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list cities")
    }
}
