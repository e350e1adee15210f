//! Location lookups.

use tracing::instrument;

use super::models::{City, State};
use super::repository::CityRepository;
use crate::error::ServiceResult;

/// Read-only access to states and cities. Public, no principal required.
#[derive(Debug, Clone)]
pub struct CityService {
    repo: CityRepository,
}

impl CityService {
    pub fn new(repo: CityRepository) -> Self {
        Self { repo }
    }

    #[instrument(skip(self))]
    pub async fn states(&self) -> ServiceResult<Vec<State>> {
        Ok(self.repo.list_states().await?)
    }

    /// Cities of `state_id`; an unknown state simply has none.
    #[instrument(skip(self))]
    pub async fn cities_of_state(&self, state_id: i64) -> ServiceResult<Vec<City>> {
        Ok(self.repo.list_cities(state_id).await?)
    }
}
