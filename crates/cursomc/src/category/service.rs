//! Category lookups.

use tracing::instrument;

use super::models::Category;
use super::repository::CategoryRepository;
use crate::error::{ServiceError, ServiceResult};

/// Read-only access to the catalog categories.
#[derive(Debug, Clone)]
pub struct CategoryService {
    repo: CategoryRepository,
}

impl CategoryService {
    pub fn new(repo: CategoryRepository) -> Self {
        Self { repo }
    }

    /// Find a category by ID.
    #[instrument(skip(self))]
    pub async fn find(&self, id: i64) -> ServiceResult<Category> {
        self.repo
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Category not found: {id}")))
    }

    #[instrument(skip(self))]
    pub async fn find_all(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.repo.list().await?)
    }
}
