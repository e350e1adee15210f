//! Application state shared across handlers.

use std::path::PathBuf;
use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::{AuthConfig, AuthState, ConfigValidationError};
use crate::category::{CategoryRepository, CategoryService};
use crate::city::{CityRepository, CityService};
use crate::client::{ClientRepository, ClientService, ProfilePictures};
use crate::storage::LocalStorage;

/// Media configuration for the API layer.
#[derive(Clone, Debug)]
pub struct MediaState {
    /// Directory uploaded files are written to and served from.
    pub dir: PathBuf,
    /// URL prefix under which `dir` is reachable by clients.
    pub public_url: String,
    /// Largest accepted upload body.
    pub max_upload_bytes: usize,
    /// Naming and sizing of profile pictures.
    pub pictures: ProfilePictures,
}

impl MediaState {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            public_url: "/media".to_string(),
            max_upload_bytes: 5 * 1024 * 1024,
            pictures: ProfilePictures::default(),
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Authentication state.
    pub auth: AuthState,
    /// Client service.
    pub clients: Arc<ClientService>,
    /// Category service.
    pub categories: Arc<CategoryService>,
    /// State and city lookups.
    pub cities: Arc<CityService>,
    /// Media configuration.
    pub media: MediaState,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        auth: AuthState,
        clients: ClientService,
        categories: CategoryService,
        cities: CityService,
        media: MediaState,
    ) -> Self {
        Self {
            auth,
            clients: Arc::new(clients),
            categories: Arc::new(categories),
            cities: Arc::new(cities),
            media,
        }
    }

    /// Wire repositories and services over `pool`.
    ///
    /// Fails if the auth configuration has no usable signing secret.
    pub fn from_pool(
        pool: SqlitePool,
        auth: AuthConfig,
        media: MediaState,
    ) -> Result<Self, ConfigValidationError> {
        let client_repo = ClientRepository::new(pool.clone());
        let auth = AuthState::new(auth, Arc::new(client_repo.clone()))?;

        let storage = Arc::new(LocalStorage::new(&media.dir, media.public_url.clone()));
        let clients = ClientService::new(client_repo, storage, media.pictures.clone());
        let categories = CategoryService::new(CategoryRepository::new(pool.clone()));
        let cities = CityService::new(CityRepository::new(pool));

        Ok(Self::new(auth, clients, categories, cities, media))
    }
}
