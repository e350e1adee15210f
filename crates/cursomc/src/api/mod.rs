//! HTTP API module.

mod error;
mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use handlers::HealthResponse;
pub use routes::{MEDIA_ROUTE, create_router};
pub use state::{AppState, MediaState};
