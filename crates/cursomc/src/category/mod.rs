//! Product categories.

mod models;
mod repository;
mod service;

pub use models::Category;
pub use repository::CategoryRepository;
pub use service::CategoryService;
