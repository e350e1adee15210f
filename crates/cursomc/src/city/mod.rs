//! States and their cities.

mod models;
mod repository;
mod service;

pub use models::{City, CityDetail, State};
pub use repository::CityRepository;
pub use service::CityService;
