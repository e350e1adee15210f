//! Clients: registration, lookup, maintenance and profile pictures.

mod models;
mod repository;
mod service;

pub use models::{
    Address, Client, ClientKind, ClientSummary, Direction, MAX_LINES_PER_PAGE, NewClientRequest,
    Page, PageRequest, SortField, UpdateClientRequest,
};
pub use repository::ClientRepository;
pub use service::{ClientService, ProfilePictures, validate_new_client, validate_update};
