//! cursomc back-office library
//!
//! Clients with their addresses, the category catalog, states and cities,
//! and JWT authentication, exposed over an axum HTTP API.

pub mod api;
pub mod auth;
pub mod category;
pub mod city;
pub mod client;
pub mod db;
pub mod error;
pub mod picture;
pub mod storage;
pub mod validation;
