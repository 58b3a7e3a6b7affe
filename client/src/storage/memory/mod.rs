//! In-memory collaborators for offline runs and tests.

pub mod auth_repository;
pub mod deals_repository;
pub mod image_storage;

pub use auth_repository::InMemoryAuthRepository;
pub use deals_repository::{sample_restaurants, InMemoryDealsRepository};
pub use image_storage::InMemoryImageStorage;
