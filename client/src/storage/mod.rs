//! # Storage Module
//!
//! Collaborator contracts the domain depends on, plus in-memory
//! implementations used for offline runs and tests.

pub mod memory;
pub mod traits;

pub use memory::{InMemoryAuthRepository, InMemoryDealsRepository, InMemoryImageStorage};
pub use traits::{AuthRepository, ImageStorage, RestaurantDealsRepository};
