//! # Grub Client
//!
//! Client-side core for discovering and posting restaurant deals.
//!
//! ## Architecture
//!
//! ```text
//! UI layer (not part of this crate)
//!     ↓
//! Domain layer (catalog, add-deal wizard)
//!     ↓
//! IO layer (server payload mappers)
//!     ↓
//! Storage layer (repository traits, in-memory implementations)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod logging;
pub mod storage;

pub use config::{ClientConfig, ConfigError};
pub use logging::init_logging;
