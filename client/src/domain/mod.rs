//! # Domain Module
//!
//! Business logic for browsing and posting restaurant deals. Nothing here
//! knows about rendering or transport; collaborators are reached through the
//! traits in [`crate::storage::traits`].
//!
//! ## Module Organization
//!
//! - **models**: Deals, restaurants, availability rules and query parameters
//! - **catalog_view**: The sort → search → filter pipeline over a snapshot
//! - **catalog_service**: Feeds the catalog view from the repository and publishes list state
//! - **deal_form**: The add-deal draft and its validation rules
//! - **add_deal_wizard**: The five-step flow that builds and submits a draft
//! - **debounce**: Cancellable delayed task for search input
//! - **geo**: Great-circle distance
//!
//! ## Business Rules
//!
//! - The catalog pipeline always runs sort, then search, then filter
//! - Sorting never reorders the stored snapshot
//! - Missing or malformed optional data never hides a deal
//! - A deal is validated locally before the repository sees it
//! - Votes, saves and posts require a signed-in user

pub mod add_deal_wizard;
pub mod catalog_service;
pub mod catalog_view;
pub mod deal_form;
pub mod debounce;
pub mod errors;
pub mod geo;
pub mod models;

pub use add_deal_wizard::{AddDealWizard, Step};
pub use catalog_service::{ActionOutcome, CatalogService, ListUiState};
pub use catalog_view::{CatalogQuery, DealCatalogView};
pub use deal_form::DealDraft;
pub use errors::{AddDealError, ValidationError};
