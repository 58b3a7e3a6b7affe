//! # Collaborator Traits
//!
//! Contracts for the services the domain layer talks to: the deals API, image
//! storage, and the signed-in session. Implementations live outside the
//! domain so the catalog and the add-deal flow can run against the real
//! backend or the in-memory versions in [`crate::storage::memory`].

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use shared::{
    AddDealResponse, AddRestaurantDealRequest, ApiResponse, Coordinates, RestaurantDealsResponse,
    SimpleRestaurant, VoteType,
};
use tokio::sync::watch;

use crate::domain::models::User;

/// Access to restaurant deals.
///
/// `fetch_deals` is a publisher: it does not return deals directly but
/// updates the accumulated collection, which consumers observe through
/// `accumulated_deals`.
#[async_trait]
pub trait RestaurantDealsRepository: Send + Sync {
    /// Live, replayable view of every restaurant/deal grouping known so far.
    /// The channel never closes while the repository is alive.
    fn accumulated_deals(&self) -> watch::Receiver<Vec<RestaurantDealsResponse>>;

    /// Fetch deals around `coordinates` and fold them into the accumulated collection.
    async fn fetch_deals(&self, coordinates: Coordinates, radius_meters: f64, user_id: Option<&str>) -> Result<()>;

    async fn add_deal(&self, request: AddRestaurantDealRequest) -> Result<AddDealResponse>;

    async fn update_vote(&self, deal_id: &str, user_id: &str, vote: VoteType) -> Result<ApiResponse>;

    async fn save_deal(&self, deal_id: &str, user_id: &str) -> Result<ApiResponse>;

    async fn unsave_deal(&self, deal_id: &str, user_id: &str) -> Result<ApiResponse>;

    async fn get_saved_deals(&self, user_id: &str) -> Result<Vec<RestaurantDealsResponse>>;

    /// Only the deal's author may delete it.
    async fn delete_deal(&self, deal_id: &str, user_id: &str) -> Result<ApiResponse>;

    /// A single restaurant with its current deals, if the backend knows it.
    async fn get_restaurant(&self, place_id: &str) -> Result<Option<RestaurantDealsResponse>>;

    async fn search_nearby_restaurants(
        &self,
        keyword: &str,
        coordinates: Coordinates,
        radius_meters: f64,
    ) -> Result<Vec<SimpleRestaurant>>;
}

/// Remote storage for deal photos.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Upload the file at `local_file` under `owner_key`, returning its download URL.
    async fn upload_image(&self, owner_key: &str, local_file: &Path) -> Result<String>;
}

/// Signed-in session.
pub trait AuthRepository: Send + Sync {
    /// Current user, `None` for guests.
    fn logged_in_user(&self) -> watch::Receiver<Option<User>>;

    fn current_user(&self) -> Option<User> {
        let receiver = self.logged_in_user();
        let user = receiver.borrow().clone();
        user
    }

    fn is_logged_in(&self) -> bool {
        self.current_user().is_some()
    }
}
