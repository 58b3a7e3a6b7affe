use serde::{Deserialize, Serialize};
use shared::Coordinates;

use super::deal::Deal;

/// A restaurant together with every deal currently known for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantDeals {
    pub id: String,
    pub place_id: String,
    pub restaurant_name: String,
    pub display_address: Option<String>,
    pub coordinates: Coordinates,
    pub image_url: Option<String>,
    pub deals: Vec<Deal>,
}

impl RestaurantDeals {
    /// First deal in the current order; sorting anchors restaurants on it.
    pub fn top_deal(&self) -> Option<&Deal> {
        self.deals.first()
    }

    /// Same restaurant carrying only the deals that pass `keep`.
    pub fn retain_deals(&self, mut keep: impl FnMut(&Deal) -> bool) -> Self {
        Self {
            id: self.id.clone(),
            place_id: self.place_id.clone(),
            restaurant_name: self.restaurant_name.clone(),
            display_address: self.display_address.clone(),
            coordinates: self.coordinates,
            image_url: self.image_url.clone(),
            deals: self.deals.iter().filter(|deal| keep(deal)).cloned().collect(),
        }
    }
}

/// Restaurant picked in the first step of the add-deal flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedRestaurant {
    pub place_id: String,
    pub restaurant_name: String,
    pub display_address: Option<String>,
    pub coordinates: Coordinates,
    pub image_url: Option<String>,
}

impl SelectedRestaurant {
    pub fn is_complete(&self) -> bool {
        !self.place_id.is_empty() && !self.restaurant_name.is_empty()
    }
}
