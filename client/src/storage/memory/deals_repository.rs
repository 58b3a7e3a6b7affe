//! # In-Memory Deals Repository
//!
//! Serves a fixed "remote" dataset from memory while keeping the same
//! accumulation rules as the networked client:
//!
//! - a fetch puts the freshly fetched restaurants first, followed by every
//!   previously accumulated restaurant the fetch did not return
//! - restaurants farther than `radius × retain_radius_multiplier` from the
//!   latest query point are then dropped from the accumulated collection
//! - vote and save calls patch the accumulated collection immediately so the
//!   next emission already reflects them

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use shared::{
    AddDealResponse, AddRestaurantDealRequest, ApiResponse, ApplicableGroup, Coordinates, RawDeal,
    RestaurantDealsResponse, SimpleRestaurant, VoteType,
};
use tokio::sync::watch;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::domain::geo::haversine_meters;
use crate::storage::traits::RestaurantDealsRepository;

pub const DEFAULT_RETAIN_RADIUS_MULTIPLIER: f64 = 3.0;

pub struct InMemoryDealsRepository {
    remote: Mutex<Vec<RestaurantDealsResponse>>,
    votes: Mutex<HashMap<(String, String), VoteType>>,
    saved: Mutex<HashMap<String, HashSet<String>>>,
    accumulated: watch::Sender<Vec<RestaurantDealsResponse>>,
    retain_radius_multiplier: f64,
    failing: AtomicBool,
    add_deal_calls: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Adjusts vote counters for a viewer moving from `previous` to `vote`.
pub fn apply_vote_to_deal(deal: &mut RawDeal, previous: VoteType, vote: VoteType) {
    if previous == vote {
        return;
    }
    let up = deal.num_upvote.unwrap_or(0);
    let down = deal.num_downvote.unwrap_or(0);

    let up = match (previous, vote) {
        (VoteType::Upvote, _) => up.saturating_sub(1),
        (_, VoteType::Upvote) => up + 1,
        _ => up,
    };
    let down = match (previous, vote) {
        (VoteType::Downvote, _) => down.saturating_sub(1),
        (_, VoteType::Downvote) => down + 1,
        _ => down,
    };

    deal.num_upvote = Some(up);
    deal.num_downvote = Some(down);
    deal.user_vote = Some(vote);
}

impl InMemoryDealsRepository {
    pub fn new(remote: Vec<RestaurantDealsResponse>) -> Self {
        Self::with_retain_radius_multiplier(remote, DEFAULT_RETAIN_RADIUS_MULTIPLIER)
    }

    pub fn with_retain_radius_multiplier(remote: Vec<RestaurantDealsResponse>, retain_radius_multiplier: f64) -> Self {
        let (accumulated, _) = watch::channel(Vec::new());
        Self {
            remote: Mutex::new(remote),
            votes: Mutex::new(HashMap::new()),
            saved: Mutex::new(HashMap::new()),
            accumulated,
            retain_radius_multiplier,
            failing: AtomicBool::new(false),
            add_deal_calls: AtomicUsize::new(0),
        }
    }

    pub fn from_config(remote: Vec<RestaurantDealsResponse>, config: &ClientConfig) -> Self {
        Self::with_retain_radius_multiplier(remote, config.retain_radius_multiplier)
    }

    /// Makes every subsequent call fail, to exercise error paths.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of times `add_deal` was invoked, successful or not.
    pub fn add_deal_calls(&self) -> usize {
        self.add_deal_calls.load(Ordering::SeqCst)
    }

    pub fn remote_snapshot(&self) -> Vec<RestaurantDealsResponse> {
        lock(&self.remote).clone()
    }

    fn ensure_available(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("Deals service unavailable"));
        }
        Ok(())
    }

    /// Copy of a remote restaurant with the viewer's own vote and saved flag filled in.
    fn personalize(&self, restaurant: &RestaurantDealsResponse, user_id: Option<&str>) -> RestaurantDealsResponse {
        let mut restaurant = restaurant.clone();
        let Some(user_id) = user_id else {
            for deal in &mut restaurant.raw_deals {
                deal.user_vote = Some(VoteType::Neutral);
                deal.user_saved = false;
            }
            return restaurant;
        };

        let votes = lock(&self.votes);
        let saved = lock(&self.saved);
        let saved_by_user = saved.get(user_id);
        for deal in &mut restaurant.raw_deals {
            let key = (deal.id.clone(), user_id.to_string());
            deal.user_vote = Some(votes.get(&key).copied().unwrap_or_default());
            deal.user_saved = saved_by_user.map_or(false, |ids| ids.contains(&deal.id));
        }
        restaurant
    }

    fn update_accumulated_deal(&self, deal_id: &str, mut update: impl FnMut(&mut RawDeal)) {
        self.accumulated.send_modify(|restaurants| {
            for restaurant in restaurants.iter_mut() {
                for deal in restaurant.raw_deals.iter_mut().filter(|deal| deal.id == deal_id) {
                    update(deal);
                }
            }
        });
    }

    fn set_saved(&self, deal_id: &str, user_id: &str, saved: bool) -> Result<ApiResponse> {
        let exists = lock(&self.remote)
            .iter()
            .any(|restaurant| restaurant.raw_deals.iter().any(|deal| deal.id == deal_id));
        if !exists {
            return Err(anyhow!("Deal {} not found", deal_id));
        }

        {
            let mut saved_deals = lock(&self.saved);
            let ids = saved_deals.entry(user_id.to_string()).or_default();
            if saved {
                ids.insert(deal_id.to_string());
            } else {
                ids.remove(deal_id);
            }
        }

        self.update_accumulated_deal(deal_id, |deal| deal.user_saved = saved);
        Ok(ApiResponse::ok())
    }
}

#[async_trait]
impl RestaurantDealsRepository for InMemoryDealsRepository {
    fn accumulated_deals(&self) -> watch::Receiver<Vec<RestaurantDealsResponse>> {
        self.accumulated.subscribe()
    }

    async fn fetch_deals(&self, coordinates: Coordinates, radius_meters: f64, user_id: Option<&str>) -> Result<()> {
        self.ensure_available()?;

        let remote = self.remote_snapshot();
        let fetched: Vec<RestaurantDealsResponse> = remote
            .iter()
            .filter(|restaurant| haversine_meters(coordinates, restaurant.coordinates) < radius_meters)
            .map(|restaurant| self.personalize(restaurant, user_id))
            .collect();
        debug!("Fetched {} restaurants within {}m", fetched.len(), radius_meters);

        let retain_radius = radius_meters * self.retain_radius_multiplier;
        self.accumulated.send_modify(|accumulated| {
            let fetched_ids: HashSet<&str> = fetched.iter().map(|r| r.id.as_str()).collect();
            let kept_previous: Vec<RestaurantDealsResponse> = accumulated
                .drain(..)
                .filter(|restaurant| !fetched_ids.contains(restaurant.id.as_str()))
                .collect();

            let mut merged = fetched.clone();
            merged.extend(kept_previous);
            merged.retain(|restaurant| haversine_meters(coordinates, restaurant.coordinates) < retain_radius);
            *accumulated = merged;
        });
        Ok(())
    }

    async fn add_deal(&self, request: AddRestaurantDealRequest) -> Result<AddDealResponse> {
        self.add_deal_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;

        let deal_id = Uuid::new_v4().to_string();
        let new_deal = request.deal;
        let applicable_group = new_deal
            .applicable_groups
            .first()
            .copied()
            .unwrap_or(ApplicableGroup::Everyone);
        let raw = RawDeal {
            id: deal_id.clone(),
            item: new_deal.item,
            description: new_deal.description,
            deal_type: new_deal.deal_type,
            expiry_date: new_deal.expiry_date,
            date_posted: new_deal.date_posted,
            user_id: new_deal.user_id,
            username: None,
            restrictions: String::new(),
            image_id: new_deal.image_id,
            price: new_deal.price,
            user_saved: false,
            user_vote: None,
            applicable_group,
            num_upvote: Some(0),
            num_downvote: Some(0),
            daily_start_times: Some(new_deal.daily_start_times),
            daily_end_times: Some(new_deal.daily_end_times),
        };

        let mut remote = lock(&self.remote);
        match remote.iter_mut().find(|restaurant| restaurant.place_id == request.place_id) {
            Some(restaurant) => restaurant.raw_deals.push(raw),
            None => remote.push(RestaurantDealsResponse {
                id: Uuid::new_v4().to_string(),
                place_id: request.place_id,
                coordinates: request.coordinates,
                restaurant_name: request.restaurant_name,
                display_address: Some(request.display_address),
                raw_deals: vec![raw],
                image_url: None,
            }),
        }

        info!("Added deal {}", deal_id);
        Ok(AddDealResponse { deal_id })
    }

    async fn update_vote(&self, deal_id: &str, user_id: &str, vote: VoteType) -> Result<ApiResponse> {
        self.ensure_available()?;

        let key = (deal_id.to_string(), user_id.to_string());
        let previous = lock(&self.votes).get(&key).copied().unwrap_or_default();

        let found = {
            let mut remote = lock(&self.remote);
            let mut found = false;
            for deal in remote
                .iter_mut()
                .flat_map(|restaurant| restaurant.raw_deals.iter_mut())
                .filter(|deal| deal.id == deal_id)
            {
                apply_vote_to_deal(deal, previous, vote);
                found = true;
            }
            found
        };
        if !found {
            return Err(anyhow!("Deal {} not found", deal_id));
        }

        lock(&self.votes).insert(key, vote);
        self.update_accumulated_deal(deal_id, |deal| apply_vote_to_deal(deal, previous, vote));
        Ok(ApiResponse::ok())
    }

    async fn save_deal(&self, deal_id: &str, user_id: &str) -> Result<ApiResponse> {
        self.ensure_available()?;
        self.set_saved(deal_id, user_id, true)
    }

    async fn unsave_deal(&self, deal_id: &str, user_id: &str) -> Result<ApiResponse> {
        self.ensure_available()?;
        self.set_saved(deal_id, user_id, false)
    }

    async fn get_saved_deals(&self, user_id: &str) -> Result<Vec<RestaurantDealsResponse>> {
        self.ensure_available()?;

        let saved_ids = lock(&self.saved).get(user_id).cloned().unwrap_or_default();
        let remote = self.remote_snapshot();
        let saved = remote
            .iter()
            .map(|restaurant| self.personalize(restaurant, Some(user_id)))
            .filter_map(|mut restaurant| {
                restaurant.raw_deals.retain(|deal| saved_ids.contains(&deal.id));
                (!restaurant.raw_deals.is_empty()).then_some(restaurant)
            })
            .collect();
        Ok(saved)
    }

    async fn delete_deal(&self, deal_id: &str, user_id: &str) -> Result<ApiResponse> {
        self.ensure_available()?;

        {
            let mut remote = lock(&self.remote);
            let author = remote
                .iter()
                .flat_map(|restaurant| restaurant.raw_deals.iter())
                .find(|deal| deal.id == deal_id)
                .map(|deal| deal.user_id.clone());

            match author {
                None => {
                    return Ok(ApiResponse {
                        success: false,
                        message: format!("Deal {} not found", deal_id),
                    })
                }
                Some(author) if author != user_id => {
                    warn!("User {} tried to delete deal {} owned by {}", user_id, deal_id, author);
                    return Ok(ApiResponse {
                        success: false,
                        message: "Only the author can delete this deal".to_string(),
                    });
                }
                Some(_) => {
                    for restaurant in remote.iter_mut() {
                        restaurant.raw_deals.retain(|deal| deal.id != deal_id);
                    }
                }
            }
        }

        self.accumulated.send_modify(|restaurants| {
            for restaurant in restaurants.iter_mut() {
                restaurant.raw_deals.retain(|deal| deal.id != deal_id);
            }
        });
        Ok(ApiResponse::ok())
    }

    async fn get_restaurant(&self, place_id: &str) -> Result<Option<RestaurantDealsResponse>> {
        self.ensure_available()?;
        Ok(lock(&self.remote)
            .iter()
            .find(|restaurant| restaurant.place_id == place_id)
            .cloned())
    }

    async fn search_nearby_restaurants(
        &self,
        keyword: &str,
        coordinates: Coordinates,
        radius_meters: f64,
    ) -> Result<Vec<SimpleRestaurant>> {
        self.ensure_available()?;

        let needle = keyword.trim().to_lowercase();
        let results = lock(&self.remote)
            .iter()
            .filter(|restaurant| haversine_meters(coordinates, restaurant.coordinates) < radius_meters)
            .filter(|restaurant| needle.is_empty() || restaurant.restaurant_name.to_lowercase().contains(&needle))
            .map(|restaurant| SimpleRestaurant {
                place_id: restaurant.place_id.clone(),
                coordinates: restaurant.coordinates,
                restaurant_name: restaurant.restaurant_name.clone(),
                display_address: restaurant.display_address.clone(),
                image_url: restaurant.image_url.clone(),
            })
            .collect();
        Ok(results)
    }
}

impl Default for InMemoryDealsRepository {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Sample dataset around a single neighbourhood, for offline runs.
pub fn sample_restaurants() -> Vec<RestaurantDealsResponse> {
    let now = Utc::now().timestamp_millis();
    let deal = |id: &str, item: &str, deal_type: shared::DealType| RawDeal {
        id: id.to_string(),
        item: item.to_string(),
        description: None,
        deal_type,
        expiry_date: None,
        date_posted: now,
        user_id: "sample".to_string(),
        username: Some("sample".to_string()),
        restrictions: String::new(),
        image_id: None,
        price: None,
        user_saved: false,
        user_vote: None,
        applicable_group: ApplicableGroup::Everyone,
        num_upvote: Some(0),
        num_downvote: Some(0),
        daily_start_times: None,
        daily_end_times: None,
    };

    vec![
        RestaurantDealsResponse {
            id: "123".to_string(),
            place_id: "placeId_123".to_string(),
            coordinates: Coordinates::new(1.35, 103.87),
            restaurant_name: "MCD".to_string(),
            display_address: Some("123 Park Road".to_string()),
            raw_deals: vec![deal("dealId_123", "Fries", shared::DealType::Bogo)],
            image_url: None,
        },
        RestaurantDealsResponse {
            id: "456".to_string(),
            place_id: "placeId_456".to_string(),
            coordinates: Coordinates::new(1.37, 103.88),
            restaurant_name: "Chef Signature".to_string(),
            display_address: Some("456 Park Road".to_string()),
            raw_deals: vec![
                deal("dealId_456", "Milkshake", shared::DealType::Bogo),
                deal("dealId_789", "Cookie", shared::DealType::Free),
            ],
            image_url: None,
        },
    ]
}
