//! Deal catalog view.
//!
//! Holds the latest restaurant/deal snapshot plus the list screen's query
//! state, and derives the visible list from them. The derivation always runs
//! in the same order:
//!
//! 1. sort (restaurants, and deals inside each restaurant)
//! 2. free-text search on restaurant name or item name
//! 3. preset or custom filter
//!
//! Restaurants left without deals after steps 2 and 3 are dropped. The
//! snapshot itself is never reordered, so switching back to `SortKey::None`
//! restores the order the repository emitted.

use log::debug;
use shared::Coordinates;

use crate::domain::geo::haversine_km;
use crate::domain::models::{
    CustomFilter, CustomFilterUpdate, DayOfWeek, Deal, PresetFilter, RestaurantDeals, SortKey,
};

/// Everything the list screen lets the user change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogQuery {
    pub search_text: String,
    pub preset: PresetFilter,
    pub custom_filter: CustomFilter,
    pub sort_key: SortKey,
    /// Reference point for `SortKey::Distance`
    pub reference_location: Option<Coordinates>,
}

#[derive(Debug, Clone, Default)]
pub struct DealCatalogView {
    snapshot: Vec<RestaurantDeals>,
    query: CatalogQuery,
    visible: Vec<RestaurantDeals>,
}

impl DealCatalogView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &CatalogQuery {
        &self.query
    }

    pub fn snapshot(&self) -> &[RestaurantDeals] {
        &self.snapshot
    }

    pub fn visible(&self) -> &[RestaurantDeals] {
        &self.visible
    }

    /// Swaps in a new snapshot wholesale and recomputes.
    pub fn replace_snapshot(&mut self, snapshot: Vec<RestaurantDeals>) -> &[RestaurantDeals] {
        self.snapshot = snapshot;
        self.apply_filters()
    }

    /// Stores the search text only; callers debounce before `apply_filters`.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.query.search_text = text.into();
    }

    pub fn apply_filters(&mut self) -> &[RestaurantDeals] {
        self.visible = filter_and_sort(&self.snapshot, &self.query);
        debug!(
            "Catalog recomputed: {} of {} restaurants visible",
            self.visible.len(),
            self.snapshot.len()
        );
        &self.visible
    }

    pub fn select_preset(&mut self, preset: PresetFilter) -> &[RestaurantDeals] {
        self.query.preset = preset;
        self.apply_filters()
    }

    /// Merges a dialog change into the custom filter without applying it.
    pub fn set_custom_filter(&mut self, update: CustomFilterUpdate) {
        self.query.custom_filter = self.query.custom_filter.apply(update);
    }

    /// Activates the custom filter.
    pub fn submit_custom_filter(&mut self) -> &[RestaurantDeals] {
        self.select_preset(PresetFilter::Custom)
    }

    pub fn set_sort_key(&mut self, sort_key: SortKey) -> &[RestaurantDeals] {
        self.query.sort_key = sort_key;
        self.apply_filters()
    }

    /// Updates the distance reference; recomputes only when sorting by distance.
    pub fn set_reference_location(&mut self, location: Option<Coordinates>) {
        self.query.reference_location = location;
        if self.query.sort_key == SortKey::Distance {
            self.apply_filters();
        }
    }
}

/// Runs the sort → search → filter pipeline over `snapshot`.
pub fn filter_and_sort(snapshot: &[RestaurantDeals], query: &CatalogQuery) -> Vec<RestaurantDeals> {
    let sorted = sort_restaurants(snapshot, query.sort_key, query.reference_location);
    let searched = search_restaurants(sorted, &query.search_text);
    filter_restaurants(searched, query.preset, &query.custom_filter)
}

pub fn sort_restaurants(
    snapshot: &[RestaurantDeals],
    sort_key: SortKey,
    reference_location: Option<Coordinates>,
) -> Vec<RestaurantDeals> {
    let mut restaurants = snapshot.to_vec();

    match sort_key {
        SortKey::None => {}
        SortKey::Distance => match reference_location {
            Some(origin) => {
                restaurants.sort_by(|a, b| {
                    let da = haversine_km(origin, a.coordinates);
                    let db = haversine_km(origin, b.coordinates);
                    da.total_cmp(&db)
                });
            }
            None => debug!("Distance sort requested without a reference location, keeping snapshot order"),
        },
        SortKey::DatePosted => {
            for restaurant in &mut restaurants {
                restaurant.deals.sort_by(|a, b| b.date_posted.cmp(&a.date_posted));
            }
            restaurants.sort_by(|a, b| {
                let da = a.top_deal().map(|deal| deal.date_posted);
                let db = b.top_deal().map(|deal| deal.date_posted);
                db.cmp(&da)
            });
        }
        SortKey::UpVotes => {
            for restaurant in &mut restaurants {
                restaurant.deals.sort_by(|a, b| b.net_votes().cmp(&a.net_votes()));
            }
            restaurants.sort_by(|a, b| {
                let ua = a.top_deal().map(|deal| deal.num_up_votes);
                let ub = b.top_deal().map(|deal| deal.num_up_votes);
                ub.cmp(&ua)
            });
        }
    }

    restaurants
}

/// Keeps deals whose restaurant name or item name contains `search_text`
/// (case-insensitive). Blank text keeps everything.
pub fn search_restaurants(restaurants: Vec<RestaurantDeals>, search_text: &str) -> Vec<RestaurantDeals> {
    let needle = search_text.trim().to_lowercase();
    if needle.is_empty() {
        return restaurants;
    }

    restaurants
        .into_iter()
        .filter_map(|restaurant| {
            if restaurant.restaurant_name.to_lowercase().contains(&needle) {
                return Some(restaurant);
            }
            let matched = restaurant.retain_deals(|deal| deal.item.to_lowercase().contains(&needle));
            (!matched.deals.is_empty()).then_some(matched)
        })
        .collect()
}

pub fn filter_restaurants(
    restaurants: Vec<RestaurantDeals>,
    preset: PresetFilter,
    custom_filter: &CustomFilter,
) -> Vec<RestaurantDeals> {
    let selected_days = parse_days(custom_filter);

    restaurants
        .into_iter()
        .map(|restaurant| {
            restaurant.retain_deals(|deal| match preset {
                PresetFilter::All => true,
                PresetFilter::Custom => matches_custom_filter(deal, custom_filter, &selected_days),
                type_preset => type_preset.deal_type() == Some(deal.deal_type),
            })
        })
        .filter(|restaurant| !restaurant.deals.is_empty())
        .collect()
}

/// Custom filter check for one deal. The "available now" flag and the price
/// range are carried by the filter but not evaluated here.
pub fn matches_custom_filter(deal: &Deal, filter: &CustomFilter, selected_days: &[DayOfWeek]) -> bool {
    let type_ok = filter.types.is_empty() || filter.types.contains(deal.deal_type.name());

    let group_ok = filter.restrictions.is_empty()
        || deal.applicable_group.is_unrestricted()
        || filter.restrictions.contains(deal.applicable_group.display_name());

    let day_ok = selected_days.is_empty()
        || selected_days
            .iter()
            .any(|day| deal.availability.is_available_on(*day));

    type_ok && group_ok && day_ok
}

/// Selected weekday names that parse; unknown names place no constraint.
fn parse_days(filter: &CustomFilter) -> Vec<DayOfWeek> {
    filter
        .days
        .iter()
        .filter_map(|name| DayOfWeek::from_name(name))
        .collect()
}
