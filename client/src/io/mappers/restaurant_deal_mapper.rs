use chrono::{DateTime, TimeZone, Utc};
use log::warn;
use shared::{
    RawDeal, RestaurantDealsResponse, SimpleRestaurant, DAYS_IN_WEEK, MAX_MINUTES_IN_DAY, MIN_MINUTES_IN_DAY,
    NOT_AVAILABLE,
};

use crate::domain::models::{
    AvailabilityRestriction, DayOfWeek, DayWithTimeInterval, Deal, RestaurantDeals, SelectedRestaurant,
};

/// Converts server payloads into domain models.
#[derive(Debug, Clone, Default)]
pub struct RestaurantDealMapper {
    image_base_url: String,
}

/// How one day slot of the start/end arrays reads.
#[derive(Debug, Clone, Copy, PartialEq)]
enum DaySlot {
    Unavailable,
    FullDay,
    Window(u32, u32),
}

fn classify_slot(start: i32, end: i32) -> DaySlot {
    if start == NOT_AVAILABLE || end == NOT_AVAILABLE || (start == 0 && end == 0) {
        return DaySlot::Unavailable;
    }
    if start < MIN_MINUTES_IN_DAY || end > MAX_MINUTES_IN_DAY || start >= end {
        warn!("Ignoring malformed time slot {}-{}", start, end);
        return DaySlot::Unavailable;
    }
    if start == MIN_MINUTES_IN_DAY && end == MAX_MINUTES_IN_DAY {
        DaySlot::FullDay
    } else {
        DaySlot::Window(start as u32, end as u32)
    }
}

impl RestaurantDealMapper {
    pub fn new(image_base_url: impl Into<String>) -> Self {
        Self {
            image_base_url: image_base_url.into(),
        }
    }

    /// Full URL for a stored image key.
    pub fn image_url(&self, image_id: Option<&str>) -> Option<String> {
        let image_id = image_id?.trim();
        if image_id.is_empty() {
            return None;
        }
        if self.image_base_url.is_empty() || image_id.starts_with("http") {
            return Some(image_id.to_string());
        }
        Some(format!("{}/{}", self.image_base_url.trim_end_matches('/'), image_id))
    }

    /// Maps per-day start/end minute arrays (Monday first) to a restriction.
    /// Missing or wrongly sized arrays mean no restriction.
    pub fn restriction_from_times(start_times: Option<&[i32]>, end_times: Option<&[i32]>) -> AvailabilityRestriction {
        let (Some(start_times), Some(end_times)) = (start_times, end_times) else {
            return AvailabilityRestriction::NoRestriction;
        };
        if start_times.len() != DAYS_IN_WEEK || end_times.len() != DAYS_IN_WEEK {
            warn!(
                "Expected {} daily start/end times, got {}/{}",
                DAYS_IN_WEEK,
                start_times.len(),
                end_times.len()
            );
            return AvailabilityRestriction::NoRestriction;
        }

        let slots: Vec<(DayOfWeek, DaySlot)> = DayOfWeek::ALL
            .into_iter()
            .map(|day| (day, classify_slot(start_times[day.index()], end_times[day.index()])))
            .collect();

        if slots.iter().all(|(_, slot)| *slot == DaySlot::FullDay) {
            return AvailabilityRestriction::NoRestriction;
        }
        if slots.iter().all(|(_, slot)| *slot == DaySlot::Unavailable) {
            warn!("Deal has no available day, treating it as unrestricted");
            return AvailabilityRestriction::NoRestriction;
        }

        let has_windows = slots.iter().any(|(_, slot)| matches!(slot, DaySlot::Window(_, _)));
        if !has_windows {
            let days = slots
                .iter()
                .filter(|(_, slot)| *slot == DaySlot::FullDay)
                .map(|(day, _)| *day)
                .collect();
            return AvailabilityRestriction::Days(days);
        }

        let intervals = slots
            .into_iter()
            .filter_map(|(day, slot)| match slot {
                DaySlot::Unavailable => None,
                DaySlot::FullDay => Some(DayWithTimeInterval::new(day, 0, MAX_MINUTES_IN_DAY as u32)),
                DaySlot::Window(start, end) => Some(DayWithTimeInterval::new(day, start, end)),
            })
            .collect();
        AvailabilityRestriction::DaysAndTimes(intervals)
    }

    /// Inverse of [`Self::restriction_from_times`].
    pub fn times_from_restriction(restriction: &AvailabilityRestriction) -> (Vec<i32>, Vec<i32>) {
        let mut start_times = vec![NOT_AVAILABLE; DAYS_IN_WEEK];
        let mut end_times = vec![NOT_AVAILABLE; DAYS_IN_WEEK];

        match restriction {
            AvailabilityRestriction::NoRestriction => {
                start_times.fill(MIN_MINUTES_IN_DAY);
                end_times.fill(MAX_MINUTES_IN_DAY);
            }
            AvailabilityRestriction::Days(days) => {
                for day in days {
                    start_times[day.index()] = MIN_MINUTES_IN_DAY;
                    end_times[day.index()] = MAX_MINUTES_IN_DAY;
                }
            }
            AvailabilityRestriction::DaysAndTimes(slots) => {
                for slot in slots {
                    start_times[slot.day.index()] = slot.interval.start_minute as i32;
                    end_times[slot.day.index()] = slot.interval.end_minute as i32;
                }
            }
        }

        (start_times, end_times)
    }

    pub fn to_domain_deal(&self, raw: &RawDeal) -> Deal {
        let date_posted = millis_to_datetime(raw.date_posted).unwrap_or_else(|| {
            warn!("Deal {} has an invalid post date {}", raw.id, raw.date_posted);
            DateTime::<Utc>::default()
        });
        let expiry_date = raw.expiry_date.and_then(millis_to_datetime).filter(|expiry| {
            let valid = *expiry > date_posted;
            if !valid {
                warn!("Deal {} expires before it was posted, dropping expiry", raw.id);
            }
            valid
        });

        Deal {
            id: raw.id.clone(),
            item: raw.item.clone(),
            description: raw.description.clone(),
            deal_type: raw.deal_type,
            price: raw.price.clone(),
            expiry_date,
            date_posted,
            user_id: raw.user_id.clone(),
            user_name: raw.username.clone().unwrap_or_default(),
            restrictions: raw.restrictions.clone(),
            image_url: self.image_url(raw.image_id.as_deref()),
            num_up_votes: raw.num_upvote.unwrap_or(0),
            num_down_votes: raw.num_downvote.unwrap_or(0),
            user_vote: raw.user_vote.unwrap_or_default(),
            user_saved: raw.user_saved,
            availability: Self::restriction_from_times(
                raw.daily_start_times.as_deref(),
                raw.daily_end_times.as_deref(),
            ),
            applicable_group: raw.applicable_group,
        }
    }

    pub fn to_domain(&self, response: &RestaurantDealsResponse) -> RestaurantDeals {
        RestaurantDeals {
            id: response.id.clone(),
            place_id: response.place_id.clone(),
            restaurant_name: response.restaurant_name.clone(),
            display_address: response.display_address.clone(),
            coordinates: response.coordinates,
            image_url: response.image_url.clone(),
            deals: response.raw_deals.iter().map(|raw| self.to_domain_deal(raw)).collect(),
        }
    }

    pub fn to_domain_list(&self, responses: &[RestaurantDealsResponse]) -> Vec<RestaurantDeals> {
        responses.iter().map(|response| self.to_domain(response)).collect()
    }

    pub fn to_selected_restaurant(restaurant: SimpleRestaurant) -> SelectedRestaurant {
        SelectedRestaurant {
            place_id: restaurant.place_id,
            restaurant_name: restaurant.restaurant_name,
            display_address: restaurant.display_address,
            coordinates: restaurant.coordinates,
            image_url: restaurant.image_url,
        }
    }
}

pub fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}
