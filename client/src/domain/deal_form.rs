//! Draft of a deal being authored, and the checks run on it.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use shared::{
    AddRestaurantDealRequest, ApplicableGroup, AutoPopulateDealsResponse, DealType, NewDeal, DAYS_IN_WEEK,
    MAX_MINUTES_IN_DAY, MIN_MINUTES_IN_DAY, NOT_AVAILABLE,
};

use crate::domain::errors::ValidationError;
use crate::domain::models::{DayOfWeek, SelectedRestaurant};

pub const EXPIRY_DATE_FORMAT: &str = "%d/%m/%Y";

static PRICE_INPUT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[0-9]*(\.[0-9]{0,2})?$").ok());

/// Everything entered across the wizard steps.
#[derive(Debug, Clone, PartialEq)]
pub struct DealDraft {
    pub restaurant: Option<SelectedRestaurant>,
    pub item: String,
    pub description: String,
    pub price: String,
    pub deal_type: Option<DealType>,
    /// Local file picked or captured for upload
    pub image_path: Option<PathBuf>,
    /// Storage key of the uploaded image
    pub image_key: Option<String>,
    /// Minutes since midnight per weekday, Monday first, or `NOT_AVAILABLE`
    pub start_times: [i32; DAYS_IN_WEEK],
    pub end_times: [i32; DAYS_IN_WEEK],
    /// `dd/mm/yyyy`
    pub expiry_text: String,
    pub applicable_groups: HashSet<ApplicableGroup>,
}

impl Default for DealDraft {
    fn default() -> Self {
        Self {
            restaurant: None,
            item: String::new(),
            description: String::new(),
            price: String::new(),
            deal_type: Some(DealType::Discount),
            image_path: None,
            image_key: None,
            start_times: [MIN_MINUTES_IN_DAY; DAYS_IN_WEEK],
            end_times: [MAX_MINUTES_IN_DAY; DAYS_IN_WEEK],
            expiry_text: String::new(),
            applicable_groups: HashSet::from([ApplicableGroup::Everyone]),
        }
    }
}

/// Digits, then optionally a point and at most two digits.
pub fn is_valid_price_input(text: &str) -> bool {
    PRICE_INPUT.as_ref().map_or(false, |pattern| pattern.is_match(text))
}

/// Last millisecond of the given `dd/mm/yyyy` day in UTC; `None` when the
/// text does not parse.
pub fn parse_expiry(text: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(text.trim(), EXPIRY_DATE_FORMAT).ok()?;
    Some(date.and_hms_milli_opt(23, 59, 59, 999)?.and_utc())
}

/// Each day is either unavailable at both ends or a window with
/// `0 <= start < end <= 1440`, and at least one day is available.
pub fn validate_time_ranges(start_times: &[i32], end_times: &[i32]) -> Result<(), ValidationError> {
    if start_times.len() != DAYS_IN_WEEK || end_times.len() != DAYS_IN_WEEK {
        return Err(ValidationError::InvalidTimeRange);
    }

    let mut any_available = false;
    for (&start, &end) in start_times.iter().zip(end_times) {
        match (start == NOT_AVAILABLE, end == NOT_AVAILABLE) {
            (true, true) => {}
            (false, false) if MIN_MINUTES_IN_DAY <= start && start < end && end <= MAX_MINUTES_IN_DAY => {
                any_available = true;
            }
            _ => return Err(ValidationError::InvalidTimeRange),
        }
    }

    if any_available {
        Ok(())
    } else {
        Err(ValidationError::InvalidTimeRange)
    }
}

pub fn validate_applicable_groups(groups: &HashSet<ApplicableGroup>) -> Result<(), ValidationError> {
    if groups.is_empty() {
        Err(ValidationError::InvalidApplicableGroups)
    } else {
        Ok(())
    }
}

fn suggestion(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != "null")
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl DealDraft {
    /// Replaces the price unless `text` breaks the price pattern, in which
    /// case the current value is kept and `false` is returned.
    pub fn set_price(&mut self, text: &str) -> bool {
        if !is_valid_price_input(text) {
            return false;
        }
        self.price = text.to_string();
        true
    }

    pub fn toggle_group(&mut self, group: ApplicableGroup) {
        if !self.applicable_groups.remove(&group) {
            self.applicable_groups.insert(group);
        }
    }

    /// Sets one weekday's window; `None` marks the day unavailable.
    pub fn set_day_window(&mut self, day: DayOfWeek, window: Option<(i32, i32)>) {
        let (start, end) = window.unwrap_or((NOT_AVAILABLE, NOT_AVAILABLE));
        self.start_times[day.index()] = start;
        self.end_times[day.index()] = end;
    }

    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        parse_expiry(&self.expiry_text)
    }

    /// Expiry for a deal posted at `now`. An expiry that is not after `now`
    /// is dropped.
    pub fn expiry_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let expiry = self.expiry()?;
        if expiry <= now {
            warn!("Expiry {} is not after {}, posting without one", expiry, now);
            return None;
        }
        Some(expiry)
    }

    /// Restaurant, item name and type are present.
    pub fn is_complete(&self) -> bool {
        self.restaurant.as_ref().map_or(false, SelectedRestaurant::is_complete)
            && !self.item.trim().is_empty()
            && self.deal_type.is_some()
    }

    /// Stops at the first failing check.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_time_ranges(&self.start_times, &self.end_times)?;
        validate_applicable_groups(&self.applicable_groups)?;
        if !self.is_complete() {
            return Err(ValidationError::IncompleteDraft);
        }
        Ok(())
    }

    /// Merges auto-populated fields, skipping absent values and `"null"`.
    pub fn apply_suggestions(&mut self, response: &AutoPopulateDealsResponse) {
        if let Some(item) = suggestion(&response.item_name) {
            self.item = item.to_string();
        }
        if let Some(description) = suggestion(&response.deal_description) {
            self.description = description.to_string();
        }
        if let Some(price) = suggestion(&response.price) {
            self.set_price(price);
        }
        if let Some(deal_type) = suggestion(&response.deal_type) {
            self.deal_type = Some(DealType::from_name(deal_type));
        }
        if let Some(group) = suggestion(&response.applicable_group) {
            self.applicable_groups = HashSet::from([ApplicableGroup::from_name(group)]);
        }
        if let Some(expiry) = suggestion(&response.expiry_date) {
            if parse_expiry(expiry).is_some() {
                self.expiry_text = expiry.to_string();
            }
        }
    }

    /// Validates, then assembles the add-deal request.
    pub fn to_request(&self, user_id: &str, now: DateTime<Utc>) -> Result<AddRestaurantDealRequest, ValidationError> {
        self.validate()?;
        let (Some(restaurant), Some(deal_type)) = (&self.restaurant, self.deal_type) else {
            return Err(ValidationError::IncompleteDraft);
        };

        let applicable_groups = ApplicableGroup::ALL
            .into_iter()
            .filter(|group| self.applicable_groups.contains(group))
            .collect();

        Ok(AddRestaurantDealRequest {
            place_id: restaurant.place_id.clone(),
            coordinates: restaurant.coordinates,
            restaurant_name: restaurant.restaurant_name.clone(),
            display_address: restaurant.display_address.clone().unwrap_or_default(),
            deal: NewDeal {
                item: self.item.trim().to_string(),
                description: non_blank(&self.description),
                deal_type,
                price: non_blank(&self.price),
                expiry_date: self.expiry_after(now).map(|expiry| expiry.timestamp_millis()),
                date_posted: now.timestamp_millis(),
                user_id: user_id.to_string(),
                image_id: self.image_path.as_ref().and(self.image_key.clone()),
                applicable_groups,
                daily_start_times: self.start_times.to_vec(),
                daily_end_times: self.end_times.to_vec(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use shared::Coordinates;

    fn selected() -> SelectedRestaurant {
        SelectedRestaurant {
            place_id: "placeId_123".to_string(),
            restaurant_name: "MCD".to_string(),
            display_address: Some("123 Park Road".to_string()),
            coordinates: Coordinates::new(1.35, 103.87),
            image_url: None,
        }
    }

    fn complete_draft() -> DealDraft {
        DealDraft {
            restaurant: Some(selected()),
            item: "Fries".to_string(),
            ..DealDraft::default()
        }
    }

    #[test]
    fn test_price_pattern() {
        for ok in ["", "0", "12", "12.", "12.5", "12.50", ".5", "."] {
            assert!(is_valid_price_input(ok), "{ok:?} should be accepted");
        }
        for bad in ["12.505", "1a", "-1", "1.2.3", "$5", "1,5", "١٢"] {
            assert!(!is_valid_price_input(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_invalid_price_keystroke_keeps_value() {
        let mut draft = DealDraft::default();
        assert!(draft.set_price("4.9"));
        assert!(draft.set_price("4.99"));

        assert!(!draft.set_price("4.999"));
        assert_eq!(draft.price, "4.99");
    }

    #[test]
    fn test_parse_expiry() {
        assert_eq!(
            parse_expiry("25/12/2024"),
            Some(Utc.with_ymd_and_hms(2024, 12, 26, 0, 0, 0).unwrap() - chrono::Duration::milliseconds(1))
        );
        assert_eq!(parse_expiry("31/02/2024"), None);
        assert_eq!(parse_expiry("2024-12-25"), None);
        assert_eq!(parse_expiry(""), None);
    }

    #[test]
    fn test_time_ranges() {
        let full_start = [0; 7];
        let full_end = [1440; 7];
        assert_eq!(validate_time_ranges(&full_start, &full_end), Ok(()));

        let mut start = full_start;
        let mut end = full_end;
        start[0] = 600;
        end[0] = 500;
        assert_eq!(validate_time_ranges(&start, &end), Err(ValidationError::InvalidTimeRange));

        let closed = [NOT_AVAILABLE; 7];
        assert_eq!(validate_time_ranges(&closed, &closed), Err(ValidationError::InvalidTimeRange));

        let mut half_open = closed;
        half_open[2] = 540;
        assert_eq!(validate_time_ranges(&half_open, &closed), Err(ValidationError::InvalidTimeRange));

        let mut end_only = closed;
        end_only[2] = 660;
        assert_eq!(validate_time_ranges(&half_open, &end_only), Ok(()));

        let mut too_late = full_end;
        too_late[6] = 1441;
        assert_eq!(validate_time_ranges(&full_start, &too_late), Err(ValidationError::InvalidTimeRange));

        assert_eq!(validate_time_ranges(&[0; 6], &[1440; 6]), Err(ValidationError::InvalidTimeRange));
    }

    #[test]
    fn test_validation_order() {
        let mut draft = DealDraft {
            applicable_groups: HashSet::new(),
            ..DealDraft::default()
        };
        draft.set_day_window(DayOfWeek::Monday, Some((600, 500)));
        assert_eq!(draft.validate(), Err(ValidationError::InvalidTimeRange));

        draft.set_day_window(DayOfWeek::Monday, None);
        assert_eq!(draft.validate(), Err(ValidationError::InvalidApplicableGroups));

        draft.toggle_group(ApplicableGroup::Student);
        assert_eq!(draft.validate(), Err(ValidationError::IncompleteDraft));
    }

    #[test]
    fn test_suggestions_skip_null_and_missing() {
        let mut draft = complete_draft();
        draft.description = "Large fries".to_string();

        draft.apply_suggestions(&AutoPopulateDealsResponse {
            item_name: Some("Burger".to_string()),
            deal_description: Some("null".to_string()),
            expiry_date: Some("01/06/2025".to_string()),
            price: Some("3.999".to_string()),
            deal_type: Some("BOGO".to_string()),
            applicable_group: Some("STUDENT".to_string()),
        });

        assert_eq!(draft.item, "Burger");
        assert_eq!(draft.description, "Large fries");
        assert_eq!(draft.price, "");
        assert_eq!(draft.deal_type, Some(DealType::Bogo));
        assert_eq!(draft.applicable_groups, HashSet::from([ApplicableGroup::Student]));
        assert_eq!(draft.expiry_text, "01/06/2025");

        draft.apply_suggestions(&AutoPopulateDealsResponse::default());
        assert_eq!(draft.item, "Burger");
    }

    #[test]
    fn test_same_day_expiry_is_kept_until_end_of_day() {
        let mut draft = complete_draft();
        draft.expiry_text = "04/03/2024".to_string();
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap();

        let request = draft.to_request("u1", now).unwrap();

        let expiry = request.deal.expiry_date.unwrap();
        assert!(expiry > request.deal.date_posted);
        assert_eq!(
            expiry,
            Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap().timestamp_millis() - 1
        );
    }

    #[test]
    fn test_past_expiry_is_dropped() {
        let mut draft = complete_draft();
        draft.expiry_text = "03/03/2024".to_string();
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap();

        let request = draft.to_request("u1", now).unwrap();

        assert_eq!(request.deal.expiry_date, None);
        assert_eq!(draft.expiry_after(now), None);
        assert!(draft.expiry().is_some());
    }

    #[test]
    fn test_request_from_draft() {
        let mut draft = complete_draft();
        draft.price = "4.50".to_string();
        draft.expiry_text = "not a date".to_string();
        draft.image_key = Some("deal_u1_1".to_string());
        draft.toggle_group(ApplicableGroup::Senior);
        draft.set_day_window(DayOfWeek::Sunday, None);
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap();

        let request = draft.to_request("u1", now).unwrap();

        assert_eq!(request.place_id, "placeId_123");
        assert_eq!(request.display_address, "123 Park Road");
        assert_eq!(request.deal.item, "Fries");
        assert_eq!(request.deal.description, None);
        assert_eq!(request.deal.price.as_deref(), Some("4.50"));
        assert_eq!(request.deal.expiry_date, None);
        assert_eq!(request.deal.date_posted, now.timestamp_millis());
        // Key without an attached file is not sent
        assert_eq!(request.deal.image_id, None);
        assert_eq!(
            request.deal.applicable_groups,
            vec![ApplicableGroup::Senior, ApplicableGroup::Everyone]
        );
        assert_eq!(request.deal.daily_start_times[6], NOT_AVAILABLE);
        assert_eq!(request.deal.daily_end_times[0], 1440);
    }
}
