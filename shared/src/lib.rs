//! Wire types exchanged with the deals API.
//!
//! These mirror the server payloads one-to-one and are mapped into domain
//! models by the client crate before any business rule runs on them.

use serde::{Deserialize, Serialize};

/// Sentinel stored in a start/end time slot for a day the deal is not offered.
pub const NOT_AVAILABLE: i32 = -1;
pub const MIN_MINUTES_IN_DAY: i32 = 0;
pub const MAX_MINUTES_IN_DAY: i32 = 24 * 60;

/// Number of day slots in `daily_start_times` / `daily_end_times` (Monday first).
pub const DAYS_IN_WEEK: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Kind of offer. Unknown values coming from the server decode as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealType {
    Bogo,
    Discount,
    Free,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteType {
    Upvote,
    Downvote,
    #[default]
    #[serde(other)]
    Neutral,
}

/// Who may redeem a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicableGroup {
    #[serde(rename = "UNDER_18")]
    Under18,
    Student,
    Senior,
    LoyaltyMember,
    NewUser,
    Birthday,
    Everyone,
    #[default]
    #[serde(rename = "NONE")]
    #[serde(other)]
    Unspecified,
}

impl DealType {
    pub const ALL: [DealType; 4] = [DealType::Bogo, DealType::Discount, DealType::Free, DealType::Other];

    /// Upper-case name used by filters and the wire format.
    pub fn name(&self) -> &'static str {
        match self {
            DealType::Bogo => "BOGO",
            DealType::Discount => "DISCOUNT",
            DealType::Free => "FREE",
            DealType::Other => "OTHER",
        }
    }

    /// Parses a name case-insensitively, falling back to `Other`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "BOGO" => DealType::Bogo,
            "DISCOUNT" => DealType::Discount,
            "FREE" => DealType::Free,
            _ => DealType::Other,
        }
    }
}

impl ApplicableGroup {
    pub const ALL: [ApplicableGroup; 8] = [
        ApplicableGroup::Under18,
        ApplicableGroup::Student,
        ApplicableGroup::Senior,
        ApplicableGroup::LoyaltyMember,
        ApplicableGroup::NewUser,
        ApplicableGroup::Birthday,
        ApplicableGroup::Everyone,
        ApplicableGroup::Unspecified,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ApplicableGroup::Under18 => "Under 18",
            ApplicableGroup::Student => "Student",
            ApplicableGroup::Senior => "Senior",
            ApplicableGroup::LoyaltyMember => "Loyalty Member",
            ApplicableGroup::NewUser => "New User",
            ApplicableGroup::Birthday => "Birthday",
            ApplicableGroup::Everyone => "Everyone",
            ApplicableGroup::Unspecified => "Unspecified",
        }
    }

    /// Parses the wire name (`"STUDENT"`, `"EVERYONE"`, ...), falling back to `Unspecified`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "UNDER_18" => ApplicableGroup::Under18,
            "STUDENT" => ApplicableGroup::Student,
            "SENIOR" => ApplicableGroup::Senior,
            "LOYALTY_MEMBER" => ApplicableGroup::LoyaltyMember,
            "NEW_USER" => ApplicableGroup::NewUser,
            "BIRTHDAY" => ApplicableGroup::Birthday,
            "EVERYONE" => ApplicableGroup::Everyone,
            _ => ApplicableGroup::Unspecified,
        }
    }

    /// Groups that place no restriction on who can redeem.
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, ApplicableGroup::Everyone | ApplicableGroup::Unspecified)
    }
}

/// A restaurant and its deals, unprocessed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantDealsResponse {
    pub id: String,
    pub place_id: String,
    pub coordinates: Coordinates,
    pub restaurant_name: String,
    #[serde(default)]
    pub display_address: Option<String>,
    #[serde(rename = "Deal", default)]
    pub raw_deals: Vec<RawDeal>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A single deal as the server returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDeal {
    pub id: String,
    pub item: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub deal_type: DealType,
    /// Epoch milliseconds
    #[serde(default)]
    pub expiry_date: Option<i64>,
    /// Epoch milliseconds
    pub date_posted: i64,
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub restrictions: String,
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub user_saved: bool,
    #[serde(default)]
    pub user_vote: Option<VoteType>,
    #[serde(default)]
    pub applicable_group: ApplicableGroup,
    #[serde(default)]
    pub num_upvote: Option<u32>,
    #[serde(default)]
    pub num_downvote: Option<u32>,
    /// Minutes since midnight per day, Monday first; `None` means no restriction
    #[serde(default)]
    pub daily_start_times: Option<Vec<i32>>,
    #[serde(default)]
    pub daily_end_times: Option<Vec<i32>>,
}

/// Restaurant returned by the nearby search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleRestaurant {
    pub place_id: String,
    pub coordinates: Coordinates,
    pub restaurant_name: String,
    #[serde(default)]
    pub display_address: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Body of the add-deal call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddRestaurantDealRequest {
    pub place_id: String,
    pub coordinates: Coordinates,
    pub restaurant_name: String,
    pub display_address: String,
    pub deal: NewDeal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDeal {
    pub item: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub deal_type: DealType,
    pub price: Option<String>,
    pub expiry_date: Option<i64>,
    pub date_posted: i64,
    pub user_id: String,
    pub image_id: Option<String>,
    pub applicable_groups: Vec<ApplicableGroup>,
    pub daily_start_times: Vec<i32>,
    pub daily_end_times: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddDealResponse {
    pub deal_id: String,
}

/// Generic acknowledgement for vote/save/delete calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetRestaurantResponse {
    #[serde(default)]
    pub restaurant: Option<RestaurantDealsResponse>,
}

/// Fields suggested by the image-reading service. Any of them may be missing
/// or the literal string `"null"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoPopulateDealsResponse {
    pub item_name: Option<String>,
    pub deal_description: Option<String>,
    pub expiry_date: Option<String>,
    pub price: Option<String>,
    pub deal_type: Option<String>,
    pub applicable_group: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restaurant_deals_response_from_server_json() {
        let json = r#"{
            "id": "r1",
            "place_id": "place_1",
            "coordinates": {"latitude": 1.35, "longitude": 103.87},
            "restaurant_name": "MCD",
            "display_address": "123 Park Road",
            "Deal": [{
                "id": "d1",
                "item": "Fries",
                "type": "BOGO",
                "date_posted": 1700000000000,
                "user_id": "u1",
                "restrictions": "Students only",
                "image_id": null,
                "applicable_group": "STUDENT",
                "num_upvote": 4,
                "num_downvote": 1
            }]
        }"#;

        let response: RestaurantDealsResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.restaurant_name, "MCD");
        assert_eq!(response.raw_deals.len(), 1);
        let deal = &response.raw_deals[0];
        assert_eq!(deal.deal_type, DealType::Bogo);
        assert_eq!(deal.applicable_group, ApplicableGroup::Student);
        assert_eq!(deal.user_vote, None);
        assert_eq!(deal.daily_start_times, None);
        assert!(!deal.user_saved);
    }

    #[test]
    fn test_unknown_enum_values_fail_open() {
        let deal_type: DealType = serde_json::from_str("\"HAPPY_HOUR\"").unwrap();
        let group: ApplicableGroup = serde_json::from_str("\"VETERAN\"").unwrap();
        let vote: VoteType = serde_json::from_str("\"SIDEWAYS\"").unwrap();

        assert_eq!(deal_type, DealType::Other);
        assert_eq!(group, ApplicableGroup::Unspecified);
        assert_eq!(vote, VoteType::Neutral);
    }

    #[test]
    fn test_applicable_group_wire_names() {
        assert_eq!(serde_json::to_string(&ApplicableGroup::Under18).unwrap(), "\"UNDER_18\"");
        assert_eq!(serde_json::to_string(&ApplicableGroup::LoyaltyMember).unwrap(), "\"LOYALTY_MEMBER\"");
        assert_eq!(serde_json::to_string(&ApplicableGroup::Unspecified).unwrap(), "\"NONE\"");
    }

    #[test]
    fn test_name_parsing_matches_wire_names() {
        for deal_type in DealType::ALL {
            let wire = serde_json::to_string(&deal_type).unwrap();
            assert_eq!(wire.trim_matches('"'), deal_type.name());
            assert_eq!(DealType::from_name(deal_type.name()), deal_type);
        }
        assert_eq!(DealType::from_name("free"), DealType::Free);
        assert_eq!(ApplicableGroup::from_name("EVERYONE"), ApplicableGroup::Everyone);
        assert_eq!(ApplicableGroup::from_name("whoever"), ApplicableGroup::Unspecified);
        assert!(ApplicableGroup::Everyone.is_unrestricted());
        assert!(!ApplicableGroup::Student.is_unrestricted());
    }
}
