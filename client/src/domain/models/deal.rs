use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{ApplicableGroup, DealType, VoteType};

use super::availability::AvailabilityRestriction;

/// A single offer at a restaurant, in domain form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: String,
    pub item: String,
    pub description: Option<String>,
    pub deal_type: DealType,
    pub price: Option<String>,
    /// Always later than `date_posted` when present
    pub expiry_date: Option<DateTime<Utc>>,
    pub date_posted: DateTime<Utc>,
    pub user_id: String,
    pub user_name: String,
    /// Free-text restriction note written by the author
    pub restrictions: String,
    pub image_url: Option<String>,
    pub num_up_votes: u32,
    pub num_down_votes: u32,
    /// The viewer's own vote
    pub user_vote: VoteType,
    pub user_saved: bool,
    pub availability: AvailabilityRestriction,
    pub applicable_group: ApplicableGroup,
}

impl Deal {
    /// Upvotes minus downvotes.
    pub fn net_votes(&self) -> i64 {
        i64::from(self.num_up_votes) - i64::from(self.num_down_votes)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.map_or(false, |expiry| expiry <= now)
    }
}
