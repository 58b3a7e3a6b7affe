//! Query parameters that drive the catalog list: presets, custom filter, sort key.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shared::DealType;

pub const DEFAULT_MIN_PRICE: f32 = 0.0;
pub const DEFAULT_MAX_PRICE: f32 = 100.0;

/// Named quick filter shown above the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PresetFilter {
    #[default]
    All,
    Bogo,
    Discount,
    Free,
    Custom,
}

impl PresetFilter {
    pub const ALL: [PresetFilter; 5] = [
        PresetFilter::All,
        PresetFilter::Bogo,
        PresetFilter::Discount,
        PresetFilter::Free,
        PresetFilter::Custom,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PresetFilter::All => "All",
            PresetFilter::Bogo => "BOGO",
            PresetFilter::Discount => "Discount",
            PresetFilter::Free => "Free",
            PresetFilter::Custom => "Custom",
        }
    }

    /// Deal type a type preset keeps; `None` for `All` and `Custom`.
    pub fn deal_type(&self) -> Option<DealType> {
        match self {
            PresetFilter::Bogo => Some(DealType::Bogo),
            PresetFilter::Discount => Some(DealType::Discount),
            PresetFilter::Free => Some(DealType::Free),
            PresetFilter::All | PresetFilter::Custom => None,
        }
    }
}

impl fmt::Display for PresetFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PresetFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetFilter::ALL
            .into_iter()
            .find(|preset| preset.label() == s)
            .ok_or_else(|| format!("Unknown filter: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    None,
    Distance,
    DatePosted,
    UpVotes,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [SortKey::None, SortKey::Distance, SortKey::DatePosted, SortKey::UpVotes];

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::None => "None",
            SortKey::Distance => "Distance",
            SortKey::DatePosted => "DatePosted",
            SortKey::UpVotes => "UpVotes",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.label() == s)
            .ok_or_else(|| format!("Unknown sort key: {}", s))
    }
}

/// User-composed filter. An empty set places no constraint on its dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFilter {
    /// Upper-case deal type names ("BOGO", "FREE", ...)
    pub types: BTreeSet<String>,
    /// Weekday names ("Monday", ...)
    pub days: BTreeSet<String>,
    /// Eligibility group display names ("Student", ...)
    pub restrictions: BTreeSet<String>,
    pub available_now: bool,
    pub min_price: f32,
    pub max_price: f32,
}

impl Default for CustomFilter {
    fn default() -> Self {
        Self {
            types: BTreeSet::new(),
            days: BTreeSet::new(),
            restrictions: BTreeSet::new(),
            available_now: false,
            min_price: DEFAULT_MIN_PRICE,
            max_price: DEFAULT_MAX_PRICE,
        }
    }
}

/// One-dimension change coming from the filter dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomFilterUpdate {
    ToggleType(String),
    ToggleDay(String),
    ToggleRestriction(String),
    PriceRange { min: f32, max: f32 },
    ToggleAvailableNow,
    Reset,
}

impl CustomFilter {
    /// Returns a copy with `update` merged in.
    pub fn apply(&self, update: CustomFilterUpdate) -> Self {
        let mut next = self.clone();
        match update {
            CustomFilterUpdate::ToggleType(name) => toggle(&mut next.types, name.trim().to_uppercase()),
            CustomFilterUpdate::ToggleDay(name) => toggle(&mut next.days, name.trim().to_string()),
            CustomFilterUpdate::ToggleRestriction(name) => toggle(&mut next.restrictions, name.trim().to_string()),
            CustomFilterUpdate::PriceRange { min, max } => {
                let min = min.clamp(DEFAULT_MIN_PRICE, DEFAULT_MAX_PRICE);
                let max = max.clamp(DEFAULT_MIN_PRICE, DEFAULT_MAX_PRICE);
                next.min_price = min.min(max);
                next.max_price = max.max(min);
            }
            CustomFilterUpdate::ToggleAvailableNow => next.available_now = !next.available_now,
            CustomFilterUpdate::Reset => next = CustomFilter::default(),
        }
        next
    }
}

fn toggle(set: &mut BTreeSet<String>, value: String) {
    if !set.remove(&value) {
        set.insert(value);
    }
}
