//! Day-of-week and time-of-day availability rules attached to a deal.

use chrono::{Datelike, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// Day of the week, indexed Monday = 0 to match the server's 7-slot arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }

    /// Case-insensitive lookup by full day name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|day| day.name().eq_ignore_ascii_case(name))
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        Self::ALL[weekday.num_days_from_monday() as usize]
    }
}

/// Window within a day, in minutes since midnight (0..=1440).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start_minute: u32,
    pub end_minute: u32,
}

impl TimeInterval {
    pub fn new(start_minute: u32, end_minute: u32) -> Self {
        Self { start_minute, end_minute }
    }

    /// Inclusive at both ends.
    pub fn contains(&self, minute_of_day: u32) -> bool {
        minute_of_day >= self.start_minute && minute_of_day <= self.end_minute
    }

    pub fn is_empty(&self) -> bool {
        self.start_minute == 0 && self.end_minute == 0
    }

    pub fn display(&self) -> String {
        format!(
            "{:02}:{:02} - {:02}:{:02}",
            self.start_minute / 60,
            self.start_minute % 60,
            self.end_minute / 60,
            self.end_minute % 60
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWithTimeInterval {
    pub day: DayOfWeek,
    pub interval: TimeInterval,
}

impl DayWithTimeInterval {
    pub fn new(day: DayOfWeek, start_minute: u32, end_minute: u32) -> Self {
        Self {
            day,
            interval: TimeInterval::new(start_minute, end_minute),
        }
    }

    pub fn is_available_at<T: Datelike + Timelike>(&self, at: &T) -> bool {
        let minute_of_day = at.hour() * 60 + at.minute();
        self.day == DayOfWeek::from(at.weekday()) && self.interval.contains(minute_of_day)
    }
}

/// When a deal can be redeemed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AvailabilityRestriction {
    /// Available whenever the restaurant is open.
    #[default]
    NoRestriction,
    /// Available all day on the listed days.
    Days(Vec<DayOfWeek>),
    /// Available on the listed days, within each day's window.
    DaysAndTimes(Vec<DayWithTimeInterval>),
}

impl AvailabilityRestriction {
    /// Whether the deal can be redeemed at the given wall-clock time.
    pub fn is_available_at<T: Datelike + Timelike>(&self, at: &T) -> bool {
        match self {
            AvailabilityRestriction::NoRestriction => true,
            AvailabilityRestriction::Days(days) => days.contains(&DayOfWeek::from(at.weekday())),
            AvailabilityRestriction::DaysAndTimes(slots) => slots.iter().any(|slot| slot.is_available_at(at)),
        }
    }

    /// Day-level check that ignores time of day. A deal limited to
    /// "Monday 09:00 - 11:00" counts as available on Monday.
    pub fn is_available_on(&self, day: DayOfWeek) -> bool {
        match self {
            AvailabilityRestriction::NoRestriction => true,
            AvailabilityRestriction::Days(days) => days.contains(&day),
            AvailabilityRestriction::DaysAndTimes(slots) => slots.iter().any(|slot| slot.day == day),
        }
    }

    /// Days line for detail views.
    pub fn display_days(&self) -> String {
        match self {
            AvailabilityRestriction::NoRestriction => "Available any day".to_string(),
            AvailabilityRestriction::Days(days) => join_names(days.iter().copied()),
            AvailabilityRestriction::DaysAndTimes(slots) => {
                let visible: Vec<_> = visible_slots(slots).collect();
                if visible.is_empty() {
                    return "No specific time restrictions".to_string();
                }
                join_names(visible.into_iter().map(|slot| slot.day))
            }
        }
    }

    /// Times line for detail views, one line per restricted day.
    pub fn display_times(&self) -> String {
        match self {
            AvailabilityRestriction::NoRestriction => "Available any time".to_string(),
            AvailabilityRestriction::Days(_) => "Available all day".to_string(),
            AvailabilityRestriction::DaysAndTimes(slots) => {
                let lines: Vec<String> = visible_slots(slots).map(|slot| slot.interval.display()).collect();
                if lines.is_empty() {
                    "No specific time restrictions".to_string()
                } else {
                    lines.join("\n")
                }
            }
        }
    }
}

fn visible_slots(slots: &[DayWithTimeInterval]) -> impl Iterator<Item = &DayWithTimeInterval> {
    slots.iter().filter(|slot| !slot.interval.is_empty())
}

fn join_names(days: impl Iterator<Item = DayOfWeek>) -> String {
    days.map(|day| day.name()).collect::<Vec<_>>().join(", ")
}
