pub mod availability;
pub mod deal;
pub mod query;
pub mod restaurant;
pub mod user;

pub use availability::{AvailabilityRestriction, DayOfWeek, DayWithTimeInterval, TimeInterval};
pub use deal::Deal;
pub use query::{CustomFilter, CustomFilterUpdate, PresetFilter, SortKey};
pub use restaurant::{RestaurantDeals, SelectedRestaurant};
pub use user::User;
