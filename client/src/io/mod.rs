//! # IO Module
//!
//! Translation between the API's wire shapes (`shared`) and domain models.

pub mod mappers;

pub use mappers::restaurant_deal_mapper::RestaurantDealMapper;
