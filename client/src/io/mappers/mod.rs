pub mod restaurant_deal_mapper;
