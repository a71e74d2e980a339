pub mod coupons;
pub mod subscriptions;
