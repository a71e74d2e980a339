pub mod coupons;
pub mod enums;
pub mod money;
pub mod subscriptions;
