pub mod delivery_frequencies;
pub mod discount_types;
pub mod subscription_statuses;
