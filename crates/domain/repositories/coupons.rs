use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::coupons::{CouponEntity, InsertCouponEntity};

#[automock]
#[async_trait]
pub trait CouponRepository {
    /// `code` must already be canonical (upper-cased).
    async fn find_by_code(&self, code: String) -> Result<Option<CouponEntity>>;

    async fn create(&self, insert_coupon_entity: InsertCouponEntity) -> Result<CouponEntity>;

    async fn list(&self) -> Result<Vec<CouponEntity>>;

    /// Bumps `used_count` only while the coupon is still active, unexpired and
    /// under its cap, in a single statement. Returns whether a use was recorded.
    async fn increment_usage_if_available(
        &self,
        coupon_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool>;
}
