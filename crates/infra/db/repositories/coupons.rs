use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::coupons::{CouponEntity, InsertCouponEntity},
        repositories::coupons::CouponRepository,
    },
    infra::db::postgres::{postgres_connection::PgPool, schema::coupons},
};

pub struct CouponPostgres {
    db_pool: Arc<PgPool>,
}

impl CouponPostgres {
    pub fn new(db_pool: Arc<PgPool>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CouponRepository for CouponPostgres {
    async fn find_by_code(&self, code: String) -> Result<Option<CouponEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = coupons::table
            .filter(coupons::code.eq(code))
            .select(CouponEntity::as_select())
            .first::<CouponEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn create(&self, insert_coupon_entity: InsertCouponEntity) -> Result<CouponEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(coupons::table)
            .values(&insert_coupon_entity)
            .returning(CouponEntity::as_returning())
            .get_result::<CouponEntity>(&mut conn)?;

        Ok(result)
    }

    async fn list(&self) -> Result<Vec<CouponEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = coupons::table
            .order(coupons::created_at.desc())
            .select(CouponEntity::as_select())
            .load::<CouponEntity>(&mut conn)?;

        Ok(results)
    }

    async fn increment_usage_if_available(
        &self,
        coupon_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(coupons::table)
            .filter(coupons::id.eq(coupon_id))
            .filter(coupons::active.eq(true))
            .filter(
                coupons::expires_at
                    .is_null()
                    .or(coupons::expires_at.assume_not_null().gt(now)),
            )
            .filter(
                coupons::max_uses
                    .is_null()
                    .or(coupons::used_count.lt(coupons::max_uses.assume_not_null())),
            )
            .set(coupons::used_count.eq(coupons::used_count + 1))
            .execute(&mut conn)?;

        Ok(updated == 1)
    }
}
