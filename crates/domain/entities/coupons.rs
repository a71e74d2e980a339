use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::coupons;

/// Raw coupon row. Discount mode stays as two nullable columns and is
/// checked when converting into `CouponModel`.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = coupons)]
pub struct CouponEntity {
    pub id: Uuid,
    pub code: String,
    pub description: Option<String>,
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub min_purchase_minor: Option<i64>,
    pub discount_percent: Option<i32>,
    pub discount_amount_minor: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, PartialEq)]
#[diesel(table_name = coupons)]
pub struct InsertCouponEntity {
    pub code: String,
    pub description: Option<String>,
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub min_purchase_minor: Option<i64>,
    pub discount_percent: Option<i32>,
    pub discount_amount_minor: Option<i64>,
}
