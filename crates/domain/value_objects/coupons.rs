use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    entities::coupons::CouponEntity,
    value_objects::{
        enums::discount_types::DiscountType,
        money::{format_minor, from_minor, percent_of},
    },
};

/// Coupon codes are matched case-insensitively by storing and querying
/// them upper-cased. Blank input has no canonical form.
pub fn canonical_code(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_uppercase())
}

/// Exactly one discount mode per coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountRule {
    Percentage(i32),
    Fixed(i64),
}

impl DiscountRule {
    pub fn from_columns(percent: Option<i32>, amount_minor: Option<i64>) -> Option<Self> {
        match (percent, amount_minor) {
            (Some(percent), None) => Some(DiscountRule::Percentage(percent)),
            (None, Some(amount_minor)) => Some(DiscountRule::Fixed(amount_minor)),
            _ => None,
        }
    }

    pub fn discount_type(&self) -> DiscountType {
        match self {
            DiscountRule::Percentage(_) => DiscountType::Percentage,
            DiscountRule::Fixed(_) => DiscountType::Fixed,
        }
    }

    pub fn percent(&self) -> Option<i32> {
        match self {
            DiscountRule::Percentage(percent) => Some(*percent),
            DiscountRule::Fixed(_) => None,
        }
    }

    pub fn amount_minor(&self) -> Option<i64> {
        match self {
            DiscountRule::Percentage(_) => None,
            DiscountRule::Fixed(amount_minor) => Some(*amount_minor),
        }
    }

    /// Discount on `subtotal_minor`, never more than the subtotal itself.
    pub fn discount_for(&self, subtotal_minor: i64) -> i64 {
        let raw = match self {
            DiscountRule::Percentage(percent) => percent_of(subtotal_minor, *percent),
            DiscountRule::Fixed(amount_minor) => *amount_minor,
        };
        raw.min(subtotal_minor).max(0)
    }

    pub fn describe(&self) -> String {
        match self {
            DiscountRule::Percentage(percent) => format!("{}% off your order", percent),
            DiscountRule::Fixed(amount_minor) => {
                format!("{} off your order", format_minor(*amount_minor))
            }
        }
    }
}

/// Business-rule reasons a known coupon cannot be applied, in check order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponRejection {
    #[error("This coupon is not active")]
    Inactive,
    #[error("This coupon has expired")]
    Expired,
    #[error("This coupon has reached its usage limit")]
    UsageLimitReached,
    #[error("Minimum purchase of {} required for this coupon", format_minor(*.minimum_minor))]
    MinimumPurchaseNotMet { minimum_minor: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CouponModel {
    pub id: Uuid,
    pub code: String,
    pub description: Option<String>,
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub min_purchase_minor: Option<i64>,
    pub discount: DiscountRule,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CouponEntity> for CouponModel {
    type Error = anyhow::Error;

    fn try_from(value: CouponEntity) -> Result<Self> {
        let Some(discount) =
            DiscountRule::from_columns(value.discount_percent, value.discount_amount_minor)
        else {
            bail!(
                "coupon {} must have exactly one of discount_percent or discount_amount_minor",
                value.id
            );
        };

        Ok(Self {
            id: value.id,
            code: value.code,
            description: value.description,
            active: value.active,
            expires_at: value.expires_at,
            max_uses: value.max_uses,
            used_count: value.used_count,
            min_purchase_minor: value.min_purchase_minor,
            discount,
            created_at: value.created_at,
        })
    }
}

impl CouponModel {
    /// Runs the business-rule checks in their fixed order; the first failure wins.
    pub fn check_redeemable(
        &self,
        cart_subtotal_minor: i64,
        now: DateTime<Utc>,
    ) -> std::result::Result<(), CouponRejection> {
        if !self.active {
            return Err(CouponRejection::Inactive);
        }

        if let Some(expires_at) = self.expires_at {
            if expires_at < now {
                return Err(CouponRejection::Expired);
            }
        }

        if let Some(max_uses) = self.max_uses {
            if self.used_count >= max_uses {
                return Err(CouponRejection::UsageLimitReached);
            }
        }

        if let Some(minimum_minor) = self.min_purchase_minor {
            if cart_subtotal_minor < minimum_minor {
                return Err(CouponRejection::MinimumPurchaseNotMet { minimum_minor });
            }
        }

        Ok(())
    }

    pub fn price(&self, cart_subtotal_minor: i64) -> CouponPricing {
        CouponPricing {
            code: self.code.clone(),
            discount_minor: self.discount.discount_for(cart_subtotal_minor),
            discount_percent: self.discount.percent(),
            discount_type: self.discount.discount_type(),
            description: self.description(),
        }
    }

    pub fn description(&self) -> String {
        self.description
            .clone()
            .filter(|description| !description.trim().is_empty())
            .unwrap_or_else(|| self.discount.describe())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponPricing {
    pub code: String,
    pub discount_minor: i64,
    pub discount_percent: Option<i32>,
    pub discount_type: DiscountType,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponRequest {
    pub code: Option<String>,
    #[serde(default)]
    pub cart_total: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CouponValidationDto {
    pub valid: bool,
    pub code: String,
    pub discount_amount: f64,
    pub discount_percent: Option<i32>,
    pub discount_type: DiscountType,
    pub description: String,
}

impl From<CouponPricing> for CouponValidationDto {
    fn from(value: CouponPricing) -> Self {
        Self {
            valid: true,
            code: value.code,
            discount_amount: from_minor(value.discount_minor),
            discount_percent: value.discount_percent,
            discount_type: value.discount_type,
            description: value.description,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponRequest {
    pub code: String,
    pub description: Option<String>,
    pub discount_percent: Option<i32>,
    pub discount_amount: Option<f64>,
    pub min_purchase: Option<f64>,
    pub max_uses: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CouponDto {
    pub id: Uuid,
    pub code: String,
    pub description: String,
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub min_purchase: Option<f64>,
    pub discount_type: DiscountType,
    pub discount_percent: Option<i32>,
    pub discount_amount: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl From<CouponModel> for CouponDto {
    fn from(value: CouponModel) -> Self {
        let description = value.description();
        Self {
            id: value.id,
            code: value.code,
            description,
            active: value.active,
            expires_at: value.expires_at,
            max_uses: value.max_uses,
            used_count: value.used_count,
            min_purchase: value.min_purchase_minor.map(from_minor),
            discount_type: value.discount.discount_type(),
            discount_percent: value.discount.percent(),
            discount_amount: value.discount.amount_minor().map(from_minor),
            created_at: value.created_at,
        }
    }
}
