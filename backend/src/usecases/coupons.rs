use std::sync::Arc;

use chrono::Utc;
use storefront_core::domain::{
    entities::coupons::{CouponEntity, InsertCouponEntity},
    repositories::coupons::CouponRepository,
    value_objects::{
        coupons::{
            CouponModel, CouponPricing, CouponRejection, CreateCouponRequest, DiscountRule,
            canonical_code,
        },
        money::to_minor,
    },
};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum CouponError {
    #[error("Coupon code is required")]
    CodeRequired,
    #[error("Cart total must be a non-negative amount")]
    InvalidCartTotal,
    #[error("Invalid coupon code")]
    InvalidCode,
    #[error(transparent)]
    Rejected(#[from] CouponRejection),
    #[error("This coupon has reached its usage limit")]
    RedemptionConflict,
    #[error("{0}")]
    InvalidCoupon(String),
    #[error("Coupon code already exists")]
    CodeTaken,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CouponError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            CouponError::CodeRequired
            | CouponError::InvalidCartTotal
            | CouponError::Rejected(_)
            | CouponError::InvalidCoupon(_) => StatusCode::BAD_REQUEST,
            CouponError::InvalidCode => StatusCode::NOT_FOUND,
            CouponError::RedemptionConflict | CouponError::CodeTaken => StatusCode::CONFLICT,
            CouponError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, CouponError>;

pub struct CouponUseCase<C>
where
    C: CouponRepository + Send + Sync + 'static,
{
    coupon_repo: Arc<C>,
}

impl<C> CouponUseCase<C>
where
    C: CouponRepository + Send + Sync + 'static,
{
    pub fn new(coupon_repo: Arc<C>) -> Self {
        Self { coupon_repo }
    }

    /// Prices `code` against a cart. Read-only: usage is only counted by
    /// `redeem` once the order completes.
    pub async fn validate_and_price(
        &self,
        code: Option<&str>,
        cart_total: f64,
    ) -> UseCaseResult<CouponPricing> {
        let (coupon, cart_subtotal_minor) = self.load_applicable(code, cart_total).await?;
        let pricing = coupon.price(cart_subtotal_minor);

        info!(
            code = %pricing.code,
            cart_subtotal_minor,
            discount_minor = pricing.discount_minor,
            discount_type = %pricing.discount_type,
            "coupons: coupon priced"
        );
        Ok(pricing)
    }

    /// Order-completion hook: re-validates, then records one use through a
    /// conditional increment so a capped coupon cannot be oversold.
    pub async fn redeem(&self, code: Option<&str>, cart_total: f64) -> UseCaseResult<CouponPricing> {
        let (coupon, cart_subtotal_minor) = self.load_applicable(code, cart_total).await?;

        let recorded = self
            .coupon_repo
            .increment_usage_if_available(coupon.id, Utc::now())
            .await
            .map_err(|err| {
                error!(
                    coupon_id = %coupon.id,
                    db_error = ?err,
                    "coupons: failed to record coupon usage"
                );
                CouponError::Internal(err)
            })?;

        if !recorded {
            let err = CouponError::RedemptionConflict;
            warn!(
                coupon_id = %coupon.id,
                code = %coupon.code,
                status = err.status_code().as_u16(),
                "coupons: coupon exhausted before usage was recorded"
            );
            return Err(err);
        }

        let pricing = coupon.price(cart_subtotal_minor);
        info!(
            coupon_id = %coupon.id,
            code = %pricing.code,
            discount_minor = pricing.discount_minor,
            "coupons: coupon redeemed"
        );
        Ok(pricing)
    }

    pub async fn create_coupon(&self, request: CreateCouponRequest) -> UseCaseResult<CouponModel> {
        info!(code = %request.code, "coupons: create coupon requested");

        let insert_coupon_entity = build_insert(request).map_err(|err| {
            warn!(
                error = %err,
                status = err.status_code().as_u16(),
                "coupons: invalid coupon definition"
            );
            err
        })?;

        let existing = self
            .coupon_repo
            .find_by_code(insert_coupon_entity.code.clone())
            .await
            .map_err(|err| {
                error!(
                    code = %insert_coupon_entity.code,
                    db_error = ?err,
                    "coupons: failed to check for existing coupon"
                );
                CouponError::Internal(err)
            })?;

        if existing.is_some() {
            let err = CouponError::CodeTaken;
            warn!(
                code = %insert_coupon_entity.code,
                status = err.status_code().as_u16(),
                "coupons: duplicate coupon code"
            );
            return Err(err);
        }

        let code = insert_coupon_entity.code.clone();
        let entity = self
            .coupon_repo
            .create(insert_coupon_entity)
            .await
            .map_err(|err| {
                error!(
                    %code,
                    db_error = ?err,
                    "coupons: failed to insert coupon"
                );
                CouponError::Internal(err)
            })?;

        let coupon = to_model(entity)?;
        info!(coupon_id = %coupon.id, code = %coupon.code, "coupons: coupon created");
        Ok(coupon)
    }

    pub async fn list_coupons(&self) -> UseCaseResult<Vec<CouponModel>> {
        let entities = self.coupon_repo.list().await.map_err(|err| {
            error!(db_error = ?err, "coupons: failed to list coupons");
            CouponError::Internal(err)
        })?;

        let coupon_count = entities.len();
        info!(coupon_count, "coupons: coupons loaded");
        entities.into_iter().map(to_model).collect()
    }

    /// Ordered checks: code present, cart total sane, code known, then the
    /// coupon's own business rules.
    async fn load_applicable(
        &self,
        code: Option<&str>,
        cart_total: f64,
    ) -> UseCaseResult<(CouponModel, i64)> {
        let Some(code) = code.and_then(canonical_code) else {
            let err = CouponError::CodeRequired;
            warn!(status = err.status_code().as_u16(), "coupons: missing coupon code");
            return Err(err);
        };

        let Some(cart_subtotal_minor) = to_minor(cart_total) else {
            let err = CouponError::InvalidCartTotal;
            warn!(
                %code,
                cart_total,
                status = err.status_code().as_u16(),
                "coupons: invalid cart total"
            );
            return Err(err);
        };

        let entity = self
            .coupon_repo
            .find_by_code(code.clone())
            .await
            .map_err(|err| {
                error!(%code, db_error = ?err, "coupons: failed to load coupon");
                CouponError::Internal(err)
            })?;

        let Some(entity) = entity else {
            let err = CouponError::InvalidCode;
            warn!(
                %code,
                status = err.status_code().as_u16(),
                "coupons: unknown coupon code"
            );
            return Err(err);
        };

        let coupon = to_model(entity)?;

        if let Err(rejection) = coupon.check_redeemable(cart_subtotal_minor, Utc::now()) {
            let err = CouponError::Rejected(rejection);
            warn!(
                %code,
                cart_subtotal_minor,
                reason = %err,
                status = err.status_code().as_u16(),
                "coupons: coupon rejected"
            );
            return Err(err);
        }

        Ok((coupon, cart_subtotal_minor))
    }
}

fn build_insert(request: CreateCouponRequest) -> UseCaseResult<InsertCouponEntity> {
    let code = canonical_code(&request.code).ok_or(CouponError::CodeRequired)?;

    let amount_minor = match request.discount_amount {
        Some(amount) => Some(to_minor(amount).ok_or_else(|| {
            CouponError::InvalidCoupon("discountAmount must be a non-negative amount".to_string())
        })?),
        None => None,
    };

    let discount = DiscountRule::from_columns(request.discount_percent, amount_minor)
        .ok_or_else(|| {
            CouponError::InvalidCoupon(
                "Coupon must have exactly one of discountPercent or discountAmount".to_string(),
            )
        })?;

    if let DiscountRule::Percentage(percent) = discount {
        if !(0..=100).contains(&percent) {
            return Err(CouponError::InvalidCoupon(
                "discountPercent must be between 0 and 100".to_string(),
            ));
        }
    }

    let min_purchase_minor = match request.min_purchase {
        Some(amount) => Some(to_minor(amount).ok_or_else(|| {
            CouponError::InvalidCoupon("minPurchase must be a non-negative amount".to_string())
        })?),
        None => None,
    };

    if let Some(max_uses) = request.max_uses {
        if max_uses < 1 {
            return Err(CouponError::InvalidCoupon(
                "maxUses must be at least 1".to_string(),
            ));
        }
    }

    Ok(InsertCouponEntity {
        code,
        description: request
            .description
            .map(|description| description.trim().to_string())
            .filter(|description| !description.is_empty()),
        active: request.active.unwrap_or(true),
        expires_at: request.expires_at,
        max_uses: request.max_uses,
        used_count: 0,
        min_purchase_minor,
        discount_percent: discount.percent(),
        discount_amount_minor: discount.amount_minor(),
    })
}

fn to_model(entity: CouponEntity) -> UseCaseResult<CouponModel> {
    let coupon_id = entity.id;
    CouponModel::try_from(entity).map_err(|err| {
        error!(%coupon_id, error = ?err, "coupons: stored coupon is invalid");
        CouponError::Internal(err)
    })
}
