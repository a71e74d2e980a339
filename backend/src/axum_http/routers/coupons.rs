use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use storefront_core::{
    domain::{
        repositories::coupons::CouponRepository,
        value_objects::coupons::{CouponValidationDto, ValidateCouponRequest},
    },
    infra::db::{postgres::postgres_connection::PgPool, repositories::coupons::CouponPostgres},
};
use tracing::info;

use crate::{
    auth::AuthUser,
    axum_http::{error_responses::AppError, routers::require_admin},
    usecases::coupons::CouponUseCase,
};

pub fn routes(db_pool: Arc<PgPool>) -> Router {
    let coupon_repository = CouponPostgres::new(Arc::clone(&db_pool));
    let coupon_usecase = CouponUseCase::new(Arc::new(coupon_repository));

    router(Arc::new(coupon_usecase))
}

pub fn router<C>(coupon_usecase: Arc<CouponUseCase<C>>) -> Router
where
    C: CouponRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/validate", post(validate_coupon::<C>))
        .route("/redeem", post(redeem_coupon::<C>))
        .with_state(coupon_usecase)
}

pub async fn validate_coupon<C>(
    State(coupon_usecase): State<Arc<CouponUseCase<C>>>,
    payload: Result<Json<ValidateCouponRequest>, JsonRejection>,
) -> impl IntoResponse
where
    C: CouponRepository + Send + Sync + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return AppError::from(rejection).into_response(),
    };

    match coupon_usecase
        .validate_and_price(request.code.as_deref(), request.cart_total)
        .await
    {
        Ok(pricing) => (StatusCode::OK, Json(CouponValidationDto::from(pricing))).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

/// Called by the order pipeline once an order is paid.
pub async fn redeem_coupon<C>(
    State(coupon_usecase): State<Arc<CouponUseCase<C>>>,
    auth: AuthUser,
    payload: Result<Json<ValidateCouponRequest>, JsonRejection>,
) -> impl IntoResponse
where
    C: CouponRepository + Send + Sync + 'static,
{
    if let Err(err) = require_admin(&auth) {
        return err.into_response();
    }
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return AppError::from(rejection).into_response(),
    };
    info!(user_id = %auth.user_id, "coupons: redeem request received");

    match coupon_usecase
        .redeem(request.code.as_deref(), request.cart_total)
        .await
    {
        Ok(pricing) => (StatusCode::OK, Json(CouponValidationDto::from(pricing))).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}
