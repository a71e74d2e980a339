use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use storefront_core::{
    domain::{
        repositories::coupons::CouponRepository,
        value_objects::coupons::{CouponDto, CreateCouponRequest},
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
        .route("/", get(list_coupons::<C>).post(create_coupon::<C>))
        .with_state(coupon_usecase)
}

pub async fn list_coupons<C>(
    State(coupon_usecase): State<Arc<CouponUseCase<C>>>,
    auth: AuthUser,
) -> impl IntoResponse
where
    C: CouponRepository + Send + Sync + 'static,
{
    if let Err(err) = require_admin(&auth) {
        return err.into_response();
    }

    match coupon_usecase.list_coupons().await {
        Ok(coupons) => {
            let body: Vec<CouponDto> = coupons.into_iter().map(CouponDto::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn create_coupon<C>(
    State(coupon_usecase): State<Arc<CouponUseCase<C>>>,
    auth: AuthUser,
    payload: Result<Json<CreateCouponRequest>, JsonRejection>,
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
    info!(user_id = %auth.user_id, "admin: create coupon request received");

    match coupon_usecase.create_coupon(request).await {
        Ok(coupon) => (StatusCode::CREATED, Json(CouponDto::from(coupon))).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}
