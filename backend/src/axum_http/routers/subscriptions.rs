use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use storefront_core::{
    domain::{
        repositories::subscriptions::SubscriptionRepository,
        value_objects::subscriptions::{CreateSubscriptionRequest, UpdateSubscriptionRequest},
    },
    infra::db::{
        postgres::postgres_connection::PgPool, repositories::subscriptions::SubscriptionPostgres,
    },
};
use uuid::Uuid;

use crate::{
    auth::AuthUser, axum_http::error_responses::AppError,
    usecases::subscriptions::SubscriptionUseCase,
};

pub fn routes(db_pool: Arc<PgPool>) -> Router {
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let subscription_usecase = SubscriptionUseCase::new(Arc::new(subscription_repository));

    router(Arc::new(subscription_usecase))
}

pub fn router<S>(subscription_usecase: Arc<SubscriptionUseCase<S>>) -> Router
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/",
            get(list_subscriptions::<S>).post(create_subscription::<S>),
        )
        .route(
            "/:subscription_id",
            get(get_subscription::<S>)
                .patch(update_subscription::<S>)
                .delete(cancel_subscription::<S>),
        )
        .with_state(subscription_usecase)
}

pub async fn list_subscriptions<S>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    match subscription_usecase.list(user_id).await {
        Ok(subscriptions) => (StatusCode::OK, Json(subscriptions)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn create_subscription<S>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S>>>,
    AuthUser { user_id, .. }: AuthUser,
    payload: Result<Json<CreateSubscriptionRequest>, JsonRejection>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return AppError::from(rejection).into_response(),
    };

    match subscription_usecase.create(user_id, request).await {
        Ok(subscription) => (StatusCode::CREATED, Json(subscription)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn get_subscription<S>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S>>>,
    AuthUser { user_id, .. }: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let Path(subscription_id) = match path {
        Ok(path) => path,
        Err(rejection) => return AppError::from(rejection).into_response(),
    };

    match subscription_usecase.get(subscription_id, user_id).await {
        Ok(subscription) => (StatusCode::OK, Json(subscription)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn update_subscription<S>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S>>>,
    AuthUser { user_id, .. }: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateSubscriptionRequest>, JsonRejection>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let Path(subscription_id) = match path {
        Ok(path) => path,
        Err(rejection) => return AppError::from(rejection).into_response(),
    };
    let Json(patch) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return AppError::from(rejection).into_response(),
    };

    match subscription_usecase
        .update(subscription_id, user_id, patch)
        .await
    {
        Ok(subscription) => (StatusCode::OK, Json(subscription)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn cancel_subscription<S>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S>>>,
    AuthUser { user_id, .. }: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let Path(subscription_id) = match path {
        Ok(path) => path,
        Err(rejection) => return AppError::from(rejection).into_response(),
    };

    match subscription_usecase.cancel(subscription_id, user_id).await {
        Ok(subscription) => (StatusCode::OK, Json(subscription)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}
