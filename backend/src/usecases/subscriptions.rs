use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use storefront_core::domain::{
    entities::subscriptions::{
        InsertSubscriptionEntity, SubscriptionEntity, UpdateSubscriptionEntity,
    },
    repositories::subscriptions::SubscriptionRepository,
    value_objects::{
        enums::{
            delivery_frequencies::DeliveryFrequency, subscription_statuses::SubscriptionStatus,
        },
        subscriptions::{CreateSubscriptionRequest, SubscriptionModel, UpdateSubscriptionRequest},
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("Quantity must be at least 1")]
    InvalidQuantity,
    #[error("Invalid frequency")]
    InvalidFrequency,
    #[error("Invalid status")]
    InvalidStatus,
    #[error("Subscription not found")]
    NotFound,
    #[error("Cancelled subscriptions cannot be modified")]
    Cancelled,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SubscriptionError::InvalidQuantity
            | SubscriptionError::InvalidFrequency
            | SubscriptionError::InvalidStatus
            | SubscriptionError::Cancelled => StatusCode::BAD_REQUEST,
            SubscriptionError::NotFound => StatusCode::NOT_FOUND,
            SubscriptionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

pub struct SubscriptionUseCase<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
}

impl<S> SubscriptionUseCase<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(subscription_repo: Arc<S>) -> Self {
        Self { subscription_repo }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        request: CreateSubscriptionRequest,
    ) -> UseCaseResult<SubscriptionModel> {
        info!(
            %user_id,
            product_id = %request.product_id,
            quantity = request.quantity,
            frequency = %request.frequency,
            "subscriptions: create requested"
        );

        let quantity = validate_quantity(request.quantity)?;
        let frequency = parse_frequency(&request.frequency)?;
        let next_delivery_date = next_delivery(frequency, Utc::now())?;

        let insert_subscription_entity = InsertSubscriptionEntity::new(
            user_id,
            request.product_id,
            quantity,
            frequency,
            next_delivery_date,
        );

        let entity = self
            .subscription_repo
            .create(insert_subscription_entity)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    product_id = %request.product_id,
                    db_error = ?err,
                    "subscriptions: failed to insert subscription"
                );
                SubscriptionError::Internal(err)
            })?;

        let subscription = to_model(entity)?;
        info!(
            %user_id,
            subscription_id = %subscription.id,
            discount = subscription.discount,
            "subscriptions: subscription created"
        );
        Ok(subscription)
    }

    pub async fn list(&self, user_id: Uuid) -> UseCaseResult<Vec<SubscriptionModel>> {
        let entities = self
            .subscription_repo
            .list_by_user(user_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    db_error = ?err,
                    "subscriptions: failed to list subscriptions"
                );
                SubscriptionError::Internal(err)
            })?;

        let subscription_count = entities.len();
        info!(%user_id, subscription_count, "subscriptions: subscriptions loaded");
        entities.into_iter().map(to_model).collect()
    }

    pub async fn get(
        &self,
        subscription_id: Uuid,
        user_id: Uuid,
    ) -> UseCaseResult<SubscriptionModel> {
        self.find_owned(subscription_id, user_id).await
    }

    pub async fn update(
        &self,
        subscription_id: Uuid,
        user_id: Uuid,
        patch: UpdateSubscriptionRequest,
    ) -> UseCaseResult<SubscriptionModel> {
        info!(
            %user_id,
            %subscription_id,
            quantity = ?patch.quantity,
            frequency = ?patch.frequency,
            status = ?patch.status,
            next_delivery_date = ?patch.next_delivery_date,
            "subscriptions: update requested"
        );

        let current = self.find_owned(subscription_id, user_id).await?;

        if current.status.is_terminal() && patch.is_cancel_only() {
            info!(
                %user_id,
                %subscription_id,
                "subscriptions: already cancelled, nothing to write"
            );
            return Ok(current);
        }

        let changes = build_changes(&current, &patch, Utc::now()).map_err(|err| {
            warn!(
                %user_id,
                %subscription_id,
                error = %err,
                status = err.status_code().as_u16(),
                "subscriptions: update rejected"
            );
            err
        })?;

        if patch.is_cancel_only() {
            return self.apply(subscription_id, user_id, changes).await;
        }
        self.apply_open(subscription_id, user_id, changes).await
    }

    /// Soft delete. Cancelling twice is harmless.
    pub async fn cancel(
        &self,
        subscription_id: Uuid,
        user_id: Uuid,
    ) -> UseCaseResult<SubscriptionModel> {
        info!(%user_id, %subscription_id, "subscriptions: cancel requested");

        let changes =
            UpdateSubscriptionEntity::new(Utc::now()).with_status(SubscriptionStatus::Cancelled);
        self.apply(subscription_id, user_id, changes).await
    }

    async fn find_owned(
        &self,
        subscription_id: Uuid,
        user_id: Uuid,
    ) -> UseCaseResult<SubscriptionModel> {
        let entity = self
            .subscription_repo
            .find_owned(subscription_id, user_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %subscription_id,
                    db_error = ?err,
                    "subscriptions: failed to load subscription"
                );
                SubscriptionError::Internal(err)
            })?;

        match entity {
            Some(entity) => to_model(entity),
            None => {
                let err = SubscriptionError::NotFound;
                warn!(
                    %user_id,
                    %subscription_id,
                    status = err.status_code().as_u16(),
                    "subscriptions: subscription not found for user"
                );
                Err(err)
            }
        }
    }

    /// Writes a non-cancelling patch. The row was owned when it was read, so
    /// zero rows updated means it got cancelled in the meantime.
    async fn apply_open(
        &self,
        subscription_id: Uuid,
        user_id: Uuid,
        changes: UpdateSubscriptionEntity,
    ) -> UseCaseResult<SubscriptionModel> {
        let updated = self
            .subscription_repo
            .update_open_owned(subscription_id, user_id, changes)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %subscription_id,
                    db_error = ?err,
                    "subscriptions: failed to update subscription"
                );
                SubscriptionError::Internal(err)
            })?;

        let Some(entity) = updated else {
            let err = SubscriptionError::Cancelled;
            warn!(
                %user_id,
                %subscription_id,
                status = err.status_code().as_u16(),
                "subscriptions: cancelled before the update landed"
            );
            return Err(err);
        };

        let subscription = to_model(entity)?;
        info!(
            %user_id,
            %subscription_id,
            status = %subscription.status,
            frequency = %subscription.frequency,
            "subscriptions: subscription updated"
        );
        Ok(subscription)
    }

    async fn apply(
        &self,
        subscription_id: Uuid,
        user_id: Uuid,
        changes: UpdateSubscriptionEntity,
    ) -> UseCaseResult<SubscriptionModel> {
        let updated = self
            .subscription_repo
            .update_owned(subscription_id, user_id, changes)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %subscription_id,
                    db_error = ?err,
                    "subscriptions: failed to update subscription"
                );
                SubscriptionError::Internal(err)
            })?;

        match updated {
            Some(entity) => {
                let subscription = to_model(entity)?;
                info!(
                    %user_id,
                    %subscription_id,
                    status = %subscription.status,
                    frequency = %subscription.frequency,
                    "subscriptions: subscription updated"
                );
                Ok(subscription)
            }
            None => {
                let err = SubscriptionError::NotFound;
                warn!(
                    %user_id,
                    %subscription_id,
                    status = err.status_code().as_u16(),
                    "subscriptions: no owned subscription to update"
                );
                Err(err)
            }
        }
    }
}

/// Turns a patch into a changeset. Supplying `frequency` always re-derives the
/// discount and, unless the patch pins `next_delivery_date`, reschedules the
/// next delivery one interval from `now`.
fn build_changes(
    current: &SubscriptionModel,
    patch: &UpdateSubscriptionRequest,
    now: DateTime<Utc>,
) -> UseCaseResult<UpdateSubscriptionEntity> {
    let mut changes = UpdateSubscriptionEntity::new(now);

    if let Some(quantity) = patch.quantity {
        changes = changes.with_quantity(validate_quantity(quantity)?);
    }

    if let Some(raw) = patch.frequency.as_deref() {
        let frequency = parse_frequency(raw)?;
        changes = changes.with_frequency(frequency);
        if patch.next_delivery_date.is_none() {
            changes = changes.with_next_delivery_date(next_delivery(frequency, now)?);
        }
    }

    if let Some(raw) = patch.status.as_deref() {
        let status = SubscriptionStatus::from_str(raw).ok_or(SubscriptionError::InvalidStatus)?;
        changes = changes.with_status(status);
    }

    if let Some(next_delivery_date) = patch.next_delivery_date {
        changes = changes.with_next_delivery_date(next_delivery_date);
    }

    if current.status.is_terminal() && !patch.is_cancel_only() {
        return Err(SubscriptionError::Cancelled);
    }

    Ok(changes)
}

fn validate_quantity(quantity: i32) -> UseCaseResult<i32> {
    if quantity < 1 {
        return Err(SubscriptionError::InvalidQuantity);
    }
    Ok(quantity)
}

fn parse_frequency(raw: &str) -> UseCaseResult<DeliveryFrequency> {
    DeliveryFrequency::from_str(raw).ok_or(SubscriptionError::InvalidFrequency)
}

fn next_delivery(frequency: DeliveryFrequency, now: DateTime<Utc>) -> UseCaseResult<DateTime<Utc>> {
    frequency
        .next_delivery_from(now)
        .ok_or_else(|| SubscriptionError::Internal(anyhow!("failed to compute next delivery date")))
}

fn to_model(entity: SubscriptionEntity) -> UseCaseResult<SubscriptionModel> {
    let subscription_id = entity.id;
    SubscriptionModel::try_from(entity).map_err(|err| {
        error!(
            %subscription_id,
            error = ?err,
            "subscriptions: stored subscription is invalid"
        );
        SubscriptionError::Internal(err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Months};
    use mockall::predicate::eq;
    use storefront_core::domain::repositories::subscriptions::MockSubscriptionRepository;

    fn sample_entity(user_id: Uuid, frequency: DeliveryFrequency) -> SubscriptionEntity {
        let now = Utc::now();
        SubscriptionEntity {
            id: Uuid::new_v4(),
            user_id,
            product_id: Uuid::new_v4(),
            quantity: 1,
            frequency: frequency.to_string(),
            discount: frequency.discount_percent(),
            status: SubscriptionStatus::Active.to_string(),
            next_delivery_date: now + Duration::days(3),
            created_at: now - Duration::days(30),
            updated_at: now - Duration::days(30),
        }
    }

    /// Mirrors what the postgres `UPDATE ... RETURNING` would hand back.
    fn apply_changes(
        mut entity: SubscriptionEntity,
        changes: &UpdateSubscriptionEntity,
    ) -> SubscriptionEntity {
        if let Some(quantity) = changes.quantity() {
            entity.quantity = quantity;
        }
        if let Some(frequency) = changes.frequency() {
            entity.frequency = frequency.to_string();
        }
        if let Some(discount) = changes.discount() {
            entity.discount = discount;
        }
        if let Some(status) = changes.status() {
            entity.status = status.to_string();
        }
        if let Some(next_delivery_date) = changes.next_delivery_date() {
            entity.next_delivery_date = next_delivery_date;
        }
        entity.updated_at = changes.updated_at();
        entity
    }

    fn repo_with_existing(entity: SubscriptionEntity) -> MockSubscriptionRepository {
        let mut subscription_repo = MockSubscriptionRepository::new();

        let found = entity.clone();
        subscription_repo
            .expect_find_owned()
            .with(eq(entity.id), eq(entity.user_id))
            .returning(move |_, _| Ok(Some(found.clone())));

        let open = entity.clone();
        subscription_repo
            .expect_update_open_owned()
            .returning(move |_, _, changes| Ok(Some(apply_changes(open.clone(), &changes))));

        subscription_repo
            .expect_update_owned()
            .returning(move |_, _, changes| Ok(Some(apply_changes(entity.clone(), &changes))));

        subscription_repo
    }

    fn within(actual: DateTime<Utc>, lower: DateTime<Utc>, upper: DateTime<Utc>) -> bool {
        actual >= lower && actual <= upper
    }

    #[tokio::test]
    async fn create_monthly_subscription_is_active_with_ten_percent() {
        let user_id = Uuid::new_v4();
        let product_id = Uuid::new_v4();
        let mut subscription_repo = MockSubscriptionRepository::new();

        subscription_repo
            .expect_create()
            .withf(move |insert| {
                insert.user_id == user_id
                    && insert.product_id == product_id
                    && insert.quantity == 2
                    && insert.frequency == "monthly"
                    && insert.discount == 10
                    && insert.status == "active"
            })
            .times(1)
            .returning(|insert| {
                let now = Utc::now();
                Ok(SubscriptionEntity {
                    id: Uuid::new_v4(),
                    user_id: insert.user_id,
                    product_id: insert.product_id,
                    quantity: insert.quantity,
                    frequency: insert.frequency,
                    discount: insert.discount,
                    status: insert.status,
                    next_delivery_date: insert.next_delivery_date,
                    created_at: now,
                    updated_at: now,
                })
            });

        let usecase = SubscriptionUseCase::new(Arc::new(subscription_repo));

        let before = Utc::now();
        let subscription = usecase
            .create(
                user_id,
                CreateSubscriptionRequest {
                    product_id,
                    quantity: 2,
                    frequency: "monthly".to_string(),
                },
            )
            .await
            .unwrap();
        let after = Utc::now();

        assert_eq!(subscription.discount, 10);
        assert_eq!(subscription.status, SubscriptionStatus::Active);
        assert_eq!(subscription.quantity, 2);
        assert!(within(
            subscription.next_delivery_date,
            before.checked_add_months(Months::new(1)).unwrap(),
            after.checked_add_months(Months::new(1)).unwrap(),
        ));
    }

    #[tokio::test]
    async fn create_rejects_bad_input_without_touching_storage() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_create().never();
        let usecase = SubscriptionUseCase::new(Arc::new(subscription_repo));

        let err = usecase
            .create(
                Uuid::new_v4(),
                CreateSubscriptionRequest {
                    product_id: Uuid::new_v4(),
                    quantity: 0,
                    frequency: "weekly".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::InvalidQuantity));
        assert_eq!(err.to_string(), "Quantity must be at least 1");

        let err = usecase
            .create(
                Uuid::new_v4(),
                CreateSubscriptionRequest {
                    product_id: Uuid::new_v4(),
                    quantity: 1,
                    frequency: "daily".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::InvalidFrequency));
    }

    #[tokio::test]
    async fn frequency_change_rederives_discount_and_reschedules() {
        let user_id = Uuid::new_v4();
        let entity = sample_entity(user_id, DeliveryFrequency::Monthly);
        let subscription_id = entity.id;
        let usecase = SubscriptionUseCase::new(Arc::new(repo_with_existing(entity)));

        let before = Utc::now();
        let subscription = usecase
            .update(
                subscription_id,
                user_id,
                UpdateSubscriptionRequest {
                    frequency: Some("weekly".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let after = Utc::now();

        assert_eq!(subscription.frequency, DeliveryFrequency::Weekly);
        assert_eq!(subscription.discount, 15);
        assert!(within(
            subscription.next_delivery_date,
            before + Duration::days(7),
            after + Duration::days(7),
        ));
    }

    #[tokio::test]
    async fn explicit_next_delivery_date_wins_over_recomputation() {
        let user_id = Uuid::new_v4();
        let entity = sample_entity(user_id, DeliveryFrequency::Monthly);
        let subscription_id = entity.id;
        let usecase = SubscriptionUseCase::new(Arc::new(repo_with_existing(entity)));

        let pinned = Utc::now() + Duration::days(40);
        let subscription = usecase
            .update(
                subscription_id,
                user_id,
                UpdateSubscriptionRequest {
                    frequency: Some("bi-weekly".to_string()),
                    next_delivery_date: Some(pinned),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(subscription.discount, 12);
        assert_eq!(subscription.next_delivery_date, pinned);
    }

    #[tokio::test]
    async fn quantity_only_patch_keeps_schedule() {
        let user_id = Uuid::new_v4();
        let entity = sample_entity(user_id, DeliveryFrequency::BiWeekly);
        let subscription_id = entity.id;
        let scheduled = entity.next_delivery_date;
        let usecase = SubscriptionUseCase::new(Arc::new(repo_with_existing(entity)));

        let subscription = usecase
            .update(
                subscription_id,
                user_id,
                UpdateSubscriptionRequest {
                    quantity: Some(4),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(subscription.quantity, 4);
        assert_eq!(subscription.discount, 12);
        assert_eq!(subscription.next_delivery_date, scheduled);
    }

    #[tokio::test]
    async fn pause_and_resume() {
        let user_id = Uuid::new_v4();
        let entity = sample_entity(user_id, DeliveryFrequency::Weekly);
        let subscription_id = entity.id;
        let usecase = SubscriptionUseCase::new(Arc::new(repo_with_existing(entity)));

        let paused = usecase
            .update(
                subscription_id,
                user_id,
                UpdateSubscriptionRequest {
                    status: Some("paused".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(paused.status, SubscriptionStatus::Paused);

        let resumed = usecase
            .update(
                subscription_id,
                user_id,
                UpdateSubscriptionRequest {
                    status: Some("active".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(resumed.status, SubscriptionStatus::Active);
        assert_eq!(resumed.discount, 15);
    }

    #[tokio::test]
    async fn invalid_patch_values_are_rejected_before_writing() {
        let user_id = Uuid::new_v4();
        let entity = sample_entity(user_id, DeliveryFrequency::Weekly);
        let subscription_id = entity.id;

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_owned()
            .returning(move |_, _| Ok(Some(entity.clone())));
        subscription_repo.expect_update_owned().never();
        subscription_repo.expect_update_open_owned().never();
        let usecase = SubscriptionUseCase::new(Arc::new(subscription_repo));

        let cases = [
            (
                UpdateSubscriptionRequest {
                    quantity: Some(0),
                    ..Default::default()
                },
                "Quantity must be at least 1",
            ),
            (
                UpdateSubscriptionRequest {
                    frequency: Some("yearly".to_string()),
                    ..Default::default()
                },
                "Invalid frequency",
            ),
            (
                UpdateSubscriptionRequest {
                    status: Some("deleted".to_string()),
                    ..Default::default()
                },
                "Invalid status",
            ),
        ];

        for (patch, message) in cases {
            let err = usecase
                .update(subscription_id, user_id, patch)
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), message);
            assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn missing_and_foreign_subscriptions_look_the_same() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_owned()
            .returning(|_, _| Ok(None));
        subscription_repo.expect_update_owned().never();
        subscription_repo.expect_update_open_owned().never();
        let usecase = SubscriptionUseCase::new(Arc::new(subscription_repo));

        let err = usecase
            .update(
                Uuid::new_v4(),
                Uuid::new_v4(),
                UpdateSubscriptionRequest {
                    quantity: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::NotFound));
        assert_eq!(err.to_string(), "Subscription not found");
    }

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let user_id = Uuid::new_v4();
        let entity = sample_entity(user_id, DeliveryFrequency::Monthly);
        let subscription_id = entity.id;

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_update_owned()
            .withf(move |id, owner, changes| {
                *id == subscription_id
                    && *owner == user_id
                    && changes.status() == Some("cancelled")
                    && changes.quantity().is_none()
                    && changes.frequency().is_none()
            })
            .times(2)
            .returning(move |_, _, changes| Ok(Some(apply_changes(entity.clone(), &changes))));
        let usecase = SubscriptionUseCase::new(Arc::new(subscription_repo));

        for _ in 0..2 {
            let subscription = usecase.cancel(subscription_id, user_id).await.unwrap();
            assert_eq!(subscription.status, SubscriptionStatus::Cancelled);
        }
    }

    #[tokio::test]
    async fn cancel_of_foreign_subscription_is_not_found() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_update_owned()
            .returning(|_, _, _| Ok(None));
        let usecase = SubscriptionUseCase::new(Arc::new(subscription_repo));

        let err = usecase
            .cancel(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cancelled_subscription_cannot_be_reactivated() {
        let user_id = Uuid::new_v4();
        let mut entity = sample_entity(user_id, DeliveryFrequency::Weekly);
        entity.status = SubscriptionStatus::Cancelled.to_string();
        let subscription_id = entity.id;

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_owned()
            .returning(move |_, _| Ok(Some(entity.clone())));
        subscription_repo.expect_update_owned().never();
        subscription_repo.expect_update_open_owned().never();
        let usecase = SubscriptionUseCase::new(Arc::new(subscription_repo));

        for patch in [
            UpdateSubscriptionRequest {
                status: Some("active".to_string()),
                ..Default::default()
            },
            UpdateSubscriptionRequest {
                quantity: Some(3),
                ..Default::default()
            },
        ] {
            let err = usecase
                .update(subscription_id, user_id, patch)
                .await
                .unwrap_err();
            assert!(matches!(err, SubscriptionError::Cancelled));
        }
    }

    #[tokio::test]
    async fn cancel_landing_between_read_and_write_is_not_overwritten() {
        let user_id = Uuid::new_v4();
        let entity = sample_entity(user_id, DeliveryFrequency::Weekly);
        let subscription_id = entity.id;

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_owned()
            .returning(move |_, _| Ok(Some(entity.clone())));
        // The row is cancelled by now, so the status-guarded update matches nothing.
        subscription_repo
            .expect_update_open_owned()
            .with(eq(subscription_id), eq(user_id), mockall::predicate::always())
            .times(1)
            .returning(|_, _, _| Ok(None));
        subscription_repo.expect_update_owned().never();
        let usecase = SubscriptionUseCase::new(Arc::new(subscription_repo));

        let err = usecase
            .update(
                subscription_id,
                user_id,
                UpdateSubscriptionRequest {
                    status: Some("paused".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::Cancelled));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn cancel_only_patch_on_cancelled_subscription_writes_nothing() {
        let user_id = Uuid::new_v4();
        let mut entity = sample_entity(user_id, DeliveryFrequency::Monthly);
        entity.status = SubscriptionStatus::Cancelled.to_string();
        let subscription_id = entity.id;
        let stored_updated_at = entity.updated_at;

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_owned()
            .returning(move |_, _| Ok(Some(entity.clone())));
        subscription_repo.expect_update_owned().never();
        subscription_repo.expect_update_open_owned().never();
        let usecase = SubscriptionUseCase::new(Arc::new(subscription_repo));

        let subscription = usecase
            .update(
                subscription_id,
                user_id,
                UpdateSubscriptionRequest {
                    status: Some("cancelled".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(subscription.status, SubscriptionStatus::Cancelled);
        assert_eq!(subscription.updated_at, stored_updated_at);
    }

    #[tokio::test]
    async fn storage_failures_surface_as_internal() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_list_by_user()
            .returning(|_| Err(anyhow!("connection refused")));
        let usecase = SubscriptionUseCase::new(Arc::new(subscription_repo));

        let err = usecase.list(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, SubscriptionError::Internal(_)));
        assert_eq!(
            err.status_code(),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
