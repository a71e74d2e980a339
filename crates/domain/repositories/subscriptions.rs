use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::subscriptions::{
    InsertSubscriptionEntity, SubscriptionEntity, UpdateSubscriptionEntity,
};

#[automock]
#[async_trait]
pub trait SubscriptionRepository {
    async fn create(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
    ) -> Result<SubscriptionEntity>;

    /// Returns `None` both when the subscription does not exist and when it
    /// belongs to someone else.
    async fn find_owned(
        &self,
        subscription_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<SubscriptionEntity>>;

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<SubscriptionEntity>>;

    /// Applies `changes` only if the row still belongs to `user_id`.
    async fn update_owned(
        &self,
        subscription_id: Uuid,
        user_id: Uuid,
        changes: UpdateSubscriptionEntity,
    ) -> Result<Option<SubscriptionEntity>>;

    /// Like `update_owned`, but leaves cancelled rows untouched and returns
    /// `None` for them.
    async fn update_open_owned(
        &self,
        subscription_id: Uuid,
        user_id: Uuid,
        changes: UpdateSubscriptionEntity,
    ) -> Result<Option<SubscriptionEntity>>;
}
