use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::subscriptions::{
            InsertSubscriptionEntity, SubscriptionEntity, UpdateSubscriptionEntity,
        },
        repositories::subscriptions::SubscriptionRepository,
        value_objects::enums::subscription_statuses::SubscriptionStatus,
    },
    infra::db::postgres::{postgres_connection::PgPool, schema::subscriptions},
};

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPool>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPool>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn create(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
    ) -> Result<SubscriptionEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(subscriptions::table)
            .values(&insert_subscription_entity)
            .returning(SubscriptionEntity::as_returning())
            .get_result::<SubscriptionEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_owned(
        &self,
        subscription_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = subscriptions::table
            .filter(subscriptions::id.eq(subscription_id))
            .filter(subscriptions::user_id.eq(user_id))
            .select(SubscriptionEntity::as_select())
            .first::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .order(subscriptions::created_at.desc())
            .select(SubscriptionEntity::as_select())
            .load::<SubscriptionEntity>(&mut conn)?;

        Ok(results)
    }

    async fn update_owned(
        &self,
        subscription_id: Uuid,
        user_id: Uuid,
        changes: UpdateSubscriptionEntity,
    ) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(subscriptions::table)
            .filter(subscriptions::id.eq(subscription_id))
            .filter(subscriptions::user_id.eq(user_id))
            .set(&changes)
            .returning(SubscriptionEntity::as_returning())
            .get_result::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn update_open_owned(
        &self,
        subscription_id: Uuid,
        user_id: Uuid,
        changes: UpdateSubscriptionEntity,
    ) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Status is re-checked in the same statement so a concurrent cancel
        // cannot be overwritten.
        let result = update(subscriptions::table)
            .filter(subscriptions::id.eq(subscription_id))
            .filter(subscriptions::user_id.eq(user_id))
            .filter(subscriptions::status.ne(SubscriptionStatus::Cancelled.as_str()))
            .set(&changes)
            .returning(SubscriptionEntity::as_returning())
            .get_result::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}
