use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::enums::{
        delivery_frequencies::DeliveryFrequency, subscription_statuses::SubscriptionStatus,
    },
    infra::db::postgres::schema::subscriptions,
};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = subscriptions)]
pub struct SubscriptionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub frequency: String,
    pub discount: i32,
    pub status: String,
    pub next_delivery_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, PartialEq)]
#[diesel(table_name = subscriptions)]
pub struct InsertSubscriptionEntity {
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub frequency: String,
    pub discount: i32,
    pub status: String,
    pub next_delivery_date: DateTime<Utc>,
}

impl InsertSubscriptionEntity {
    /// New subscriptions start active with the discount implied by `frequency`.
    pub fn new(
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        frequency: DeliveryFrequency,
        next_delivery_date: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            product_id,
            quantity,
            frequency: frequency.to_string(),
            discount: frequency.discount_percent(),
            status: SubscriptionStatus::Active.to_string(),
            next_delivery_date,
        }
    }
}

/// Partial update. Fields are private so `frequency` and `discount` can only
/// be written together; `updated_at` keeps the changeset from ever being empty.
#[derive(Debug, Clone, AsChangeset, PartialEq)]
#[diesel(table_name = subscriptions)]
pub struct UpdateSubscriptionEntity {
    quantity: Option<i32>,
    frequency: Option<String>,
    discount: Option<i32>,
    status: Option<String>,
    next_delivery_date: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl UpdateSubscriptionEntity {
    pub fn new(updated_at: DateTime<Utc>) -> Self {
        Self {
            quantity: None,
            frequency: None,
            discount: None,
            status: None,
            next_delivery_date: None,
            updated_at,
        }
    }

    pub fn with_quantity(mut self, quantity: i32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_frequency(mut self, frequency: DeliveryFrequency) -> Self {
        self.frequency = Some(frequency.to_string());
        self.discount = Some(frequency.discount_percent());
        self
    }

    pub fn with_status(mut self, status: SubscriptionStatus) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn with_next_delivery_date(mut self, next_delivery_date: DateTime<Utc>) -> Self {
        self.next_delivery_date = Some(next_delivery_date);
        self
    }

    pub fn quantity(&self) -> Option<i32> {
        self.quantity
    }

    pub fn frequency(&self) -> Option<&str> {
        self.frequency.as_deref()
    }

    pub fn discount(&self) -> Option<i32> {
        self.discount
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn next_delivery_date(&self) -> Option<DateTime<Utc>> {
        self.next_delivery_date
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
