use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::subscriptions::SubscriptionEntity,
    value_objects::enums::{
        delivery_frequencies::DeliveryFrequency, subscription_statuses::SubscriptionStatus,
    },
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub frequency: DeliveryFrequency,
    pub discount: i32,
    pub status: SubscriptionStatus,
    pub next_delivery_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionEntity> for SubscriptionModel {
    type Error = anyhow::Error;

    fn try_from(value: SubscriptionEntity) -> Result<Self> {
        let frequency = DeliveryFrequency::from_str(&value.frequency).ok_or_else(|| {
            anyhow!(
                "subscription {} has unknown frequency {:?}",
                value.id,
                value.frequency
            )
        })?;
        let status = SubscriptionStatus::from_str(&value.status).ok_or_else(|| {
            anyhow!(
                "subscription {} has unknown status {:?}",
                value.id,
                value.status
            )
        })?;

        Ok(Self {
            id: value.id,
            user_id: value.user_id,
            product_id: value.product_id,
            quantity: value.quantity,
            frequency,
            // The stored discount is derived; re-derive so readers never see drift.
            discount: frequency.discount_percent(),
            status,
            next_delivery_date: value.next_delivery_date,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    pub frequency: String,
}

/// Partial update; absent fields are left untouched. Enum-like fields stay
/// raw strings so bad values surface as validation errors, not decode errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubscriptionRequest {
    pub quantity: Option<i32>,
    pub frequency: Option<String>,
    pub status: Option<String>,
    pub next_delivery_date: Option<DateTime<Utc>>,
}

impl UpdateSubscriptionRequest {
    pub fn is_cancel_only(&self) -> bool {
        self.quantity.is_none()
            && self.frequency.is_none()
            && self.next_delivery_date.is_none()
            && self.status.as_deref() == Some(SubscriptionStatus::Cancelled.as_str())
    }
}
