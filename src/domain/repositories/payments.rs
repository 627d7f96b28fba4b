use anyhow::Result;
use axum::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::payments::{InsertPaymentEntity, PaymentEntity, UpdatePaymentEntity},
    value_objects::enums::{payment_statuses::PaymentStatus, payment_types::PaymentType},
};

#[automock]
#[async_trait]
pub trait PaymentRepository {
    /// Newest subscription record, whatever its status.
    async fn find_latest_by_user(&self, user_id: Uuid) -> Result<Option<PaymentEntity>>;

    async fn find_latest_by_user_and_status(
        &self,
        user_id: Uuid,
        payment_type: PaymentType,
        status: PaymentStatus,
    ) -> Result<Option<PaymentEntity>>;

    /// Every subscription record of the user, newest first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<PaymentEntity>>;

    async fn insert(&self, insert_payment_entity: InsertPaymentEntity) -> Result<PaymentEntity>;

    /// Single atomic update keyed by the gateway subscription id. `None` when nothing matched.
    async fn update_by_subscription_id(
        &self,
        subscription_id: &str,
        update_payment_entity: UpdatePaymentEntity,
    ) -> Result<Option<PaymentEntity>>;

    /// `created -> failed`, only if the row is still `created`.
    async fn mark_failed_if_created(
        &self,
        id: Uuid,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<PaymentEntity>>;

    /// `active -> cancelled`, only if the row is still `active`.
    async fn expire_if_active(
        &self,
        id: Uuid,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<PaymentEntity>>;

    /// True when an active subscription with `current_end > now` exists.
    async fn has_active_subscription(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<bool>;
}
