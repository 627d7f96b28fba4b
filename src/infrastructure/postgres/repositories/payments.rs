use anyhow::Result;
use axum::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, dsl::exists, insert_into, prelude::*, select, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::payments::{InsertPaymentEntity, PaymentEntity, UpdatePaymentEntity},
        repositories::payments::PaymentRepository,
        value_objects::enums::{payment_statuses::PaymentStatus, payment_types::PaymentType},
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::payments},
};

pub struct PaymentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }

    /// `UPDATE payments SET status = $to WHERE id = $id AND status = $from RETURNING *`
    fn transition(
        &self,
        id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(payments::table)
            .filter(payments::id.eq(id))
            .filter(payments::status.eq(from.to_string()))
            .set((
                payments::status.eq(to.to_string()),
                payments::updated_at.eq(updated_at),
            ))
            .returning(PaymentEntity::as_returning())
            .get_result::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}

#[async_trait]
impl PaymentRepository for PaymentPostgres {
    async fn find_latest_by_user(&self, user_id: Uuid) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = payments::table
            .filter(payments::user_id.eq(user_id))
            .filter(payments::payment_type.eq(PaymentType::Subscription.to_string()))
            .order(payments::created_at.desc())
            .select(PaymentEntity::as_select())
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_latest_by_user_and_status(
        &self,
        user_id: Uuid,
        payment_type: PaymentType,
        status: PaymentStatus,
    ) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = payments::table
            .filter(payments::user_id.eq(user_id))
            .filter(payments::payment_type.eq(payment_type.to_string()))
            .filter(payments::status.eq(status.to_string()))
            .order(payments::created_at.desc())
            .select(PaymentEntity::as_select())
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = payments::table
            .filter(payments::user_id.eq(user_id))
            .filter(payments::payment_type.eq(PaymentType::Subscription.to_string()))
            .order(payments::created_at.desc())
            .select(PaymentEntity::as_select())
            .load::<PaymentEntity>(&mut conn)?;

        Ok(results)
    }

    async fn insert(&self, insert_payment_entity: InsertPaymentEntity) -> Result<PaymentEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(payments::table)
            .values(&insert_payment_entity)
            .returning(PaymentEntity::as_returning())
            .get_result::<PaymentEntity>(&mut conn)?;

        Ok(result)
    }

    async fn update_by_subscription_id(
        &self,
        subscription_id: &str,
        update_payment_entity: UpdatePaymentEntity,
    ) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(payments::table)
            .filter(payments::subscription_id.eq(subscription_id))
            .set(&update_payment_entity)
            .returning(PaymentEntity::as_returning())
            .get_result::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn mark_failed_if_created(
        &self,
        id: Uuid,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<PaymentEntity>> {
        self.transition(id, PaymentStatus::Created, PaymentStatus::Failed, updated_at)
    }

    async fn expire_if_active(
        &self,
        id: Uuid,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<PaymentEntity>> {
        self.transition(id, PaymentStatus::Active, PaymentStatus::Cancelled, updated_at)
    }

    async fn has_active_subscription(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = select(exists(
            payments::table
                .filter(payments::user_id.eq(user_id))
                .filter(payments::payment_type.eq(PaymentType::Subscription.to_string()))
                .filter(payments::status.eq(PaymentStatus::Active.to_string()))
                .filter(payments::current_end.gt(now)),
        ))
        .get_result::<bool>(&mut conn)?;

        Ok(result)
    }
}
