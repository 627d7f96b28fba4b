use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::enums::payment_statuses::PaymentStatus,
    infrastructure::postgres::schema::payments,
};

/// One subscription attempt (or one-time order) and its lifecycle.
#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payments)]
pub struct PaymentEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub payment_type: String,
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub signature: Option<String>,
    pub subscription_id: Option<String>,
    pub plan_id: Option<String>,
    pub short_url: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub current_start: Option<DateTime<Utc>>,
    pub current_end: Option<DateTime<Utc>>,
    pub next_charge_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentEntity {
    /// Unknown stored values read as `failed` so they never grant access.
    pub fn payment_status(&self) -> PaymentStatus {
        PaymentStatus::from_str(&self.status).unwrap_or(PaymentStatus::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = payments)]
pub struct InsertPaymentEntity {
    pub user_id: Uuid,
    pub payment_type: String,
    pub subscription_id: Option<String>,
    pub plan_id: Option<String>,
    pub short_url: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
}

/// Partial update applied by a single `UPDATE … RETURNING`. `None` fields are left as stored;
/// `updated_at` is always set so the changeset is never empty.
#[derive(Debug, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = payments)]
pub struct UpdatePaymentEntity {
    pub status: Option<String>,
    pub payment_id: Option<String>,
    pub current_start: Option<DateTime<Utc>>,
    pub current_end: Option<DateTime<Utc>>,
    pub next_charge_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl UpdatePaymentEntity {
    pub fn new(updated_at: DateTime<Utc>) -> Self {
        Self {
            status: None,
            payment_id: None,
            current_start: None,
            current_end: None,
            next_charge_at: None,
            updated_at,
        }
    }

    pub fn status(mut self, status: PaymentStatus) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn payment_id(mut self, payment_id: Option<String>) -> Self {
        self.payment_id = payment_id;
        self
    }

    pub fn billing_cycle(
        mut self,
        current_start: Option<DateTime<Utc>>,
        current_end: Option<DateTime<Utc>>,
    ) -> Self {
        self.current_start = current_start;
        self.current_end = current_end;
        self
    }

    pub fn next_charge_at(mut self, next_charge_at: Option<DateTime<Utc>>) -> Self {
        self.next_charge_at = next_charge_at;
        self
    }
}
