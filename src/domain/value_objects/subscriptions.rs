use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::payments::PaymentEntity,
    value_objects::enums::subscription_states::SubscriptionState,
};

/// A pending (`created`) record younger than this hands back its payment link instead of
/// minting a new remote subscription.
pub const PENDING_DEDUP_WINDOW_MS: i64 = 5 * 60 * 1000;

const MS_PER_HOUR: i64 = 60 * 60 * 1000;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemainingTime {
    pub days_remaining: i64,
    pub hours_remaining: i64,
}

impl RemainingTime {
    pub const ZERO: RemainingTime = RemainingTime {
        days_remaining: 0,
        hours_remaining: 0,
    };

    /// Ceiling of the time left until `current_end`, or `None` once `current_end <= now`.
    pub fn until(current_end: DateTime<Utc>, now: DateTime<Utc>) -> Option<Self> {
        let remaining_ms = (current_end - now).num_milliseconds();
        if remaining_ms <= 0 {
            return None;
        }

        Some(Self {
            days_remaining: ceil_div(remaining_ms, MS_PER_DAY),
            hours_remaining: ceil_div(remaining_ms, MS_PER_HOUR),
        })
    }
}

fn ceil_div(value: i64, unit: i64) -> i64 {
    (value + unit - 1) / unit
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    pub plan_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Minor units (paise).
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub period: Option<String>,
    pub interval: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatusDto {
    pub status: SubscriptionState,
    pub plan_id: Option<String>,
    pub current_start: Option<DateTime<Utc>>,
    pub current_end: Option<DateTime<Utc>>,
    pub days_remaining: Option<i64>,
    pub hours_remaining: Option<i64>,
    pub subscription_id: Option<String>,
}

impl SubscriptionStatusDto {
    pub fn none() -> Self {
        Self {
            status: SubscriptionState::None,
            plan_id: None,
            current_start: None,
            current_end: None,
            days_remaining: None,
            hours_remaining: None,
            subscription_id: None,
        }
    }

    pub fn from_record(
        record: &PaymentEntity,
        status: SubscriptionState,
        remaining: Option<RemainingTime>,
    ) -> Self {
        Self {
            status,
            plan_id: record.plan_id.clone(),
            current_start: record.current_start,
            current_end: record.current_end,
            days_remaining: remaining.map(|r| r.days_remaining),
            hours_remaining: remaining.map(|r| r.hours_remaining),
            subscription_id: record.subscription_id.clone(),
        }
    }
}

/// Returned instead of a new checkout link while a recent one is still unpaid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSubscriptionDto {
    pub status: &'static str,
    #[serde(rename = "short_url")]
    pub short_url: Option<String>,
    pub subscription_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PendingSubscriptionDto {
    pub const MESSAGE: &'static str = "Previous subscription pending. Please complete payment.";

    pub fn from_record(record: &PaymentEntity) -> Self {
        Self {
            status: "pending",
            short_url: record.short_url.clone(),
            subscription_id: record.subscription_id.clone(),
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSubscriptionDto {
    pub status: &'static str,
    pub subscription_id: Option<String>,
    pub current_end: Option<DateTime<Utc>>,
    pub days_remaining: Option<i64>,
}

impl ActiveSubscriptionDto {
    pub const MESSAGE: &'static str = "You already have an active subscription";

    pub fn from_record(record: &PaymentEntity, remaining: Option<RemainingTime>) -> Self {
        Self {
            status: "active",
            subscription_id: record.subscription_id.clone(),
            current_end: record.current_end,
            days_remaining: remaining.map(|r| r.days_remaining),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionHistoryEntryDto {
    pub id: String,
    pub subscription_id: Option<String>,
    pub plan_id: Option<String>,
    pub payment_id: Option<String>,
    /// Minor units (paise), exactly as charged by the gateway.
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub short_url: Option<String>,
    pub current_start: Option<DateTime<Utc>>,
    pub current_end: Option<DateTime<Utc>>,
    pub next_charge_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub days_remaining: Option<i64>,
    pub hours_remaining: Option<i64>,
}

impl SubscriptionHistoryEntryDto {
    pub fn from_record(record: PaymentEntity, remaining: Option<RemainingTime>) -> Self {
        Self {
            id: record.id.to_string(),
            subscription_id: record.subscription_id,
            plan_id: record.plan_id,
            payment_id: record.payment_id,
            amount_minor: record.amount_minor,
            currency: record.currency,
            status: record.status,
            short_url: record.short_url,
            current_start: record.current_start,
            current_end: record.current_end,
            next_charge_at: record.next_charge_at,
            created_at: record.created_at,
            days_remaining: remaining.map(|r| r.days_remaining),
            hours_remaining: remaining.map(|r| r.hours_remaining),
        }
    }
}
