//! Razorpay webhook envelope and the events this service acts on.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use thiserror::Error;

pub const EVENT_PAYMENT_CAPTURED: &str = "payment.captured";
pub const EVENT_SUBSCRIPTION_ACTIVATED: &str = "subscription.activated";
pub const EVENT_SUBSCRIPTION_CHARGED: &str = "subscription.charged";
pub const EVENT_SUBSCRIPTION_COMPLETED: &str = "subscription.completed";
pub const EVENT_SUBSCRIPTION_CANCELLED: &str = "subscription.cancelled";

#[derive(Debug, Deserialize)]
pub struct RazorpayWebhookEnvelope {
    pub event: String,
    #[serde(default)]
    pub payload: RazorpayWebhookPayload,
    pub created_at: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RazorpayWebhookPayload {
    pub subscription: Option<EntityWrapper<RazorpaySubscriptionEntity>>,
    pub payment: Option<EntityWrapper<RazorpayPaymentEntity>>,
}

#[derive(Debug, Deserialize)]
pub struct EntityWrapper<T> {
    pub entity: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RazorpaySubscriptionEntity {
    pub id: Option<String>,
    pub plan_id: Option<String>,
    pub status: Option<String>,
    pub current_start: Option<i64>,
    pub current_end: Option<i64>,
    pub charge_at: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayPaymentEntity {
    pub id: Option<String>,
    pub subscription_id: Option<String>,
    pub order_id: Option<String>,
    pub status: Option<String>,
}

/// Billing cycle boundaries carried by a subscription entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BillingCycle {
    pub current_start: Option<DateTime<Utc>>,
    pub current_end: Option<DateTime<Utc>>,
    pub next_charge_at: Option<DateTime<Utc>>,
}

/// A verified webhook, reduced to the fields each handler needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RazorpayWebhookEvent {
    /// `subscription_id` is `None` for one-time order payments.
    PaymentCaptured {
        payment_id: String,
        subscription_id: Option<String>,
    },
    SubscriptionActivated {
        subscription_id: String,
        cycle: BillingCycle,
    },
    SubscriptionCharged {
        subscription_id: String,
        payment_id: Option<String>,
        cycle: BillingCycle,
    },
    SubscriptionCompleted {
        subscription_id: String,
    },
    SubscriptionCancelled {
        subscription_id: String,
    },
    Unhandled {
        event_type: String,
    },
}

#[derive(Debug, Error)]
pub enum WebhookPayloadError {
    #[error("malformed webhook body: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("{event} is missing {field}")]
    MissingField {
        event: String,
        field: &'static str,
    },
}

impl RazorpayWebhookEvent {
    pub fn from_slice(body: &[u8]) -> Result<Self, WebhookPayloadError> {
        let envelope: RazorpayWebhookEnvelope = serde_json::from_slice(body)?;
        Self::from_envelope(envelope)
    }

    pub fn from_envelope(envelope: RazorpayWebhookEnvelope) -> Result<Self, WebhookPayloadError> {
        let RazorpayWebhookEnvelope { event, payload, .. } = envelope;
        let subscription = payload.subscription.map(|wrapper| wrapper.entity);
        let payment = payload.payment.map(|wrapper| wrapper.entity);

        let missing = |field: &'static str| WebhookPayloadError::MissingField {
            event: event.clone(),
            field,
        };

        let parsed = match event.as_str() {
            EVENT_PAYMENT_CAPTURED => {
                let payment = payment.ok_or_else(|| missing("payload.payment.entity"))?;
                RazorpayWebhookEvent::PaymentCaptured {
                    payment_id: payment.id.ok_or_else(|| missing("payment.entity.id"))?,
                    subscription_id: payment.subscription_id,
                }
            }
            EVENT_SUBSCRIPTION_ACTIVATED => {
                let subscription =
                    subscription.ok_or_else(|| missing("payload.subscription.entity"))?;
                RazorpayWebhookEvent::SubscriptionActivated {
                    cycle: billing_cycle(&subscription),
                    subscription_id: subscription
                        .id
                        .ok_or_else(|| missing("subscription.entity.id"))?,
                }
            }
            EVENT_SUBSCRIPTION_CHARGED => {
                let cycle = subscription.as_ref().map(billing_cycle).unwrap_or_default();
                let subscription_id = subscription
                    .and_then(|entity| entity.id)
                    .or_else(|| payment.as_ref().and_then(|p| p.subscription_id.clone()))
                    .ok_or_else(|| missing("subscription.entity.id"))?;
                RazorpayWebhookEvent::SubscriptionCharged {
                    subscription_id,
                    payment_id: payment.and_then(|p| p.id),
                    cycle,
                }
            }
            EVENT_SUBSCRIPTION_COMPLETED => RazorpayWebhookEvent::SubscriptionCompleted {
                subscription_id: subscription
                    .and_then(|entity| entity.id)
                    .ok_or_else(|| missing("subscription.entity.id"))?,
            },
            EVENT_SUBSCRIPTION_CANCELLED => RazorpayWebhookEvent::SubscriptionCancelled {
                subscription_id: subscription
                    .and_then(|entity| entity.id)
                    .ok_or_else(|| missing("subscription.entity.id"))?,
            },
            _ => RazorpayWebhookEvent::Unhandled {
                event_type: event.clone(),
            },
        };

        Ok(parsed)
    }

    pub fn event_type(&self) -> &str {
        match self {
            RazorpayWebhookEvent::PaymentCaptured { .. } => EVENT_PAYMENT_CAPTURED,
            RazorpayWebhookEvent::SubscriptionActivated { .. } => EVENT_SUBSCRIPTION_ACTIVATED,
            RazorpayWebhookEvent::SubscriptionCharged { .. } => EVENT_SUBSCRIPTION_CHARGED,
            RazorpayWebhookEvent::SubscriptionCompleted { .. } => EVENT_SUBSCRIPTION_COMPLETED,
            RazorpayWebhookEvent::SubscriptionCancelled { .. } => EVENT_SUBSCRIPTION_CANCELLED,
            RazorpayWebhookEvent::Unhandled { event_type } => event_type,
        }
    }
}

fn billing_cycle(entity: &RazorpaySubscriptionEntity) -> BillingCycle {
    BillingCycle {
        current_start: entity.current_start.and_then(ts_to_datetime),
        current_end: entity.current_end.and_then(ts_to_datetime),
        next_charge_at: entity.charge_at.and_then(ts_to_datetime),
    }
}

pub fn ts_to_datetime(ts: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(ts, 0).single()
}
