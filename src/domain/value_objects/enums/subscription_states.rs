use std::fmt::Display;

use serde::Serialize;

use super::payment_statuses::PaymentStatus;

/// Status reported to clients. Adds `none` (no record) to the stored states; `expired` is
/// also what a lazily expired `active` record reports on the read that flips it.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionState {
    None,
    Created,
    Active,
    Cancelled,
    Failed,
    Expired,
}

impl From<PaymentStatus> for SubscriptionState {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Created => SubscriptionState::Created,
            PaymentStatus::Active => SubscriptionState::Active,
            PaymentStatus::Cancelled => SubscriptionState::Cancelled,
            PaymentStatus::Failed => SubscriptionState::Failed,
            PaymentStatus::Expired => SubscriptionState::Expired,
        }
    }
}

impl Display for SubscriptionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self {
            SubscriptionState::None => "none",
            SubscriptionState::Created => "created",
            SubscriptionState::Active => "active",
            SubscriptionState::Cancelled => "cancelled",
            SubscriptionState::Failed => "failed",
            SubscriptionState::Expired => "expired",
        };
        write!(f, "{}", state)
    }
}
