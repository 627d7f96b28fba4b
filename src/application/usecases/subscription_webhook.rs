use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    domain::{
        entities::payments::UpdatePaymentEntity,
        repositories::payments::PaymentRepository,
        value_objects::{
            enums::payment_statuses::PaymentStatus,
            razorpay_webhook::{RazorpayWebhookEvent, WebhookPayloadError},
        },
    },
    infrastructure::razorpay::webhook_signature::WebhookVerifier,
};

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("invalid webhook signature")]
    InvalidSignature,
    #[error("invalid webhook payload: {0}")]
    InvalidPayload(#[from] WebhookPayloadError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl WebhookError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            WebhookError::InvalidSignature | WebhookError::InvalidPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            WebhookError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, WebhookError>;

/// What a delivery did to the store. Every variant is acknowledged with success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Applied,
    /// Recognised event, but no record carries its subscription id.
    UnknownSubscription,
    Ignored,
}

pub struct SubscriptionWebhookUseCase<Pay>
where
    Pay: PaymentRepository + Send + Sync + 'static,
{
    payment_repo: Arc<Pay>,
    verifier: WebhookVerifier,
}

impl<Pay> SubscriptionWebhookUseCase<Pay>
where
    Pay: PaymentRepository + Send + Sync + 'static,
{
    pub fn new(payment_repo: Arc<Pay>, verifier: WebhookVerifier) -> Self {
        Self {
            payment_repo,
            verifier,
        }
    }

    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> UseCaseResult<WebhookOutcome> {
        self.handle_webhook_at(payload, signature, Utc::now()).await
    }

    /// Verifies the raw bytes first; nothing is parsed or written on a mismatch.
    pub async fn handle_webhook_at(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        now: DateTime<Utc>,
    ) -> UseCaseResult<WebhookOutcome> {
        let verified = signature.is_some_and(|signature| self.verifier.verify(payload, signature));
        if !verified {
            let err = WebhookError::InvalidSignature;
            warn!(
                signature_present = signature.is_some(),
                payload_bytes = payload.len(),
                status = err.status_code().as_u16(),
                "subscription webhook: signature verification failed"
            );
            return Err(err);
        }

        let event = RazorpayWebhookEvent::from_slice(payload).map_err(|err| {
            warn!(
                error = %err,
                status = 400u16,
                "subscription webhook: invalid payload"
            );
            WebhookError::InvalidPayload(err)
        })?;

        info!(event_type = %event.event_type(), "subscription webhook: verified");

        self.dispatch(event, now).await
    }

    pub async fn dispatch(
        &self,
        event: RazorpayWebhookEvent,
        now: DateTime<Utc>,
    ) -> UseCaseResult<WebhookOutcome> {
        match event {
            RazorpayWebhookEvent::PaymentCaptured {
                payment_id,
                subscription_id,
            } => {
                let Some(subscription_id) = subscription_id else {
                    debug!(%payment_id, "subscription webhook: order payment captured, nothing to sync");
                    return Ok(WebhookOutcome::Ignored);
                };
                let update = UpdatePaymentEntity::new(now)
                    .status(PaymentStatus::Active)
                    .payment_id(Some(payment_id));
                self.apply("payment.captured", &subscription_id, update).await
            }
            RazorpayWebhookEvent::SubscriptionActivated {
                subscription_id,
                cycle,
            } => {
                let update = UpdatePaymentEntity::new(now)
                    .status(PaymentStatus::Active)
                    .billing_cycle(cycle.current_start, cycle.current_end)
                    .next_charge_at(cycle.next_charge_at);
                self.apply("subscription.activated", &subscription_id, update)
                    .await
            }
            RazorpayWebhookEvent::SubscriptionCharged {
                subscription_id,
                payment_id,
                cycle,
            } => {
                let update = UpdatePaymentEntity::new(now)
                    .status(PaymentStatus::Active)
                    .payment_id(payment_id)
                    .billing_cycle(cycle.current_start, cycle.current_end)
                    .next_charge_at(cycle.next_charge_at);
                self.apply("subscription.charged", &subscription_id, update)
                    .await
            }
            RazorpayWebhookEvent::SubscriptionCompleted { subscription_id } => {
                // Access stays until the stored current_end lapses.
                info!(
                    %subscription_id,
                    "subscription webhook: billing cycles completed, leaving record active"
                );
                Ok(WebhookOutcome::Ignored)
            }
            RazorpayWebhookEvent::SubscriptionCancelled { subscription_id } => {
                let update = UpdatePaymentEntity::new(now).status(PaymentStatus::Cancelled);
                self.apply("subscription.cancelled", &subscription_id, update)
                    .await
            }
            RazorpayWebhookEvent::Unhandled { event_type } => {
                debug!(%event_type, "subscription webhook: unhandled event type");
                Ok(WebhookOutcome::Ignored)
            }
        }
    }

    async fn apply(
        &self,
        event_type: &str,
        subscription_id: &str,
        update: UpdatePaymentEntity,
    ) -> UseCaseResult<WebhookOutcome> {
        let updated = self
            .payment_repo
            .update_by_subscription_id(subscription_id, update)
            .await
            .map_err(|err| {
                error!(
                    %event_type,
                    %subscription_id,
                    db_error = ?err,
                    "subscription webhook: failed to update subscription record"
                );
                WebhookError::Internal(err)
            })?;

        match updated {
            Some(record) => {
                info!(
                    %event_type,
                    %subscription_id,
                    record_id = %record.id,
                    status = %record.status,
                    "subscription webhook: subscription record updated"
                );
                Ok(WebhookOutcome::Applied)
            }
            None => {
                warn!(
                    %event_type,
                    %subscription_id,
                    "subscription webhook: no record for subscription id"
                );
                Ok(WebhookOutcome::UnknownSubscription)
            }
        }
    }
}
