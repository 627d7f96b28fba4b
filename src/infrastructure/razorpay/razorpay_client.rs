use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::config::config_model::RazorpayConfig;

/// Minimal Razorpay client built on reqwest. Authenticates with key id / key secret.
pub struct RazorpayClient {
    http: reqwest::Client,
    key_id: String,
    key_secret: String,
    api_base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPlan {
    pub period: String,
    pub interval: u32,
    pub item: NewPlanItem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPlanItem {
    pub name: String,
    /// Minor units (paise for INR).
    pub amount: i64,
    pub currency: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RazorpayPlan {
    pub id: String,
    pub period: Option<String>,
    pub interval: Option<u32>,
    pub item: RazorpayPlanItem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RazorpayPlanItem {
    pub name: Option<String>,
    pub amount: i64,
    pub currency: String,
    pub description: Option<String>,
}

/// The subset of the subscription entity this service reads back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RazorpaySubscription {
    pub id: String,
    pub plan_id: Option<String>,
    pub status: Option<String>,
    pub short_url: Option<String>,
    pub total_count: Option<u32>,
    pub current_start: Option<i64>,
    pub current_end: Option<i64>,
    pub charge_at: Option<i64>,
}

#[derive(Debug, Serialize)]
struct CreateSubscriptionBody<'a> {
    plan_id: &'a str,
    customer_notify: u8,
    total_count: u32,
}

#[derive(Debug, Serialize)]
struct CancelSubscriptionBody {
    cancel_at_cycle_end: u8,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorEnvelope {
    error: RazorpayErrorDetails,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorDetails {
    code: Option<String>,
    description: Option<String>,
    field: Option<String>,
    reason: Option<String>,
}

impl RazorpayClient {
    pub fn new(config: &RazorpayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let (razorpay_error_code, razorpay_error_description, razorpay_error_field, razorpay_error_reason) =
            match serde_json::from_str::<RazorpayErrorEnvelope>(&body) {
                Ok(envelope) => {
                    let details = envelope.error;
                    (details.code, details.description, details.field, details.reason)
                }
                Err(_) => (None, None, None, None),
            };

        error!(
            status = %status,
            razorpay_error_code = ?razorpay_error_code,
            razorpay_error_description = ?razorpay_error_description,
            razorpay_error_field = ?razorpay_error_field,
            razorpay_error_reason = ?razorpay_error_reason,
            response_body = %body,
            context = %context,
            "razorpay api request failed"
        );

        anyhow::bail!(
            "Razorpay API request failed: {} (status {}, code={:?})",
            context,
            status,
            razorpay_error_code
        );
    }

    /// https://razorpay.com/docs/api/payments/subscriptions/create-plan
    pub async fn create_plan(&self, plan: &NewPlan) -> Result<RazorpayPlan> {
        let resp = self
            .http
            .post(self.url("plans"))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(plan)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create plan").await?;

        Ok(resp.json().await?)
    }

    pub async fn fetch_plan(&self, plan_id: &str) -> Result<RazorpayPlan> {
        let resp = self
            .http
            .get(self.url(&format!("plans/{plan_id}")))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "fetch plan").await?;

        Ok(resp.json().await?)
    }

    /// Creates a subscription whose hosted checkout link is `short_url`.
    pub async fn create_subscription(
        &self,
        plan_id: &str,
        total_count: u32,
    ) -> Result<RazorpaySubscription> {
        let body = CreateSubscriptionBody {
            plan_id,
            customer_notify: 1,
            total_count,
        };

        let resp = self
            .http
            .post(self.url("subscriptions"))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create subscription").await?;

        Ok(resp.json().await?)
    }

    /// Cancels immediately rather than at cycle end.
    pub async fn cancel_subscription(&self, subscription_id: &str) -> Result<()> {
        let resp = self
            .http
            .post(self.url(&format!("subscriptions/{subscription_id}/cancel")))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CancelSubscriptionBody {
                cancel_at_cycle_end: 0,
            })
            .send()
            .await?;
        Self::ensure_success(resp, "cancel subscription").await?;

        Ok(())
    }
}
