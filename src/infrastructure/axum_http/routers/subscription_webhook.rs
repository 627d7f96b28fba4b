use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};

use crate::{
    application::usecases::subscription_webhook::SubscriptionWebhookUseCase,
    config::config_model::RazorpayConfig,
    domain::repositories::payments::PaymentRepository,
    infrastructure::{
        axum_http::error_responses::ack,
        postgres::{postgres_connection::PgPoolSquad, repositories::payments::PaymentPostgres},
        razorpay::webhook_signature::{SIGNATURE_HEADER, WebhookVerifier},
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, razorpay_config: &RazorpayConfig) -> Router {
    let payment_repository = PaymentPostgres::new(Arc::clone(&db_pool));
    let usecase = SubscriptionWebhookUseCase::new(
        Arc::new(payment_repository),
        WebhookVerifier::from_config(razorpay_config),
    );

    router(Arc::new(usecase))
}

pub fn router<Pay>(usecase: Arc<SubscriptionWebhookUseCase<Pay>>) -> Router
where
    Pay: PaymentRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/subscription-webhook", post(subscription_webhook::<Pay>))
        .with_state(usecase)
}

/// Takes the body as raw bytes so the signature is checked against exactly what was sent.
pub async fn subscription_webhook<Pay>(
    State(usecase): State<Arc<SubscriptionWebhookUseCase<Pay>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    Pay: PaymentRepository + Send + Sync + 'static,
{
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match usecase.handle_webhook(&body, signature).await {
        Ok(_) => ack(StatusCode::OK),
        Err(err) => err.into_response(),
    }
}
