use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::application::usecases::{
    custom_urls::CustomUrlError, subscription_webhook::WebhookError,
    subscriptions::SubscriptionError,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub success: bool,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            success: false,
            message: message.into(),
        }),
    )
        .into_response()
}

pub fn ack(status: StatusCode) -> Response {
    (
        status,
        Json(AckResponse {
            success: status.is_success(),
        }),
    )
        .into_response()
}

impl IntoResponse for SubscriptionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            // Don't leak internal error detail to client
            SubscriptionError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        error_response(status, message)
    }
}

impl IntoResponse for CustomUrlError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            CustomUrlError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        error_response(status, message)
    }
}

/// The gateway only looks at the status code; the body stays `{success:false}`.
impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        ack(self.status_code())
    }
}
