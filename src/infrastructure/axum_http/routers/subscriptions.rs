use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;

use crate::{
    application::usecases::subscriptions::{
        CreateSubscriptionOutcome, RazorpayGateway, SubscriptionUseCase,
    },
    config::config_model::RazorpayConfig,
    domain::{
        repositories::payments::PaymentRepository,
        value_objects::subscriptions::{
            ActiveSubscriptionDto, CreatePlanRequest, CreateSubscriptionRequest,
            PendingSubscriptionDto, SubscriptionHistoryEntryDto, SubscriptionStatusDto,
        },
    },
    infrastructure::{
        axum_http::auth::{AdminUser, AuthUser},
        postgres::{postgres_connection::PgPoolSquad, repositories::payments::PaymentPostgres},
        razorpay::razorpay_client::{RazorpayClient, RazorpayPlan, RazorpaySubscription},
    },
};

#[derive(Debug, Serialize)]
struct CreatedResponse {
    success: bool,
    subscription: RazorpaySubscription,
}

#[derive(Debug, Serialize)]
struct RejectedResponse<T: Serialize> {
    success: bool,
    message: &'static str,
    subscription: T,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    success: bool,
    #[serde(flatten)]
    status: SubscriptionStatusDto,
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    success: bool,
    count: usize,
    history: Vec<SubscriptionHistoryEntryDto>,
}

#[derive(Debug, Serialize)]
struct PlanResponse {
    success: bool,
    plan: RazorpayPlan,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, razorpay_config: &RazorpayConfig) -> Router {
    let payment_repository = PaymentPostgres::new(Arc::clone(&db_pool));
    let razorpay_client = RazorpayClient::new(razorpay_config);

    let usecase = SubscriptionUseCase::new(
        Arc::new(payment_repository),
        Arc::new(razorpay_client),
        razorpay_config.pro_plan_id.clone(),
        razorpay_config.total_count,
    );

    router(Arc::new(usecase))
}

pub fn router<Pay, Gateway>(usecase: Arc<SubscriptionUseCase<Pay, Gateway>>) -> Router
where
    Pay: PaymentRepository + Send + Sync + 'static,
    Gateway: RazorpayGateway + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/create-subscription",
            post(create_subscription::<Pay, Gateway>),
        )
        .route(
            "/subscription-status",
            get(subscription_status::<Pay, Gateway>),
        )
        .route(
            "/subscription-history",
            get(subscription_history::<Pay, Gateway>),
        )
        .route("/admin/create-plan", post(create_plan::<Pay, Gateway>))
        .with_state(usecase)
}

/// The body is optional; without `planId` the configured plan is used.
pub async fn create_subscription<Pay, Gateway>(
    State(usecase): State<Arc<SubscriptionUseCase<Pay, Gateway>>>,
    AuthUser { user_id, .. }: AuthUser,
    body: Option<Json<CreateSubscriptionRequest>>,
) -> Response
where
    Pay: PaymentRepository + Send + Sync + 'static,
    Gateway: RazorpayGateway + Send + Sync + 'static,
{
    let plan_id = body.and_then(|Json(request)| request.plan_id);

    match usecase.create_subscription(user_id, plan_id).await {
        Ok(CreateSubscriptionOutcome::Created(subscription)) => (
            StatusCode::OK,
            Json(CreatedResponse {
                success: true,
                subscription,
            }),
        )
            .into_response(),
        Ok(CreateSubscriptionOutcome::Pending(subscription)) => (
            StatusCode::BAD_REQUEST,
            Json(RejectedResponse {
                success: false,
                message: PendingSubscriptionDto::MESSAGE,
                subscription,
            }),
        )
            .into_response(),
        Ok(CreateSubscriptionOutcome::AlreadyActive(subscription)) => (
            StatusCode::BAD_REQUEST,
            Json(RejectedResponse {
                success: false,
                message: ActiveSubscriptionDto::MESSAGE,
                subscription,
            }),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn subscription_status<Pay, Gateway>(
    State(usecase): State<Arc<SubscriptionUseCase<Pay, Gateway>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Response
where
    Pay: PaymentRepository + Send + Sync + 'static,
    Gateway: RazorpayGateway + Send + Sync + 'static,
{
    match usecase.get_status(user_id).await {
        Ok(status) => Json(StatusResponse {
            success: true,
            status,
        })
        .into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn subscription_history<Pay, Gateway>(
    State(usecase): State<Arc<SubscriptionUseCase<Pay, Gateway>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Response
where
    Pay: PaymentRepository + Send + Sync + 'static,
    Gateway: RazorpayGateway + Send + Sync + 'static,
{
    match usecase.get_history(user_id).await {
        Ok(history) => Json(HistoryResponse {
            success: true,
            count: history.len(),
            history,
        })
        .into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn create_plan<Pay, Gateway>(
    State(usecase): State<Arc<SubscriptionUseCase<Pay, Gateway>>>,
    _admin: AdminUser,
    Json(request): Json<CreatePlanRequest>,
) -> Response
where
    Pay: PaymentRepository + Send + Sync + 'static,
    Gateway: RazorpayGateway + Send + Sync + 'static,
{
    match usecase.create_plan(request).await {
        Ok(plan) => Json(PlanResponse {
            success: true,
            plan,
        })
        .into_response(),
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        application::usecases::subscriptions::MockRazorpayGateway,
        domain::repositories::payments::MockPaymentRepository,
        infrastructure::axum_http::auth::tests::{TEST_SECRET, set_env_vars, token_for},
    };
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app(payment_repo: MockPaymentRepository, gateway: MockRazorpayGateway) -> Router {
        router(Arc::new(SubscriptionUseCase::new(
            Arc::new(payment_repo),
            Arc::new(gateway),
            "plan_pro".to_string(),
            12,
        )))
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn status_requires_bearer_token() {
        let response = app(MockPaymentRepository::new(), MockRazorpayGateway::new())
            .oneshot(
                Request::builder()
                    .uri("/subscription-status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["success"], false);
    }

    #[tokio::test]
    async fn status_without_records_reports_none() {
        set_env_vars();
        let user_id = Uuid::new_v4();
        let token = token_for(user_id, "user", TEST_SECRET, 9999999999);

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_find_latest_by_user()
            .returning(|_| Ok(None));

        let response = app(payment_repo, MockRazorpayGateway::new())
            .oneshot(
                Request::builder()
                    .uri("/subscription-status")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["status"], "none");
        assert_eq!(body["daysRemaining"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn create_plan_is_admin_only() {
        set_env_vars();
        let token = token_for(Uuid::new_v4(), "user", TEST_SECRET, 9999999999);

        let mut gateway = MockRazorpayGateway::new();
        gateway.expect_create_plan().never();

        let response = app(MockPaymentRepository::new(), gateway)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/admin/create-plan")
                    .header("authorization", format!("Bearer {token}"))
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
