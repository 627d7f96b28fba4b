use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    domain::{
        entities::payments::{InsertPaymentEntity, PaymentEntity},
        repositories::payments::PaymentRepository,
        value_objects::{
            enums::{
                payment_statuses::PaymentStatus, payment_types::PaymentType,
                subscription_states::SubscriptionState,
            },
            subscriptions::{
                ActiveSubscriptionDto, CreatePlanRequest, PENDING_DEDUP_WINDOW_MS,
                PendingSubscriptionDto, RemainingTime, SubscriptionHistoryEntryDto,
                SubscriptionStatusDto,
            },
        },
    },
    infrastructure::razorpay::razorpay_client::{
        NewPlan, NewPlanItem, RazorpayClient, RazorpayPlan, RazorpaySubscription,
    },
};

pub const DEFAULT_PLAN_NAME: &str = "Pro Subscription";
pub const DEFAULT_PLAN_DESCRIPTION: &str = "Monthly Pro Plan";
pub const DEFAULT_PLAN_AMOUNT_MINOR: i64 = 1999 * 100;
pub const DEFAULT_PLAN_CURRENCY: &str = "INR";
pub const DEFAULT_PLAN_PERIOD: &str = "monthly";
const PLAN_PERIODS: [&str; 4] = ["daily", "weekly", "monthly", "yearly"];

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RazorpayGateway: Send + Sync {
    async fn create_plan(&self, plan: NewPlan) -> AnyResult<RazorpayPlan>;

    async fn fetch_plan(&self, plan_id: &str) -> AnyResult<RazorpayPlan>;

    async fn create_subscription(
        &self,
        plan_id: &str,
        total_count: u32,
    ) -> AnyResult<RazorpaySubscription>;

    async fn cancel_subscription(&self, subscription_id: &str) -> AnyResult<()>;
}

#[async_trait]
impl RazorpayGateway for RazorpayClient {
    async fn create_plan(&self, plan: NewPlan) -> AnyResult<RazorpayPlan> {
        self.create_plan(&plan).await
    }

    async fn fetch_plan(&self, plan_id: &str) -> AnyResult<RazorpayPlan> {
        self.fetch_plan(plan_id).await
    }

    async fn create_subscription(
        &self,
        plan_id: &str,
        total_count: u32,
    ) -> AnyResult<RazorpaySubscription> {
        self.create_subscription(plan_id, total_count).await
    }

    async fn cancel_subscription(&self, subscription_id: &str) -> AnyResult<()> {
        self.cancel_subscription(subscription_id).await
    }
}

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("plan id is required")]
    MissingPlanId,
    #[error("invalid plan: {0}")]
    InvalidPlan(String),
    #[error("payment gateway request failed")]
    Gateway(#[source] anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SubscriptionError::MissingPlanId | SubscriptionError::InvalidPlan(_) => {
                StatusCode::BAD_REQUEST
            }
            SubscriptionError::Gateway(_) => StatusCode::BAD_GATEWAY,
            SubscriptionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

/// Result of a create request. Only `Created` minted a new remote subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateSubscriptionOutcome {
    Created(RazorpaySubscription),
    Pending(PendingSubscriptionDto),
    AlreadyActive(ActiveSubscriptionDto),
}

pub struct SubscriptionUseCase<Pay, Gateway>
where
    Pay: PaymentRepository + Send + Sync + 'static,
    Gateway: RazorpayGateway + Send + Sync + 'static,
{
    payment_repo: Arc<Pay>,
    razorpay: Arc<Gateway>,
    default_plan_id: String,
    total_count: u32,
}

impl<Pay, Gateway> SubscriptionUseCase<Pay, Gateway>
where
    Pay: PaymentRepository + Send + Sync + 'static,
    Gateway: RazorpayGateway + Send + Sync + 'static,
{
    pub fn new(
        payment_repo: Arc<Pay>,
        razorpay: Arc<Gateway>,
        default_plan_id: String,
        total_count: u32,
    ) -> Self {
        Self {
            payment_repo,
            razorpay,
            default_plan_id,
            total_count,
        }
    }

    pub async fn create_subscription(
        &self,
        user_id: Uuid,
        plan_id: Option<String>,
    ) -> UseCaseResult<CreateSubscriptionOutcome> {
        self.create_subscription_at(user_id, plan_id, Utc::now())
            .await
    }

    pub async fn create_subscription_at(
        &self,
        user_id: Uuid,
        plan_id: Option<String>,
        now: DateTime<Utc>,
    ) -> UseCaseResult<CreateSubscriptionOutcome> {
        info!(%user_id, "subscriptions: create subscription requested");

        let active = self
            .find_latest(user_id, PaymentStatus::Active)
            .await?;

        if let Some(active) = active {
            match active
                .current_end
                .and_then(|current_end| RemainingTime::until(current_end, now))
            {
                Some(remaining) => {
                    info!(
                        %user_id,
                        subscription_id = ?active.subscription_id,
                        "subscriptions: user already has an active subscription"
                    );
                    return Ok(CreateSubscriptionOutcome::AlreadyActive(
                        ActiveSubscriptionDto::from_record(&active, Some(remaining)),
                    ));
                }
                // A missing cycle end is as stale as a past one.
                None => {
                    info!(
                        %user_id,
                        record_id = %active.id,
                        current_end = ?active.current_end,
                        "subscriptions: active record lapsed, expiring before create"
                    );
                    self.expire(&active, now).await?;
                }
            }
        }

        let pending = self
            .find_latest(user_id, PaymentStatus::Created)
            .await?;

        if let Some(pending) = pending {
            let age_ms = (now - pending.created_at).num_milliseconds();
            if age_ms < PENDING_DEDUP_WINDOW_MS {
                info!(
                    %user_id,
                    subscription_id = ?pending.subscription_id,
                    age_ms,
                    "subscriptions: reusing pending checkout link"
                );
                return Ok(CreateSubscriptionOutcome::Pending(
                    PendingSubscriptionDto::from_record(&pending),
                ));
            }

            self.supersede_pending(&pending, now).await?;
        }

        let plan_id = plan_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| self.default_plan_id.clone());
        if plan_id.is_empty() {
            let err = SubscriptionError::MissingPlanId;
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                "subscriptions: no plan id requested or configured"
            );
            return Err(err);
        }

        let plan = self.razorpay.fetch_plan(&plan_id).await.map_err(|err| {
            error!(
                %user_id,
                %plan_id,
                error = ?err,
                "subscriptions: failed to fetch plan from razorpay"
            );
            SubscriptionError::Gateway(err)
        })?;

        let subscription = self
            .razorpay
            .create_subscription(&plan_id, self.total_count)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %plan_id,
                    error = ?err,
                    "subscriptions: failed to create razorpay subscription"
                );
                SubscriptionError::Gateway(err)
            })?;

        let record = self
            .payment_repo
            .insert(InsertPaymentEntity {
                user_id,
                payment_type: PaymentType::Subscription.to_string(),
                subscription_id: Some(subscription.id.clone()),
                plan_id: Some(plan_id.clone()),
                short_url: subscription.short_url.clone(),
                amount_minor: plan.item.amount,
                currency: plan.item.currency.clone(),
                status: PaymentStatus::Created.to_string(),
            })
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    subscription_id = %subscription.id,
                    db_error = ?err,
                    "subscriptions: failed to persist created subscription"
                );
                SubscriptionError::Internal(err)
            })?;

        info!(
            %user_id,
            record_id = %record.id,
            subscription_id = %subscription.id,
            %plan_id,
            "subscriptions: subscription created"
        );

        Ok(CreateSubscriptionOutcome::Created(subscription))
    }

    pub async fn get_status(&self, user_id: Uuid) -> UseCaseResult<SubscriptionStatusDto> {
        self.get_status_at(user_id, Utc::now()).await
    }

    /// Reads the newest record. A lapsed `active` record is flipped to `cancelled` here and
    /// reported as `expired` on this one read.
    pub async fn get_status_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> UseCaseResult<SubscriptionStatusDto> {
        let latest = self
            .payment_repo
            .find_latest_by_user(user_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    db_error = ?err,
                    "subscriptions: failed to load latest subscription"
                );
                SubscriptionError::Internal(err)
            })?;

        let Some(record) = latest else {
            return Ok(SubscriptionStatusDto::none());
        };

        let status = record.payment_status();
        if status != PaymentStatus::Active {
            return Ok(SubscriptionStatusDto::from_record(
                &record,
                status.into(),
                None,
            ));
        }

        if record.current_end.is_none() {
            warn!(
                %user_id,
                record_id = %record.id,
                "subscriptions: active record has no cycle end, expiring it"
            );
        }

        match record
            .current_end
            .and_then(|current_end| RemainingTime::until(current_end, now))
        {
            Some(remaining) => Ok(SubscriptionStatusDto::from_record(
                &record,
                SubscriptionState::Active,
                Some(remaining),
            )),
            None => {
                self.expire(&record, now).await?;
                Ok(SubscriptionStatusDto::from_record(
                    &record,
                    SubscriptionState::Expired,
                    Some(RemainingTime::ZERO),
                ))
            }
        }
    }

    pub async fn get_history(
        &self,
        user_id: Uuid,
    ) -> UseCaseResult<Vec<SubscriptionHistoryEntryDto>> {
        self.get_history_at(user_id, Utc::now()).await
    }

    /// Read-only: lapsed records show zero remaining but are not flipped.
    pub async fn get_history_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> UseCaseResult<Vec<SubscriptionHistoryEntryDto>> {
        let records = self
            .payment_repo
            .list_by_user(user_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    db_error = ?err,
                    "subscriptions: failed to list subscription history"
                );
                SubscriptionError::Internal(err)
            })?;

        info!(%user_id, count = records.len(), "subscriptions: history loaded");

        Ok(records
            .into_iter()
            .map(|record| {
                let remaining = (record.payment_status() == PaymentStatus::Active).then(|| {
                    record
                        .current_end
                        .and_then(|end| RemainingTime::until(end, now))
                        .unwrap_or(RemainingTime::ZERO)
                });
                SubscriptionHistoryEntryDto::from_record(record, remaining)
            })
            .collect())
    }

    pub async fn create_plan(&self, request: CreatePlanRequest) -> UseCaseResult<RazorpayPlan> {
        let plan = Self::new_plan(request)?;

        info!(
            name = %plan.item.name,
            amount = plan.item.amount,
            currency = %plan.item.currency,
            period = %plan.period,
            interval = plan.interval,
            "subscriptions: creating razorpay plan"
        );

        let created = self.razorpay.create_plan(plan).await.map_err(|err| {
            error!(error = ?err, "subscriptions: failed to create razorpay plan");
            SubscriptionError::Gateway(err)
        })?;

        info!(plan_id = %created.id, "subscriptions: razorpay plan created");
        Ok(created)
    }

    fn new_plan(request: CreatePlanRequest) -> UseCaseResult<NewPlan> {
        let amount = request.amount.unwrap_or(DEFAULT_PLAN_AMOUNT_MINOR);
        if amount <= 0 {
            return Err(SubscriptionError::InvalidPlan(
                "amount must be positive".to_string(),
            ));
        }

        let period = request
            .period
            .unwrap_or_else(|| DEFAULT_PLAN_PERIOD.to_string());
        if !PLAN_PERIODS.contains(&period.as_str()) {
            return Err(SubscriptionError::InvalidPlan(format!(
                "unsupported period {period}"
            )));
        }

        let interval = request.interval.unwrap_or(1);
        if interval == 0 {
            return Err(SubscriptionError::InvalidPlan(
                "interval must be at least 1".to_string(),
            ));
        }

        Ok(NewPlan {
            period,
            interval,
            item: NewPlanItem {
                name: request
                    .name
                    .unwrap_or_else(|| DEFAULT_PLAN_NAME.to_string()),
                amount,
                currency: request
                    .currency
                    .unwrap_or_else(|| DEFAULT_PLAN_CURRENCY.to_string()),
                description: request
                    .description
                    .unwrap_or_else(|| DEFAULT_PLAN_DESCRIPTION.to_string()),
            },
        })
    }

    async fn find_latest(
        &self,
        user_id: Uuid,
        status: PaymentStatus,
    ) -> UseCaseResult<Option<PaymentEntity>> {
        self.payment_repo
            .find_latest_by_user_and_status(user_id, PaymentType::Subscription, status)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    status = %status,
                    db_error = ?err,
                    "subscriptions: failed to load subscription by status"
                );
                SubscriptionError::Internal(err)
            })
    }

    async fn expire(&self, record: &PaymentEntity, now: DateTime<Utc>) -> UseCaseResult<()> {
        let expired = self
            .payment_repo
            .expire_if_active(record.id, now)
            .await
            .map_err(|err| {
                error!(
                    record_id = %record.id,
                    db_error = ?err,
                    "subscriptions: failed to expire lapsed subscription"
                );
                SubscriptionError::Internal(err)
            })?;

        if expired.is_some() {
            info!(
                user_id = %record.user_id,
                record_id = %record.id,
                subscription_id = ?record.subscription_id,
                "subscriptions: lapsed subscription marked cancelled"
            );
        }

        Ok(())
    }

    /// Best-effort remote cancel, then `created -> failed` locally.
    async fn supersede_pending(
        &self,
        pending: &PaymentEntity,
        now: DateTime<Utc>,
    ) -> UseCaseResult<()> {
        if let Some(subscription_id) = pending.subscription_id.as_deref() {
            if let Err(err) = self.razorpay.cancel_subscription(subscription_id).await {
                warn!(
                    user_id = %pending.user_id,
                    %subscription_id,
                    error = ?err,
                    "subscriptions: failed to cancel stale razorpay subscription"
                );
            }
        }

        self.payment_repo
            .mark_failed_if_created(pending.id, now)
            .await
            .map_err(|err| {
                error!(
                    record_id = %pending.id,
                    db_error = ?err,
                    "subscriptions: failed to mark stale subscription failed"
                );
                SubscriptionError::Internal(err)
            })?;

        info!(
            user_id = %pending.user_id,
            record_id = %pending.id,
            subscription_id = ?pending.subscription_id,
            "subscriptions: stale pending subscription superseded"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::payments::MockPaymentRepository;
    use chrono::{Duration, TimeZone};
    use mockall::predicate::eq;

    const PLAN_ID: &str = "plan_pro";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn record(user_id: Uuid, status: PaymentStatus, created_at: DateTime<Utc>) -> PaymentEntity {
        PaymentEntity {
            id: Uuid::new_v4(),
            user_id,
            payment_type: PaymentType::Subscription.to_string(),
            order_id: None,
            payment_id: None,
            signature: None,
            subscription_id: Some("sub_old".to_string()),
            plan_id: Some(PLAN_ID.to_string()),
            short_url: Some("https://rzp.io/i/old".to_string()),
            amount_minor: DEFAULT_PLAN_AMOUNT_MINOR,
            currency: "INR".to_string(),
            status: status.to_string(),
            current_start: None,
            current_end: None,
            next_charge_at: None,
            created_at,
            updated_at: created_at,
        }
    }

    fn plan() -> RazorpayPlan {
        RazorpayPlan {
            id: PLAN_ID.to_string(),
            period: Some("monthly".to_string()),
            interval: Some(1),
            item: crate::infrastructure::razorpay::razorpay_client::RazorpayPlanItem {
                name: Some(DEFAULT_PLAN_NAME.to_string()),
                amount: DEFAULT_PLAN_AMOUNT_MINOR,
                currency: "INR".to_string(),
                description: None,
            },
        }
    }

    fn remote_subscription(id: &str) -> RazorpaySubscription {
        RazorpaySubscription {
            id: id.to_string(),
            plan_id: Some(PLAN_ID.to_string()),
            status: Some("created".to_string()),
            short_url: Some(format!("https://rzp.io/i/{id}")),
            total_count: Some(12),
            current_start: None,
            current_end: None,
            charge_at: None,
        }
    }

    fn use_case(
        payment_repo: MockPaymentRepository,
        gateway: MockRazorpayGateway,
    ) -> SubscriptionUseCase<MockPaymentRepository, MockRazorpayGateway> {
        SubscriptionUseCase::new(
            Arc::new(payment_repo),
            Arc::new(gateway),
            PLAN_ID.to_string(),
            12,
        )
    }

    fn expect_status_lookup(
        payment_repo: &mut MockPaymentRepository,
        status: PaymentStatus,
        result: Option<PaymentEntity>,
    ) {
        payment_repo
            .expect_find_latest_by_user_and_status()
            .withf(move |_, payment_type, wanted| {
                *payment_type == PaymentType::Subscription && *wanted == status
            })
            .returning(move |_, _, _| Ok(result.clone()));
    }

    #[tokio::test]
    async fn pending_record_inside_window_reuses_link() {
        let user_id = Uuid::new_v4();
        let pending = record(user_id, PaymentStatus::Created, now() - Duration::minutes(4));

        let mut payment_repo = MockPaymentRepository::new();
        expect_status_lookup(&mut payment_repo, PaymentStatus::Active, None);
        expect_status_lookup(&mut payment_repo, PaymentStatus::Created, Some(pending));
        payment_repo.expect_insert().never();

        let mut gateway = MockRazorpayGateway::new();
        gateway.expect_create_subscription().never();
        gateway.expect_cancel_subscription().never();

        let outcome = use_case(payment_repo, gateway)
            .create_subscription_at(user_id, None, now())
            .await
            .unwrap();

        match outcome {
            CreateSubscriptionOutcome::Pending(dto) => {
                assert_eq!(dto.short_url.as_deref(), Some("https://rzp.io/i/old"));
                assert_eq!(dto.subscription_id.as_deref(), Some("sub_old"));
            }
            other => panic!("expected pending, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stale_pending_record_is_cancelled_and_replaced() {
        let user_id = Uuid::new_v4();
        let pending = record(user_id, PaymentStatus::Created, now() - Duration::minutes(6));
        let pending_id = pending.id;

        let mut payment_repo = MockPaymentRepository::new();
        expect_status_lookup(&mut payment_repo, PaymentStatus::Active, None);
        expect_status_lookup(&mut payment_repo, PaymentStatus::Created, Some(pending.clone()));
        payment_repo
            .expect_mark_failed_if_created()
            .with(eq(pending_id), eq(now()))
            .times(1)
            .returning(move |_, _| Ok(Some(pending.clone())));
        payment_repo
            .expect_insert()
            .withf(|insert| {
                insert.subscription_id.as_deref() == Some("sub_new")
                    && insert.short_url.as_deref() == Some("https://rzp.io/i/sub_new")
                    && insert.status == "created"
                    && insert.amount_minor == DEFAULT_PLAN_AMOUNT_MINOR
                    && insert.currency == "INR"
            })
            .times(1)
            .returning(move |insert| {
                let mut row = record(insert.user_id, PaymentStatus::Created, now());
                row.subscription_id = insert.subscription_id;
                row.short_url = insert.short_url;
                Ok(row)
            });

        let mut gateway = MockRazorpayGateway::new();
        gateway
            .expect_cancel_subscription()
            .withf(|subscription_id| subscription_id == "sub_old")
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("already cancelled")));
        gateway
            .expect_fetch_plan()
            .returning(|_| Ok(plan()));
        gateway
            .expect_create_subscription()
            .withf(|plan_id, total_count| plan_id == PLAN_ID && *total_count == 12)
            .times(1)
            .returning(|_, _| Ok(remote_subscription("sub_new")));

        let outcome = use_case(payment_repo, gateway)
            .create_subscription_at(user_id, None, now())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CreateSubscriptionOutcome::Created(remote_subscription("sub_new"))
        );
    }

    #[tokio::test]
    async fn active_subscription_blocks_new_one() {
        let user_id = Uuid::new_v4();
        let mut active = record(user_id, PaymentStatus::Active, now() - Duration::days(10));
        active.current_end = Some(now() + Duration::days(2) + Duration::hours(1));

        let mut payment_repo = MockPaymentRepository::new();
        expect_status_lookup(&mut payment_repo, PaymentStatus::Active, Some(active));
        payment_repo.expect_insert().never();

        let mut gateway = MockRazorpayGateway::new();
        gateway.expect_create_subscription().never();

        let outcome = use_case(payment_repo, gateway)
            .create_subscription_at(user_id, None, now())
            .await
            .unwrap();

        match outcome {
            CreateSubscriptionOutcome::AlreadyActive(dto) => {
                assert_eq!(dto.days_remaining, Some(3));
                assert_eq!(dto.status, "active");
            }
            other => panic!("expected already active, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn gateway_failure_writes_no_record() {
        let user_id = Uuid::new_v4();

        let mut payment_repo = MockPaymentRepository::new();
        expect_status_lookup(&mut payment_repo, PaymentStatus::Active, None);
        expect_status_lookup(&mut payment_repo, PaymentStatus::Created, None);
        payment_repo.expect_insert().never();

        let mut gateway = MockRazorpayGateway::new();
        gateway.expect_fetch_plan().returning(|_| Ok(plan()));
        gateway
            .expect_create_subscription()
            .returning(|_, _| Err(anyhow::anyhow!("502 from razorpay")));

        let err = use_case(payment_repo, gateway)
            .create_subscription_at(user_id, Some("plan_custom".to_string()), now())
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::Gateway(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn status_reports_none_without_records() {
        let user_id = Uuid::new_v4();

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_find_latest_by_user()
            .with(eq(user_id))
            .returning(|_| Ok(None));

        let status = use_case(payment_repo, MockRazorpayGateway::new())
            .get_status_at(user_id, now())
            .await
            .unwrap();

        assert_eq!(status, SubscriptionStatusDto::none());
    }

    #[tokio::test]
    async fn status_rounds_remaining_time_up() {
        let user_id = Uuid::new_v4();
        let mut active = record(user_id, PaymentStatus::Active, now() - Duration::days(1));
        active.current_end = Some(now() + Duration::hours(25));

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_find_latest_by_user()
            .returning(move |_| Ok(Some(active.clone())));
        payment_repo.expect_expire_if_active().never();

        let status = use_case(payment_repo, MockRazorpayGateway::new())
            .get_status_at(user_id, now())
            .await
            .unwrap();

        assert_eq!(status.status, SubscriptionState::Active);
        assert_eq!(status.days_remaining, Some(2));
        assert_eq!(status.hours_remaining, Some(25));
    }

    #[tokio::test]
    async fn status_flips_lapsed_active_record() {
        let user_id = Uuid::new_v4();
        let mut active = record(user_id, PaymentStatus::Active, now() - Duration::days(30));
        active.current_end = Some(now() - Duration::seconds(1));
        let active_id = active.id;

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_find_latest_by_user()
            .returning(move |_| Ok(Some(active.clone())));
        payment_repo
            .expect_expire_if_active()
            .with(eq(active_id), eq(now()))
            .times(1)
            .returning(|_, _| Ok(None));

        let status = use_case(payment_repo, MockRazorpayGateway::new())
            .get_status_at(user_id, now())
            .await
            .unwrap();

        assert_eq!(status.status, SubscriptionState::Expired);
        assert_eq!(status.days_remaining, Some(0));
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_internal() {
        let user_id = Uuid::new_v4();

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_find_latest_by_user()
            .returning(|_| Err(anyhow::anyhow!("connection refused")));

        let err = use_case(payment_repo, MockRazorpayGateway::new())
            .get_status_at(user_id, now())
            .await
            .unwrap_err();

        assert_eq!(
            err.status_code(),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn history_annotates_only_active_records() {
        let user_id = Uuid::new_v4();
        let mut active = record(user_id, PaymentStatus::Active, now() - Duration::days(3));
        active.current_end = Some(now() - Duration::hours(1));
        let captured_only = record(user_id, PaymentStatus::Active, now() - Duration::days(4));
        let failed = record(user_id, PaymentStatus::Failed, now() - Duration::days(5));

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo.expect_list_by_user().returning(move |_| {
            Ok(vec![active.clone(), captured_only.clone(), failed.clone()])
        });
        payment_repo.expect_expire_if_active().never();

        let history = use_case(payment_repo, MockRazorpayGateway::new())
            .get_history_at(user_id, now())
            .await
            .unwrap();

        assert_eq!(history.len(), 3);
        assert_eq!(history[0].days_remaining, Some(0));
        assert_eq!(history[0].status, "active");
        assert_eq!(history[1].hours_remaining, Some(0));
        assert_eq!(history[1].status, "active");
        assert_eq!(history[2].days_remaining, None);
    }

    #[tokio::test]
    async fn create_plan_fills_pro_defaults() {
        let mut gateway = MockRazorpayGateway::new();
        gateway
            .expect_create_plan()
            .withf(|plan| {
                plan.period == "monthly"
                    && plan.interval == 1
                    && plan.item.name == DEFAULT_PLAN_NAME
                    && plan.item.amount == 199_900
                    && plan.item.currency == "INR"
            })
            .times(1)
            .returning(|_| Ok(plan()));

        let created = use_case(MockPaymentRepository::new(), gateway)
            .create_plan(CreatePlanRequest {
                name: None,
                description: None,
                amount: None,
                currency: None,
                period: None,
                interval: None,
            })
            .await
            .unwrap();

        assert_eq!(created.id, PLAN_ID);
    }

    #[tokio::test]
    async fn create_plan_rejects_unknown_period() {
        let mut gateway = MockRazorpayGateway::new();
        gateway.expect_create_plan().never();

        let err = use_case(MockPaymentRepository::new(), gateway)
            .create_plan(CreatePlanRequest {
                name: None,
                description: None,
                amount: Some(1000),
                currency: None,
                period: Some("hourly".to_string()),
                interval: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::InvalidPlan(_)));
    }
}
