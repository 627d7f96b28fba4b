use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::custom_urls::CustomUrlEntity,
    repositories::{
        custom_urls::CustomUrlRepository, payments::PaymentRepository,
        qr_images::QrImageRepository,
    },
    value_objects::custom_urls::{
        CustomUrlDto, CustomUrlRequest, CustomUrlValidationError, RedirectTargetDto,
        ValidCustomUrl,
    },
};

#[derive(Debug, Error)]
pub enum CustomUrlError {
    #[error(transparent)]
    Validation(#[from] CustomUrlValidationError),
    #[error("QR not found")]
    QrNotFound,
    #[error("No custom URL set for this QR")]
    NotSetForQr,
    #[error("No custom URL found")]
    NotFound,
    #[error("No custom URL set yet")]
    NotSetYet,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CustomUrlError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            CustomUrlError::Validation(_) => StatusCode::BAD_REQUEST,
            CustomUrlError::QrNotFound
            | CustomUrlError::NotSetForQr
            | CustomUrlError::NotFound
            | CustomUrlError::NotSetYet => StatusCode::NOT_FOUND,
            CustomUrlError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, CustomUrlError>;

pub struct CustomUrlUseCase<Url, Qr, Pay>
where
    Url: CustomUrlRepository + Send + Sync + 'static,
    Qr: QrImageRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
{
    custom_url_repo: Arc<Url>,
    qr_image_repo: Arc<Qr>,
    payment_repo: Arc<Pay>,
}

impl<Url, Qr, Pay> CustomUrlUseCase<Url, Qr, Pay>
where
    Url: CustomUrlRepository + Send + Sync + 'static,
    Qr: QrImageRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
{
    pub fn new(custom_url_repo: Arc<Url>, qr_image_repo: Arc<Qr>, payment_repo: Arc<Pay>) -> Self {
        Self {
            custom_url_repo,
            qr_image_repo,
            payment_repo,
        }
    }

    /// Point-in-time check: active subscription with `current_end > now`. Never flips state.
    pub async fn is_feature_enabled_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> UseCaseResult<bool> {
        self.payment_repo
            .has_active_subscription(user_id, now)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    db_error = ?err,
                    "custom urls: failed to evaluate subscription gate"
                );
                CustomUrlError::Internal(err)
            })
    }

    pub async fn resolve_for_qr(&self, qr_id: &str) -> UseCaseResult<RedirectTargetDto> {
        self.resolve_for_qr_at(qr_id, Utc::now()).await
    }

    pub async fn resolve_for_qr_at(
        &self,
        qr_id: &str,
        now: DateTime<Utc>,
    ) -> UseCaseResult<RedirectTargetDto> {
        let qr = self
            .qr_image_repo
            .find_by_random_id(qr_id)
            .await
            .map_err(|err| {
                error!(%qr_id, db_error = ?err, "custom urls: failed to load qr");
                CustomUrlError::Internal(err)
            })?
            .ok_or(CustomUrlError::QrNotFound)?;

        if !self.is_feature_enabled_at(qr.user_id, now).await? {
            info!(
                %qr_id,
                owner_id = %qr.user_id,
                "custom urls: owner subscription inactive, not serving custom url"
            );
            return Ok(RedirectTargetDto::inactive());
        }

        let custom_url = self
            .find_custom_url(qr.user_id)
            .await?
            .ok_or(CustomUrlError::NotSetForQr)?;
        let logo_url = self.find_logo_url(qr.user_id).await?;

        Ok(RedirectTargetDto::served(custom_url, logo_url))
    }

    pub async fn get_own(&self, user_id: Uuid) -> UseCaseResult<RedirectTargetDto> {
        let custom_url = self
            .find_custom_url(user_id)
            .await?
            .ok_or(CustomUrlError::NotSetYet)?;
        let logo_url = self.find_logo_url(user_id).await?;

        Ok(RedirectTargetDto::served(custom_url, logo_url))
    }

    /// Upsert. A missing rating keeps the stored one, or defaults on first save.
    pub async fn set(&self, user_id: Uuid, request: CustomUrlRequest) -> UseCaseResult<CustomUrlDto> {
        let valid = Self::validated(user_id, request)?;

        if self.find_custom_url(user_id).await?.is_some() {
            if let Some(updated) = self
                .custom_url_repo
                .update_by_user(user_id, valid.to_update_entity(Utc::now()))
                .await
                .map_err(|err| Self::store_error(user_id, "update", err))?
            {
                info!(%user_id, "custom urls: custom url updated");
                return Ok(updated.into());
            }
        }

        let created = self
            .custom_url_repo
            .insert(valid.to_insert_entity(user_id))
            .await
            .map_err(|err| Self::store_error(user_id, "insert", err))?;

        info!(%user_id, "custom urls: custom url created");
        Ok(created.into())
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        request: CustomUrlRequest,
    ) -> UseCaseResult<CustomUrlDto> {
        let valid = Self::validated(user_id, request)?;

        let updated = self
            .custom_url_repo
            .update_by_user(user_id, valid.to_update_entity(Utc::now()))
            .await
            .map_err(|err| Self::store_error(user_id, "update", err))?
            .ok_or(CustomUrlError::NotFound)?;

        info!(%user_id, "custom urls: custom url updated");
        Ok(updated.into())
    }

    pub async fn delete(&self, user_id: Uuid) -> UseCaseResult<()> {
        let deleted = self
            .custom_url_repo
            .delete_by_user(user_id)
            .await
            .map_err(|err| Self::store_error(user_id, "delete", err))?;

        if !deleted {
            return Err(CustomUrlError::NotFound);
        }

        info!(%user_id, "custom urls: custom url deleted");
        Ok(())
    }

    fn validated(
        user_id: Uuid,
        request: CustomUrlRequest,
    ) -> UseCaseResult<ValidCustomUrl> {
        request.validate().map_err(|err| {
            warn!(%user_id, reason = %err, "custom urls: invalid custom url request");
            CustomUrlError::Validation(err)
        })
    }

    async fn find_custom_url(
        &self,
        user_id: Uuid,
    ) -> UseCaseResult<Option<CustomUrlEntity>> {
        self.custom_url_repo
            .find_by_user(user_id)
            .await
            .map_err(|err| Self::store_error(user_id, "load", err))
    }

    async fn find_logo_url(&self, user_id: Uuid) -> UseCaseResult<Option<String>> {
        let logo = self
            .qr_image_repo
            .find_logo_by_user(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "custom urls: failed to load logo");
                CustomUrlError::Internal(err)
            })?;

        Ok(logo.map(|logo| logo.logo_url))
    }

    fn store_error(user_id: Uuid, action: &str, err: anyhow::Error) -> CustomUrlError {
        error!(
            %user_id,
            %action,
            db_error = ?err,
            "custom urls: custom url store operation failed"
        );
        CustomUrlError::Internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        entities::qr_images::{LogoImageEntity, QrImageEntity},
        repositories::{
            custom_urls::MockCustomUrlRepository, payments::MockPaymentRepository,
            qr_images::MockQrImageRepository,
        },
    };
    use chrono::{Duration, TimeZone};
    use mockall::predicate::eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn qr(owner: Uuid) -> QrImageEntity {
        QrImageEntity {
            id: Uuid::new_v4(),
            user_id: owner,
            image_url: "https://cdn.test/qr.png".to_string(),
            s3_key: "qr/abc.png".to_string(),
            random_id: "abc123".to_string(),
            data: "https://review.test/abc123".to_string(),
            created_at: now(),
        }
    }

    fn custom_url(owner: Uuid) -> CustomUrlEntity {
        CustomUrlEntity {
            id: Uuid::new_v4(),
            user_id: owner,
            company_name: "Acme".to_string(),
            url: "https://g.page/acme/review".to_string(),
            redirect_from_rating: 4,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn logo(owner: Uuid) -> LogoImageEntity {
        LogoImageEntity {
            id: Uuid::new_v4(),
            user_id: owner,
            logo_url: "https://cdn.test/logo.png".to_string(),
            s3_key: "logo/acme.png".to_string(),
            created_at: now(),
        }
    }

    fn use_case(
        urls: MockCustomUrlRepository,
        qrs: MockQrImageRepository,
        payments: MockPaymentRepository,
    ) -> CustomUrlUseCase<MockCustomUrlRepository, MockQrImageRepository, MockPaymentRepository>
    {
        CustomUrlUseCase::new(Arc::new(urls), Arc::new(qrs), Arc::new(payments))
    }

    #[tokio::test]
    async fn serves_custom_url_when_subscription_active() {
        let owner = Uuid::new_v4();

        let mut qrs = MockQrImageRepository::new();
        qrs.expect_find_by_random_id()
            .withf(|random_id| random_id == "abc123")
            .returning(move |_| Ok(Some(qr(owner))));
        qrs.expect_find_logo_by_user()
            .with(eq(owner))
            .returning(move |_| Ok(Some(logo(owner))));

        let mut payments = MockPaymentRepository::new();
        payments
            .expect_has_active_subscription()
            .with(eq(owner), eq(now()))
            .returning(|_, _| Ok(true));

        let mut urls = MockCustomUrlRepository::new();
        urls.expect_find_by_user()
            .with(eq(owner))
            .returning(move |_| Ok(Some(custom_url(owner))));

        let target = use_case(urls, qrs, payments)
            .resolve_for_qr_at("abc123", now())
            .await
            .unwrap();

        assert_eq!(target.url.as_deref(), Some("https://g.page/acme/review"));
        assert_eq!(target.redirect_from_rating, Some(4));
        assert_eq!(target.logo_url.as_deref(), Some("https://cdn.test/logo.png"));
        assert_eq!(target.message, None);
    }

    #[tokio::test]
    async fn inactive_owner_gets_explicit_inactive_result() {
        let owner = Uuid::new_v4();

        let mut qrs = MockQrImageRepository::new();
        qrs.expect_find_by_random_id()
            .returning(move |_| Ok(Some(qr(owner))));
        qrs.expect_find_logo_by_user().never();

        let mut payments = MockPaymentRepository::new();
        payments
            .expect_has_active_subscription()
            .returning(|_, _| Ok(false));

        let mut urls = MockCustomUrlRepository::new();
        urls.expect_find_by_user().never();

        let target = use_case(urls, qrs, payments)
            .resolve_for_qr_at("abc123", now())
            .await
            .unwrap();

        assert_eq!(target, RedirectTargetDto::inactive());
    }

    #[tokio::test]
    async fn unknown_qr_is_not_found() {
        let mut qrs = MockQrImageRepository::new();
        qrs.expect_find_by_random_id().returning(|_| Ok(None));

        let err = use_case(
            MockCustomUrlRepository::new(),
            qrs,
            MockPaymentRepository::new(),
        )
        .resolve_for_qr_at("missing", now())
        .await
        .unwrap_err();

        assert!(matches!(err, CustomUrlError::QrNotFound));
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn active_owner_without_custom_url_is_not_found() {
        let owner = Uuid::new_v4();

        let mut qrs = MockQrImageRepository::new();
        qrs.expect_find_by_random_id()
            .returning(move |_| Ok(Some(qr(owner))));

        let mut payments = MockPaymentRepository::new();
        payments
            .expect_has_active_subscription()
            .returning(|_, _| Ok(true));

        let mut urls = MockCustomUrlRepository::new();
        urls.expect_find_by_user().returning(|_| Ok(None));

        let err = use_case(urls, qrs, payments)
            .resolve_for_qr_at("abc123", now() + Duration::hours(1))
            .await
            .unwrap_err();

        assert!(matches!(err, CustomUrlError::NotSetForQr));
    }

    #[tokio::test]
    async fn set_creates_with_default_rating() {
        let user_id = Uuid::new_v4();

        let mut urls = MockCustomUrlRepository::new();
        urls.expect_find_by_user().returning(|_| Ok(None));
        urls.expect_update_by_user().never();
        urls.expect_insert()
            .withf(|insert| insert.redirect_from_rating == 3 && insert.company_name == "Acme")
            .times(1)
            .returning(move |insert| {
                let mut row = custom_url(insert.user_id);
                row.redirect_from_rating = insert.redirect_from_rating;
                Ok(row)
            });

        let dto = use_case(urls, MockQrImageRepository::new(), MockPaymentRepository::new())
            .set(
                user_id,
                CustomUrlRequest {
                    url: Some("https://g.page/acme/review".to_string()),
                    company_name: Some("Acme".to_string()),
                    redirect_from_rating: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(dto.redirect_from_rating, 3);
    }

    #[tokio::test]
    async fn invalid_rating_is_rejected_before_touching_store() {
        let mut urls = MockCustomUrlRepository::new();
        urls.expect_find_by_user().never();
        urls.expect_update_by_user().never();

        let err = use_case(urls, MockQrImageRepository::new(), MockPaymentRepository::new())
            .update(
                Uuid::new_v4(),
                CustomUrlRequest {
                    url: Some("https://g.page/acme/review".to_string()),
                    company_name: Some("Acme".to_string()),
                    redirect_from_rating: Some(9),
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "redirectFromRating must be between 1 to 5");
    }

    #[tokio::test]
    async fn delete_without_row_is_not_found() {
        let mut urls = MockCustomUrlRepository::new();
        urls.expect_delete_by_user().returning(|_| Ok(false));

        let err = use_case(urls, MockQrImageRepository::new(), MockPaymentRepository::new())
            .delete(Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, CustomUrlError::NotFound));
    }
}
