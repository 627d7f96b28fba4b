use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde::Serialize;

use crate::{
    application::usecases::custom_urls::CustomUrlUseCase,
    domain::{
        repositories::{
            custom_urls::CustomUrlRepository, payments::PaymentRepository,
            qr_images::QrImageRepository,
        },
        value_objects::custom_urls::{CustomUrlDto, CustomUrlRequest, RedirectTargetDto},
    },
    infrastructure::{
        axum_http::auth::AuthUser,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{
                custom_urls::CustomUrlPostgres, payments::PaymentPostgres,
                qr_images::QrImagePostgres,
            },
        },
    },
};

#[derive(Debug, Serialize)]
struct DataResponse<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T: Serialize> DataResponse<T> {
    fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    fn saved(message: &'static str, data: T) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: Some(data),
        }
    }
}

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let usecase = CustomUrlUseCase::new(
        Arc::new(CustomUrlPostgres::new(Arc::clone(&db_pool))),
        Arc::new(QrImagePostgres::new(Arc::clone(&db_pool))),
        Arc::new(PaymentPostgres::new(Arc::clone(&db_pool))),
    );

    router(Arc::new(usecase))
}

pub fn router<Url, Qr, Pay>(usecase: Arc<CustomUrlUseCase<Url, Qr, Pay>>) -> Router
where
    Url: CustomUrlRepository + Send + Sync + 'static,
    Qr: QrImageRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/set-url", post(set_url::<Url, Qr, Pay>))
        .route("/update-url", put(update_url::<Url, Qr, Pay>))
        .route("/delete-url", delete(delete_url::<Url, Qr, Pay>))
        .route("/get-url", get(get_own_url::<Url, Qr, Pay>))
        .route("/get-url/:qr_id", get(get_url_for_qr::<Url, Qr, Pay>))
        .with_state(usecase)
}

/// Public: what a scanned QR should redirect to.
pub async fn get_url_for_qr<Url, Qr, Pay>(
    State(usecase): State<Arc<CustomUrlUseCase<Url, Qr, Pay>>>,
    Path(qr_id): Path<String>,
) -> Response
where
    Url: CustomUrlRepository + Send + Sync + 'static,
    Qr: QrImageRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
{
    match usecase.resolve_for_qr(&qr_id).await {
        Ok(target) => Json(DataResponse::<RedirectTargetDto>::data(target)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn get_own_url<Url, Qr, Pay>(
    State(usecase): State<Arc<CustomUrlUseCase<Url, Qr, Pay>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Response
where
    Url: CustomUrlRepository + Send + Sync + 'static,
    Qr: QrImageRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
{
    match usecase.get_own(user_id).await {
        Ok(target) => Json(DataResponse::<RedirectTargetDto>::data(target)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn set_url<Url, Qr, Pay>(
    State(usecase): State<Arc<CustomUrlUseCase<Url, Qr, Pay>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(request): Json<CustomUrlRequest>,
) -> Response
where
    Url: CustomUrlRepository + Send + Sync + 'static,
    Qr: QrImageRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
{
    match usecase.set(user_id, request).await {
        Ok(saved) => Json(DataResponse::<CustomUrlDto>::saved(
            "Custom URL & redirect setting saved successfully",
            saved,
        ))
        .into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn update_url<Url, Qr, Pay>(
    State(usecase): State<Arc<CustomUrlUseCase<Url, Qr, Pay>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(request): Json<CustomUrlRequest>,
) -> Response
where
    Url: CustomUrlRepository + Send + Sync + 'static,
    Qr: QrImageRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
{
    match usecase.update(user_id, request).await {
        Ok(updated) => Json(DataResponse::<CustomUrlDto>::saved(
            "Custom URL, Company Name & Redirect setting updated",
            updated,
        ))
        .into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn delete_url<Url, Qr, Pay>(
    State(usecase): State<Arc<CustomUrlUseCase<Url, Qr, Pay>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Response
where
    Url: CustomUrlRepository + Send + Sync + 'static,
    Qr: QrImageRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
{
    match usecase.delete(user_id).await {
        Ok(()) => Json(DataResponse::<()> {
            success: true,
            message: Some("Custom URL deleted successfully"),
            data: None,
        })
        .into_response(),
        Err(err) => err.into_response(),
    }
}
