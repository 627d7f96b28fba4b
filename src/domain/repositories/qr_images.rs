use anyhow::Result;
use axum::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::qr_images::{LogoImageEntity, QrImageEntity};

#[automock]
#[async_trait]
pub trait QrImageRepository {
    async fn find_by_random_id(&self, random_id: &str) -> Result<Option<QrImageEntity>>;
    async fn find_logo_by_user(&self, user_id: Uuid) -> Result<Option<LogoImageEntity>>;
}
