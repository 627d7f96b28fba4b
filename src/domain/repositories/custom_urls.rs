use anyhow::Result;
use axum::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::custom_urls::{
    CustomUrlEntity, InsertCustomUrlEntity, UpdateCustomUrlEntity,
};

#[automock]
#[async_trait]
pub trait CustomUrlRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<CustomUrlEntity>>;
    async fn insert(&self, insert_custom_url_entity: InsertCustomUrlEntity)
    -> Result<CustomUrlEntity>;
    async fn update_by_user(
        &self,
        user_id: Uuid,
        update_custom_url_entity: UpdateCustomUrlEntity,
    ) -> Result<Option<CustomUrlEntity>>;
    /// Returns whether a row was removed.
    async fn delete_by_user(&self, user_id: Uuid) -> Result<bool>;
}
