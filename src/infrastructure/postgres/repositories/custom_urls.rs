use anyhow::Result;
use axum::async_trait;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::custom_urls::{CustomUrlEntity, InsertCustomUrlEntity, UpdateCustomUrlEntity},
        repositories::custom_urls::CustomUrlRepository,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::custom_urls},
};

pub struct CustomUrlPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CustomUrlPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CustomUrlRepository for CustomUrlPostgres {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<CustomUrlEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = custom_urls::table
            .filter(custom_urls::user_id.eq(user_id))
            .select(CustomUrlEntity::as_select())
            .first::<CustomUrlEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn insert(
        &self,
        insert_custom_url_entity: InsertCustomUrlEntity,
    ) -> Result<CustomUrlEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(custom_urls::table)
            .values(&insert_custom_url_entity)
            .returning(CustomUrlEntity::as_returning())
            .get_result::<CustomUrlEntity>(&mut conn)?;

        Ok(result)
    }

    async fn update_by_user(
        &self,
        user_id: Uuid,
        update_custom_url_entity: UpdateCustomUrlEntity,
    ) -> Result<Option<CustomUrlEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(custom_urls::table)
            .filter(custom_urls::user_id.eq(user_id))
            .set(&update_custom_url_entity)
            .returning(CustomUrlEntity::as_returning())
            .get_result::<CustomUrlEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn delete_by_user(&self, user_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = delete(custom_urls::table)
            .filter(custom_urls::user_id.eq(user_id))
            .execute(&mut conn)?;

        Ok(deleted > 0)
    }
}
