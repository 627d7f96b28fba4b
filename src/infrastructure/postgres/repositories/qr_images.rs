use anyhow::Result;
use axum::async_trait;
use diesel::{RunQueryDsl, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::qr_images::{LogoImageEntity, QrImageEntity},
        repositories::qr_images::QrImageRepository,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{logo_images, qr_images},
    },
};

pub struct QrImagePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl QrImagePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl QrImageRepository for QrImagePostgres {
    async fn find_by_random_id(&self, random_id: &str) -> Result<Option<QrImageEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = qr_images::table
            .filter(qr_images::random_id.eq(random_id))
            .select(QrImageEntity::as_select())
            .first::<QrImageEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_logo_by_user(&self, user_id: Uuid) -> Result<Option<LogoImageEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = logo_images::table
            .filter(logo_images::user_id.eq(user_id))
            .order(logo_images::created_at.desc())
            .select(LogoImageEntity::as_select())
            .first::<LogoImageEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}
