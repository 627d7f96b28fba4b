use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::{logo_images, qr_images};

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = qr_images)]
pub struct QrImageEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub s3_key: String,
    pub random_id: String,
    pub data: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = logo_images)]
pub struct LogoImageEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub logo_url: String,
    pub s3_key: String,
    pub created_at: DateTime<Utc>,
}
