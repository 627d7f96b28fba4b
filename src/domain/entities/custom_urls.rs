use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::custom_urls;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = custom_urls)]
pub struct CustomUrlEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub url: String,
    pub redirect_from_rating: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = custom_urls)]
pub struct InsertCustomUrlEntity {
    pub user_id: Uuid,
    pub company_name: String,
    pub url: String,
    pub redirect_from_rating: i32,
}

#[derive(Debug, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = custom_urls)]
pub struct UpdateCustomUrlEntity {
    pub company_name: String,
    pub url: String,
    pub redirect_from_rating: Option<i32>,
    pub updated_at: DateTime<Utc>,
}
