use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::custom_urls::{
    CustomUrlEntity, InsertCustomUrlEntity, UpdateCustomUrlEntity,
};

pub const DEFAULT_REDIRECT_FROM_RATING: i32 = 3;
pub const MIN_REDIRECT_FROM_RATING: i32 = 1;
pub const MAX_REDIRECT_FROM_RATING: i32 = 5;

/// Body of `set-url` and `update-url`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomUrlRequest {
    pub url: Option<String>,
    pub company_name: Option<String>,
    pub redirect_from_rating: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomUrlValidationError {
    #[error("URL is required")]
    MissingUrl,
    #[error("Company name is required")]
    MissingCompanyName,
    #[error("redirectFromRating must be between 1 to 5")]
    RatingOutOfRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCustomUrl {
    pub url: String,
    pub company_name: String,
    pub redirect_from_rating: Option<i32>,
}

impl CustomUrlRequest {
    pub fn validate(self) -> Result<ValidCustomUrl, CustomUrlValidationError> {
        let url = self
            .url
            .filter(|url| !url.trim().is_empty())
            .ok_or(CustomUrlValidationError::MissingUrl)?;
        let company_name = self
            .company_name
            .filter(|name| !name.trim().is_empty())
            .ok_or(CustomUrlValidationError::MissingCompanyName)?;

        if let Some(rating) = self.redirect_from_rating {
            if !(MIN_REDIRECT_FROM_RATING..=MAX_REDIRECT_FROM_RATING).contains(&rating) {
                return Err(CustomUrlValidationError::RatingOutOfRange);
            }
        }

        Ok(ValidCustomUrl {
            url,
            company_name,
            redirect_from_rating: self.redirect_from_rating,
        })
    }
}

impl ValidCustomUrl {
    pub fn to_insert_entity(&self, user_id: Uuid) -> InsertCustomUrlEntity {
        InsertCustomUrlEntity {
            user_id,
            company_name: self.company_name.clone(),
            url: self.url.clone(),
            redirect_from_rating: self
                .redirect_from_rating
                .unwrap_or(DEFAULT_REDIRECT_FROM_RATING),
        }
    }

    /// Leaves the stored rating untouched when none was sent.
    pub fn to_update_entity(&self, updated_at: chrono::DateTime<chrono::Utc>) -> UpdateCustomUrlEntity {
        UpdateCustomUrlEntity {
            company_name: self.company_name.clone(),
            url: self.url.clone(),
            redirect_from_rating: self.redirect_from_rating,
            updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomUrlDto {
    pub id: Uuid,
    pub url: String,
    pub company_name: String,
    pub redirect_from_rating: i32,
}

impl From<CustomUrlEntity> for CustomUrlDto {
    fn from(entity: CustomUrlEntity) -> Self {
        Self {
            id: entity.id,
            url: entity.url,
            company_name: entity.company_name,
            redirect_from_rating: entity.redirect_from_rating,
        }
    }
}

/// What a QR scan resolves to. Every field is null when the owner has no
/// current subscription, and `message` says so.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectTargetDto {
    pub url: Option<String>,
    pub company_name: Option<String>,
    pub redirect_from_rating: Option<i32>,
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RedirectTargetDto {
    pub const SUBSCRIPTION_INACTIVE: &'static str = "Subscription inactive";

    pub fn inactive() -> Self {
        Self {
            url: None,
            company_name: None,
            redirect_from_rating: None,
            logo_url: None,
            message: Some(Self::SUBSCRIPTION_INACTIVE.to_string()),
        }
    }

    pub fn served(custom_url: CustomUrlEntity, logo_url: Option<String>) -> Self {
        Self {
            url: Some(custom_url.url),
            company_name: Some(custom_url.company_name),
            redirect_from_rating: Some(custom_url.redirect_from_rating),
            logo_url,
            message: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str, company: &str, rating: Option<i32>) -> CustomUrlRequest {
        CustomUrlRequest {
            url: Some(url.to_string()),
            company_name: Some(company.to_string()),
            redirect_from_rating: rating,
        }
    }

    #[test]
    fn url_and_company_are_required() {
        let err = request("", "Acme", None).validate().unwrap_err();
        assert_eq!(err, CustomUrlValidationError::MissingUrl);

        let err = CustomUrlRequest {
            url: Some("https://acme.test".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, CustomUrlValidationError::MissingCompanyName);
    }

    #[test]
    fn rating_outside_one_to_five_is_rejected() {
        for rating in [0, 6, -1] {
            let err = request("https://acme.test", "Acme", Some(rating))
                .validate()
                .unwrap_err();
            assert_eq!(err, CustomUrlValidationError::RatingOutOfRange);
        }
        assert!(request("https://acme.test", "Acme", Some(5)).validate().is_ok());
    }

    #[test]
    fn new_rows_default_to_rating_three() {
        let valid = request("https://acme.test", "Acme", None).validate().unwrap();
        let user_id = Uuid::new_v4();

        let insert = valid.to_insert_entity(user_id);
        assert_eq!(insert.redirect_from_rating, DEFAULT_REDIRECT_FROM_RATING);
        assert_eq!(insert.user_id, user_id);

        let update = valid.to_update_entity(chrono::Utc::now());
        assert_eq!(update.redirect_from_rating, None);
    }

    #[test]
    fn inactive_target_serializes_nulls_and_message() {
        let value = serde_json::to_value(RedirectTargetDto::inactive()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "url": null,
                "companyName": null,
                "redirectFromRating": null,
                "logoUrl": null,
                "message": "Subscription inactive"
            })
        );
    }
}
