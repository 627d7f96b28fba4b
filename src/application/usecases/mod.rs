pub mod custom_urls;
pub mod subscription_webhook;
pub mod subscriptions;
