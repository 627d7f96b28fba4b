pub mod custom_urls;
pub mod enums;
pub mod razorpay_webhook;
pub mod subscriptions;
