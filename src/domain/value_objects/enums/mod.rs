pub mod payment_statuses;
pub mod payment_types;
pub mod subscription_states;
