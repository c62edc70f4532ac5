pub mod subscription_cache;
pub mod subscriptions;
