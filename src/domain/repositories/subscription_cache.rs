use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::subscriptions::SubscriptionModel;

/// Time-bounded by-id copy of subscription records. Never authoritative:
/// callers treat every error and every miss as "go ask durable storage",
/// and a "not found" result is never stored here.
#[async_trait]
#[automock]
pub trait SubscriptionCache {
    async fn get(&self, id: i64) -> Result<Option<SubscriptionModel>>;

    async fn set(&self, subscription: &SubscriptionModel) -> Result<()>;

    async fn delete(&self, id: i64) -> Result<()>;
}
