use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::subscriptions::{
    InsertSubscriptionEntity, SubscriptionEntity, UpdateSubscriptionChanges,
};
use crate::domain::value_objects::subscriptions::{Pagination, SubscriptionFilter};

#[async_trait]
#[automock]
pub trait SubscriptionRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<SubscriptionEntity>>;

    /// Matching rows ordered by id ascending, so one call always sees a
    /// stable order.
    async fn list(
        &self,
        filter: &SubscriptionFilter,
        pagination: &Pagination,
    ) -> Result<Vec<SubscriptionEntity>>;

    /// Plain sum of `price` over matching rows, 0 when nothing matches.
    async fn sum_prices(&self, filter: &SubscriptionFilter) -> Result<i64>;

    async fn create(&self, entity: InsertSubscriptionEntity) -> Result<SubscriptionEntity>;

    /// `None` when no row with that id exists.
    async fn update(
        &self,
        id: i64,
        changes: UpdateSubscriptionChanges,
    ) -> Result<Option<SubscriptionEntity>>;

    /// Deleting an id with no matching row is not an error.
    async fn delete(&self, id: i64) -> Result<()>;
}
