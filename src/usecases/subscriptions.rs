use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{
    entities::subscriptions::UpdateSubscriptionChanges,
    error::SubscriptionError,
    repositories::{subscription_cache::SubscriptionCache, subscriptions::SubscriptionRepository},
    value_objects::{
        month::YearMonth,
        subscriptions::{
            InsertSubscriptionModel, Pagination, SubscriptionFilter, SubscriptionModel,
            UpdateSubscriptionModel,
        },
    },
};


/// Owns subscription CRUD. Every by-id read goes through the cache first;
/// durable storage stays the single source of truth and cache failures are
/// never allowed to fail an operation.
pub struct SubscriptionUseCase<R, C>
where
    R: SubscriptionRepository + Send + Sync + 'static,
    C: SubscriptionCache + Send + Sync + 'static,
{
    subscription_repository: Arc<R>,
    subscription_cache: Arc<C>,
}

impl<R, C> SubscriptionUseCase<R, C>
where
    R: SubscriptionRepository + Send + Sync + 'static,
    C: SubscriptionCache + Send + Sync + 'static,
{
    pub fn new(subscription_repository: Arc<R>, subscription_cache: Arc<C>) -> Self {
        Self {
            subscription_repository,
            subscription_cache,
        }
    }

    pub async fn get_one(&self, id: i64) -> Result<SubscriptionModel, SubscriptionError> {
        match self.subscription_cache.get(id).await {
            Ok(Some(subscription)) => {
                info!(id, "subscriptions: served from cache");
                return Ok(subscription);
            }
            Ok(None) => {}
            Err(err) => {
                warn!(id, error = %err, "subscriptions: cache read failed, treating as miss");
            }
        }

        let entity = self
            .subscription_repository
            .find_by_id(id)
            .await?
            .ok_or(SubscriptionError::NotFound(id))?;

        let subscription = SubscriptionModel::from(entity);
        self.refresh_cache(&subscription).await;

        info!(id, "subscriptions: fetched from storage");
        Ok(subscription)
    }

    /// Always reads durable storage, never the cache.
    pub async fn list(
        &self,
        filter: &SubscriptionFilter,
        pagination: &Pagination,
    ) -> Result<Vec<SubscriptionModel>, SubscriptionError> {
        let entities = self.subscription_repository.list(filter, pagination).await?;

        Ok(entities.into_iter().map(SubscriptionModel::from).collect())
    }

    pub async fn sum_prices(&self, filter: &SubscriptionFilter) -> Result<i64, SubscriptionError> {
        let total = self.subscription_repository.sum_prices(filter).await?;

        info!(
            user_id = filter.user_id.as_deref().unwrap_or(""),
            service_name = filter.service_name.as_deref().unwrap_or(""),
            total,
            "subscriptions: summed prices"
        );
        Ok(total)
    }

    pub async fn create(
        &self,
        insert_model: InsertSubscriptionModel,
    ) -> Result<SubscriptionModel, SubscriptionError> {
        if insert_model.service_name.trim().is_empty() {
            return Err(SubscriptionError::Validation(
                "service_name must not be empty".to_string(),
            ));
        }
        validate_price(insert_model.price)?;
        validate_range(insert_model.start_date, insert_model.end_date)?;

        let entity = self.subscription_repository.create(insert_model.into()).await?;

        let subscription = SubscriptionModel::from(entity);
        self.refresh_cache(&subscription).await;

        info!(
            id = subscription.id,
            service_name = %subscription.service_name,
            user_id = %subscription.user_id,
            "subscriptions: created"
        );
        Ok(subscription)
    }

    /// Only price and the date range are mutable; `service_name` and
    /// `user_id` keep their creation-time values.
    pub async fn update(
        &self,
        id: i64,
        update_model: UpdateSubscriptionModel,
    ) -> Result<SubscriptionModel, SubscriptionError> {
        validate_price(update_model.price)?;
        validate_range(update_model.start_date, update_model.end_date)?;

        let changes = UpdateSubscriptionChanges {
            price: update_model.price,
            start_date: update_model.start_date.first_day(),
            end_date: update_model.end_date.map(|month| month.first_day()),
        };

        let entity = self
            .subscription_repository
            .update(id, changes)
            .await?
            .ok_or(SubscriptionError::NotFound(id))?;

        let subscription = SubscriptionModel::from(entity);
        self.refresh_cache(&subscription).await;

        info!(id, "subscriptions: updated");
        Ok(subscription)
    }

    pub async fn delete(&self, id: i64) -> Result<(), SubscriptionError> {
        let result = self.subscription_repository.delete(id).await;

        // eviction is attempted even when the durable delete failed
        if let Err(err) = self.subscription_cache.delete(id).await {
            warn!(id, error = %err, "subscriptions: cache eviction failed");
        }

        result?;

        info!(id, "subscriptions: deleted");
        Ok(())
    }

    async fn refresh_cache(&self, subscription: &SubscriptionModel) {
        if let Err(err) = self.subscription_cache.set(subscription).await {
            warn!(
                id = subscription.id,
                error = %err,
                "subscriptions: cache write failed"
            );
        }
    }
}

fn validate_price(price: i32) -> Result<(), SubscriptionError> {
    if price < 0 {
        return Err(SubscriptionError::Validation(
            "price must not be negative".to_string(),
        ));
    }

    Ok(())
}

fn validate_range(
    start_date: YearMonth,
    end_date: Option<YearMonth>,
) -> Result<(), SubscriptionError> {
    match end_date {
        Some(end_date) if end_date < start_date => Err(SubscriptionError::Validation(format!(
            "end date {} precedes start date {}",
            end_date, start_date
        ))),
        _ => Ok(()),
    }
}
