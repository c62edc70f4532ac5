use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use diesel::{dsl::sum, insert_into, prelude::*};

use crate::domain::entities::subscriptions::{
    InsertSubscriptionEntity, SubscriptionEntity, UpdateSubscriptionChanges,
};
use crate::domain::repositories::subscriptions::SubscriptionRepository;
use crate::domain::value_objects::subscriptions::{Pagination, SubscriptionFilter};
use crate::infrastructure::postgres::{postgres_connection::PgPool, schema::subscriptions};

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPool>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPool>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn find_by_id(&self, id: i64) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = subscriptions::table
            .find(id)
            .select(SubscriptionEntity::as_select())
            .first::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list(
        &self,
        filter: &SubscriptionFilter,
        pagination: &Pagination,
    ) -> Result<Vec<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = subscriptions::table
            .select(SubscriptionEntity::as_select())
            .into_boxed();

        if let Some(user_id) = &filter.user_id {
            query = query.filter(subscriptions::user_id.eq(user_id.clone()));
        }

        if let Some(service_name) = &filter.service_name {
            query = query.filter(subscriptions::service_name.eq(service_name.clone()));
        }

        if let Some(max_start_date) = filter.max_start_date {
            query = query.filter(subscriptions::start_date.le(max_start_date.first_day()));
        }

        if let Some(min_end_date) = filter.min_end_date {
            query = query.filter(
                subscriptions::end_date
                    .le(min_end_date.first_day())
                    .or(subscriptions::end_date.is_null()),
            );
        }

        query = query.order(subscriptions::id.asc());

        if let Some(offset) = pagination.offset {
            query = query.offset(offset);
        }

        if let Some(limit) = pagination.limit {
            query = query.limit(limit);
        }

        let results = query.load::<SubscriptionEntity>(&mut conn)?;

        Ok(results)
    }

    async fn sum_prices(&self, filter: &SubscriptionFilter) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = subscriptions::table.select(sum(subscriptions::price)).into_boxed();

        if let Some(user_id) = &filter.user_id {
            query = query.filter(subscriptions::user_id.eq(user_id.clone()));
        }

        if let Some(service_name) = &filter.service_name {
            query = query.filter(subscriptions::service_name.eq(service_name.clone()));
        }

        if let Some(max_start_date) = filter.max_start_date {
            query = query.filter(subscriptions::start_date.le(max_start_date.first_day()));
        }

        if let Some(min_end_date) = filter.min_end_date {
            query = query.filter(
                subscriptions::end_date
                    .le(min_end_date.first_day())
                    .or(subscriptions::end_date.is_null()),
            );
        }

        let total = query.first::<Option<i64>>(&mut conn)?;

        Ok(total.unwrap_or(0))
    }

    async fn create(&self, entity: InsertSubscriptionEntity) -> Result<SubscriptionEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(subscriptions::table)
            .values(&entity)
            .returning(SubscriptionEntity::as_returning())
            .get_result::<SubscriptionEntity>(&mut conn)?;

        Ok(result)
    }

    async fn update(
        &self,
        id: i64,
        changes: UpdateSubscriptionChanges,
    ) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = diesel::update(subscriptions::table.find(id))
            .set(&changes)
            .returning(SubscriptionEntity::as_returning())
            .get_result::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        diesel::delete(subscriptions::table.find(id)).execute(&mut conn)?;

        Ok(())
    }
}
