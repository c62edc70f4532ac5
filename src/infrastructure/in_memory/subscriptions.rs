use std::collections::HashMap;
use std::sync::{
    Mutex,
    atomic::{AtomicI64, Ordering},
};

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::entities::subscriptions::{
    InsertSubscriptionEntity, SubscriptionEntity, UpdateSubscriptionChanges,
};
use crate::domain::repositories::subscriptions::SubscriptionRepository;
use crate::domain::value_objects::subscriptions::{Pagination, SubscriptionFilter};

/// Map-backed stand-in for `SubscriptionPostgres`. Filter semantics must
/// stay in lockstep with the diesel implementation.
#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    rows: Mutex<HashMap<i64, SubscriptionEntity>>,
    next_id: AtomicI64,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(entity: &SubscriptionEntity, filter: &SubscriptionFilter) -> bool {
    if let Some(user_id) = &filter.user_id {
        if &entity.user_id != user_id {
            return false;
        }
    }

    if let Some(service_name) = &filter.service_name {
        if &entity.service_name != service_name {
            return false;
        }
    }

    if let Some(max_start_date) = filter.max_start_date {
        if entity.start_date > max_start_date.first_day() {
            return false;
        }
    }

    if let Some(min_end_date) = filter.min_end_date {
        // open-ended rows always pass this check
        if let Some(end_date) = entity.end_date {
            if end_date > min_end_date.first_day() {
                return false;
            }
        }
    }

    true
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<SubscriptionEntity>> {
        let rows = self.rows.lock().unwrap();

        Ok(rows.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &SubscriptionFilter,
        pagination: &Pagination,
    ) -> Result<Vec<SubscriptionEntity>> {
        let rows = self.rows.lock().unwrap();

        let mut results: Vec<SubscriptionEntity> = rows
            .values()
            .filter(|entity| matches(entity, filter))
            .cloned()
            .collect();
        results.sort_by_key(|entity| entity.id);

        let offset = pagination.offset.unwrap_or(0).max(0) as usize;
        let results = results.into_iter().skip(offset);

        let results = match pagination.limit {
            Some(limit) => results.take(limit.max(0) as usize).collect(),
            None => results.collect(),
        };

        Ok(results)
    }

    async fn sum_prices(&self, filter: &SubscriptionFilter) -> Result<i64> {
        let rows = self.rows.lock().unwrap();

        let total = rows
            .values()
            .filter(|entity| matches(entity, filter))
            .map(|entity| i64::from(entity.price))
            .sum();

        Ok(total)
    }

    async fn create(&self, entity: InsertSubscriptionEntity) -> Result<SubscriptionEntity> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;

        let entity = SubscriptionEntity {
            id,
            service_name: entity.service_name,
            price: entity.price,
            user_id: entity.user_id,
            start_date: entity.start_date,
            end_date: entity.end_date,
        };

        let mut rows = self.rows.lock().unwrap();
        rows.insert(id, entity.clone());

        Ok(entity)
    }

    async fn update(
        &self,
        id: i64,
        changes: UpdateSubscriptionChanges,
    ) -> Result<Option<SubscriptionEntity>> {
        let mut rows = self.rows.lock().unwrap();

        let Some(entity) = rows.get_mut(&id) else {
            return Ok(None);
        };

        entity.price = changes.price;
        entity.start_date = changes.start_date;
        entity.end_date = changes.end_date;

        Ok(Some(entity.clone()))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        rows.remove(&id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::value_objects::month::YearMonth;

    fn insert_entity(user_id: &str, start: (i32, u32), end: Option<(i32, u32)>) -> InsertSubscriptionEntity {
        InsertSubscriptionEntity {
            service_name: "Netflix".to_string(),
            price: 10,
            user_id: user_id.to_string(),
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, 1).unwrap(),
            end_date: end.map(|(year, month)| NaiveDate::from_ymd_opt(year, month, 1).unwrap()),
        }
    }

    #[tokio::test]
    async fn assigns_sequential_ids() {
        let repo = InMemorySubscriptionRepository::new();

        let first = repo.create(insert_entity("u1", (2025, 1), None)).await.unwrap();
        let second = repo.create(insert_entity("u1", (2025, 2), None)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn date_bounds_are_inclusive() {
        let repo = InMemorySubscriptionRepository::new();
        repo.create(insert_entity("u1", (2025, 3), Some((2025, 6))))
            .await
            .unwrap();

        let filter = SubscriptionFilter {
            max_start_date: YearMonth::new(2025, 3),
            min_end_date: YearMonth::new(2025, 6),
            ..Default::default()
        };

        let results = repo.list(&filter, &Pagination::default()).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn open_ended_rows_pass_the_min_end_date_check() {
        let repo = InMemorySubscriptionRepository::new();
        repo.create(insert_entity("u1", (2025, 1), None)).await.unwrap();
        repo.create(insert_entity("u1", (2025, 1), Some((2025, 12))))
            .await
            .unwrap();

        let filter = SubscriptionFilter {
            min_end_date: YearMonth::new(2025, 6),
            ..Default::default()
        };

        let results = repo.list(&filter, &Pagination::default()).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].end_date, None);
    }
}
