use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::domain::{
    error::SubscriptionError,
    repositories::{subscription_cache::SubscriptionCache, subscriptions::SubscriptionRepository},
    value_objects::{
        month::YearMonth,
        subscriptions::{Pagination, SubscriptionFilter, SubscriptionModel},
    },
};
use crate::usecases::subscriptions::SubscriptionUseCase;

/// How open-ended subscriptions take part in the deduplicated sum: an
/// unbounded month range cannot be walked, so a record without an end date
/// either contributes nothing or is billed through the given month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenEndedPolicy {
    Skip,
    CountThrough(YearMonth),
}

/// Computes total spend over matching subscriptions on a calendar-month
/// grid. Overlapping records for the same user and service never bill the
/// same month twice; when they disagree on price, the most recently created
/// record wins.
pub struct SpendAggregationUseCase<R, C>
where
    R: SubscriptionRepository + Send + Sync + 'static,
    C: SubscriptionCache + Send + Sync + 'static,
{
    subscription_usecase: Arc<SubscriptionUseCase<R, C>>,
    open_ended_policy: OpenEndedPolicy,
}

impl<R, C> SpendAggregationUseCase<R, C>
where
    R: SubscriptionRepository + Send + Sync + 'static,
    C: SubscriptionCache + Send + Sync + 'static,
{
    pub fn new(
        subscription_usecase: Arc<SubscriptionUseCase<R, C>>,
        open_ended_policy: OpenEndedPolicy,
    ) -> Self {
        Self {
            subscription_usecase,
            open_ended_policy,
        }
    }

    pub async fn sum_monthly_spend(
        &self,
        filter: &SubscriptionFilter,
    ) -> Result<i64, SubscriptionError> {
        let subscriptions = self
            .subscription_usecase
            .list(filter, &Pagination::default())
            .await?;

        let mut seen: HashSet<(String, String, YearMonth)> = HashSet::new();
        let mut total: i64 = 0;

        // list() is ordered by id ascending; walking it in reverse lets the
        // newest record claim a contested month
        for subscription in subscriptions.iter().rev() {
            let Some(end_month) = self.effective_end(subscription) else {
                continue;
            };

            if !overlaps_window(subscription.start_date, end_month, filter) {
                continue;
            }

            for billed_month in subscription.start_date.months_through(end_month) {
                let key = (
                    subscription.user_id.clone(),
                    subscription.service_name.clone(),
                    billed_month,
                );

                if seen.insert(key) {
                    total += i64::from(subscription.price);
                }
            }
        }

        debug!(
            total,
            candidates = subscriptions.len(),
            "spend_aggregation: monthly spend computed"
        );
        Ok(total)
    }

    fn effective_end(&self, subscription: &SubscriptionModel) -> Option<YearMonth> {
        match (subscription.end_date, self.open_ended_policy) {
            (Some(end_date), _) => Some(end_date),
            (None, OpenEndedPolicy::CountThrough(month)) => Some(month),
            (None, OpenEndedPolicy::Skip) => None,
        }
    }
}

fn overlaps_window(start: YearMonth, end: YearMonth, filter: &SubscriptionFilter) -> bool {
    if let Some(max_start_date) = filter.max_start_date {
        if max_start_date > end {
            return false;
        }
    }

    if let Some(min_end_date) = filter.min_end_date {
        if min_end_date < start {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use crate::domain::value_objects::subscriptions::InsertSubscriptionModel;
    use crate::infrastructure::in_memory::{
        subscription_cache::InMemorySubscriptionCache,
        subscriptions::InMemorySubscriptionRepository,
    };

    fn month(month: u32, year: i32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn usecase() -> Arc<SubscriptionUseCase<InMemorySubscriptionRepository, InMemorySubscriptionCache>>
    {
        Arc::new(SubscriptionUseCase::new(
            Arc::new(InMemorySubscriptionRepository::new()),
            Arc::new(InMemorySubscriptionCache::new(Duration::from_secs(180))),
        ))
    }

    async fn create(
        usecase: &SubscriptionUseCase<InMemorySubscriptionRepository, InMemorySubscriptionCache>,
        service_name: &str,
        user_id: &str,
        price: i32,
        start_date: YearMonth,
        end_date: Option<YearMonth>,
    ) {
        usecase
            .create(InsertSubscriptionModel {
                service_name: service_name.to_string(),
                price,
                user_id: user_id.to_string(),
                start_date,
                end_date,
            })
            .await
            .unwrap();
    }

    fn user_filter(user_id: &str, service_name: &str) -> SubscriptionFilter {
        SubscriptionFilter {
            user_id: Some(user_id.to_string()),
            service_name: Some(service_name.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn repriced_month_is_counted_once_at_the_newest_price() {
        let subscription_usecase = usecase();
        create(
            &subscription_usecase,
            "X",
            "u1",
            100,
            month(1, 2025),
            Some(month(3, 2025)),
        )
        .await;
        create(
            &subscription_usecase,
            "X",
            "u1",
            150,
            month(3, 2025),
            Some(month(3, 2025)),
        )
        .await;

        let aggregator =
            SpendAggregationUseCase::new(Arc::clone(&subscription_usecase), OpenEndedPolicy::Skip);

        // January and February at 100, March once at the re-priced 150
        let total = aggregator
            .sum_monthly_spend(&user_filter("u1", "X"))
            .await
            .unwrap();
        assert_eq!(total, 350);
    }

    #[tokio::test]
    async fn result_is_deterministic_across_reruns() {
        let subscription_usecase = usecase();
        create(
            &subscription_usecase,
            "X",
            "u1",
            100,
            month(1, 2025),
            Some(month(3, 2025)),
        )
        .await;
        create(
            &subscription_usecase,
            "X",
            "u1",
            150,
            month(3, 2025),
            Some(month(3, 2025)),
        )
        .await;

        let aggregator =
            SpendAggregationUseCase::new(Arc::clone(&subscription_usecase), OpenEndedPolicy::Skip);

        let first = aggregator
            .sum_monthly_spend(&user_filter("u1", "X"))
            .await
            .unwrap();
        let second = aggregator
            .sum_monthly_spend(&user_filter("u1", "X"))
            .await
            .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn separate_users_and_services_do_not_share_months() {
        let subscription_usecase = usecase();
        create(
            &subscription_usecase,
            "X",
            "u1",
            100,
            month(1, 2025),
            Some(month(2, 2025)),
        )
        .await;
        create(
            &subscription_usecase,
            "Y",
            "u1",
            50,
            month(1, 2025),
            Some(month(2, 2025)),
        )
        .await;
        create(
            &subscription_usecase,
            "X",
            "u2",
            70,
            month(1, 2025),
            Some(month(1, 2025)),
        )
        .await;

        let aggregator =
            SpendAggregationUseCase::new(Arc::clone(&subscription_usecase), OpenEndedPolicy::Skip);

        let total = aggregator
            .sum_monthly_spend(&SubscriptionFilter::default())
            .await
            .unwrap();

        assert_eq!(total, 100 * 2 + 50 * 2 + 70);
    }

    #[tokio::test]
    async fn open_ended_records_are_skipped_under_the_skip_policy() {
        let subscription_usecase = usecase();
        create(&subscription_usecase, "X", "u1", 100, month(1, 2025), None).await;
        create(
            &subscription_usecase,
            "X",
            "u1",
            200,
            month(1, 2025),
            Some(month(2, 2025)),
        )
        .await;

        let aggregator =
            SpendAggregationUseCase::new(Arc::clone(&subscription_usecase), OpenEndedPolicy::Skip);

        let total = aggregator
            .sum_monthly_spend(&user_filter("u1", "X"))
            .await
            .unwrap();

        assert_eq!(total, 400);
    }

    #[tokio::test]
    async fn open_ended_records_bill_through_the_configured_month() {
        let subscription_usecase = usecase();
        create(&subscription_usecase, "X", "u1", 100, month(2, 2025), None).await;

        let aggregator = SpendAggregationUseCase::new(
            Arc::clone(&subscription_usecase),
            OpenEndedPolicy::CountThrough(month(4, 2025)),
        );

        // February, March, April
        let total = aggregator
            .sum_monthly_spend(&user_filter("u1", "X"))
            .await
            .unwrap();

        assert_eq!(total, 300);
    }

    #[tokio::test]
    async fn records_outside_the_query_window_contribute_nothing() {
        let subscription_usecase = usecase();
        create(
            &subscription_usecase,
            "X",
            "u1",
            100,
            month(1, 2025),
            Some(month(3, 2025)),
        )
        .await;

        let aggregator =
            SpendAggregationUseCase::new(Arc::clone(&subscription_usecase), OpenEndedPolicy::Skip);

        let filter = SubscriptionFilter {
            user_id: Some("u1".to_string()),
            max_start_date: Some(month(5, 2025)),
            ..Default::default()
        };

        let total = aggregator.sum_monthly_spend(&filter).await.unwrap();

        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn empty_match_sums_to_zero() {
        let subscription_usecase = usecase();

        let aggregator =
            SpendAggregationUseCase::new(Arc::clone(&subscription_usecase), OpenEndedPolicy::Skip);

        let total = aggregator
            .sum_monthly_spend(&user_filter("nobody", "X"))
            .await
            .unwrap();

        assert_eq!(total, 0);
    }
}
