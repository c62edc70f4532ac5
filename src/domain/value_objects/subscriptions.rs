use serde::{Deserialize, Serialize};

use crate::domain::entities::subscriptions::{InsertSubscriptionEntity, SubscriptionEntity};
use crate::domain::value_objects::month::YearMonth;

/// A subscription as callers see it: month-granular dates, `end_date`
/// omitted while the subscription is still active.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionModel {
    pub id: i64,
    pub service_name: String,
    pub price: i32,
    pub user_id: String,
    pub start_date: YearMonth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<YearMonth>,
}

impl From<SubscriptionEntity> for SubscriptionModel {
    fn from(entity: SubscriptionEntity) -> Self {
        Self {
            id: entity.id,
            service_name: entity.service_name,
            price: entity.price,
            user_id: entity.user_id,
            start_date: YearMonth::from(entity.start_date),
            end_date: entity.end_date.map(YearMonth::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertSubscriptionModel {
    pub service_name: String,
    pub price: i32,
    pub user_id: String,
    pub start_date: YearMonth,
    #[serde(default)]
    pub end_date: Option<YearMonth>,
}

impl From<InsertSubscriptionModel> for InsertSubscriptionEntity {
    fn from(model: InsertSubscriptionModel) -> Self {
        Self {
            service_name: model.service_name,
            price: model.price,
            user_id: model.user_id,
            start_date: model.start_date.first_day(),
            end_date: model.end_date.map(|month| month.first_day()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSubscriptionModel {
    pub price: i32,
    pub start_date: YearMonth,
    #[serde(default)]
    pub end_date: Option<YearMonth>,
}

/// Filter shared by `list`, `sum_prices` and the spend aggregation. All
/// fields optional; bounds are inclusive and open-ended subscriptions
/// always pass the `min_end_date` check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionFilter {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub max_start_date: Option<YearMonth>,
    #[serde(default)]
    pub min_end_date: Option<YearMonth>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListSubscriptionsRequest {
    #[serde(flatten)]
    pub filter: SubscriptionFilter,
    #[serde(flatten)]
    pub pagination: Pagination,
}
