use chrono::NaiveDate;
use diesel::prelude::*;

use crate::infrastructure::postgres::schema::subscriptions;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = subscriptions)]
pub struct SubscriptionEntity {
    pub id: i64,
    pub service_name: String,
    pub price: i32,
    pub user_id: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = subscriptions)]
pub struct InsertSubscriptionEntity {
    pub service_name: String,
    pub price: i32,
    pub user_id: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Mutable fields of a subscription. `service_name` and `user_id` are fixed
/// at creation and have no counterpart here.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = subscriptions)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateSubscriptionChanges {
    pub price: i32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}
