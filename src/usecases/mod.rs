pub mod spend_aggregation;
pub mod subscriptions;
