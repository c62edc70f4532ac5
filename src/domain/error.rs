use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("subscription {0} not found")]
    NotFound(i64),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
