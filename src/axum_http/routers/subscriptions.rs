use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use redis::aio::ConnectionManager;

use crate::axum_http::error_responses::AppError;
use crate::domain::{
    repositories::{subscription_cache::SubscriptionCache, subscriptions::SubscriptionRepository},
    value_objects::subscriptions::{
        InsertSubscriptionModel, ListSubscriptionsRequest, SubscriptionFilter,
        UpdateSubscriptionModel,
    },
};
use crate::infrastructure::{
    postgres::{postgres_connection::PgPool, repositories::subscriptions::SubscriptionPostgres},
    redis::subscription_cache::RedisSubscriptionCache,
};
use crate::usecases::{
    spend_aggregation::{OpenEndedPolicy, SpendAggregationUseCase},
    subscriptions::SubscriptionUseCase,
};

pub fn routes(db_pool: Arc<PgPool>, redis_connection: ConnectionManager) -> Router {
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let subscription_cache = RedisSubscriptionCache::new(redis_connection);
    let subscription_usecase = Arc::new(SubscriptionUseCase::new(
        Arc::new(subscription_repository),
        Arc::new(subscription_cache),
    ));
    let spend_aggregation_usecase =
        SpendAggregationUseCase::new(Arc::clone(&subscription_usecase), OpenEndedPolicy::Skip);

    let spend_routes = Router::new()
        .route("/monthly-spend", post(monthly_spend))
        .with_state(Arc::new(spend_aggregation_usecase));

    Router::new()
        .route("/", post(create))
        .route("/list", post(list))
        .route("/sum-price", post(sum_prices))
        .route("/:id", get(get_one))
        .route("/:id", put(update))
        .route("/:id", delete(remove))
        .with_state(subscription_usecase)
        .merge(spend_routes)
}

pub async fn create<R, C>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<R, C>>>,
    Json(insert_model): Json<InsertSubscriptionModel>,
) -> impl IntoResponse
where
    R: SubscriptionRepository + Send + Sync + 'static,
    C: SubscriptionCache + Send + Sync + 'static,
{
    match subscription_usecase.create(insert_model).await {
        Ok(subscription) => (StatusCode::CREATED, Json(subscription)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn list<R, C>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<R, C>>>,
    Json(request): Json<ListSubscriptionsRequest>,
) -> impl IntoResponse
where
    R: SubscriptionRepository + Send + Sync + 'static,
    C: SubscriptionCache + Send + Sync + 'static,
{
    match subscription_usecase
        .list(&request.filter, &request.pagination)
        .await
    {
        Ok(subscriptions) => (StatusCode::OK, Json(subscriptions)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn sum_prices<R, C>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<R, C>>>,
    Json(filter): Json<SubscriptionFilter>,
) -> impl IntoResponse
where
    R: SubscriptionRepository + Send + Sync + 'static,
    C: SubscriptionCache + Send + Sync + 'static,
{
    match subscription_usecase.sum_prices(&filter).await {
        Ok(total) => (StatusCode::OK, Json(total)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn monthly_spend<R, C>(
    State(spend_aggregation_usecase): State<Arc<SpendAggregationUseCase<R, C>>>,
    Json(filter): Json<SubscriptionFilter>,
) -> impl IntoResponse
where
    R: SubscriptionRepository + Send + Sync + 'static,
    C: SubscriptionCache + Send + Sync + 'static,
{
    match spend_aggregation_usecase.sum_monthly_spend(&filter).await {
        Ok(total) => (StatusCode::OK, Json(total)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn get_one<R, C>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<R, C>>>,
    Path(id): Path<i64>,
) -> impl IntoResponse
where
    R: SubscriptionRepository + Send + Sync + 'static,
    C: SubscriptionCache + Send + Sync + 'static,
{
    match subscription_usecase.get_one(id).await {
        Ok(subscription) => (StatusCode::OK, Json(subscription)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn update<R, C>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<R, C>>>,
    Path(id): Path<i64>,
    Json(update_model): Json<UpdateSubscriptionModel>,
) -> impl IntoResponse
where
    R: SubscriptionRepository + Send + Sync + 'static,
    C: SubscriptionCache + Send + Sync + 'static,
{
    match subscription_usecase.update(id, update_model).await {
        Ok(subscription) => (StatusCode::OK, Json(subscription)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn remove<R, C>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<R, C>>>,
    Path(id): Path<i64>,
) -> impl IntoResponse
where
    R: SubscriptionRepository + Send + Sync + 'static,
    C: SubscriptionCache + Send + Sync + 'static,
{
    match subscription_usecase.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}
