use std::sync::Arc;

use anyhow::Result;
use subs_aggregator::axum_http::http_serve;
use subs_aggregator::config::config_loader;
use subs_aggregator::infrastructure::{
    postgres::postgres_connection, redis::redis_connection,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Server exited with error: {}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let dotenvy_env = config_loader::load()?;
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let redis_connection = redis_connection::establish_connection(&dotenvy_env.redis.url).await?;
    info!("Redis connection has been established");

    http_serve::start(Arc::new(dotenvy_env), Arc::new(postgres_pool), redis_connection).await?;

    Ok(())
}
