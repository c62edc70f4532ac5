use anyhow::Result;
use redis::aio::ConnectionManager;

pub async fn establish_connection(redis_url: &str) -> Result<ConnectionManager> {
    let client = redis::Client::open(redis_url)?;
    let connection = ConnectionManager::new(client).await?;
    Ok(connection)
}
