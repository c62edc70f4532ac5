use anyhow::Result;
use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};

use crate::domain::repositories::subscription_cache::SubscriptionCache;
use crate::domain::value_objects::subscriptions::SubscriptionModel;

pub const CACHE_TTL_SECONDS: u64 = 180;

fn cache_key(id: i64) -> String {
    format!("sub:{}", id)
}

pub struct RedisSubscriptionCache {
    connection: ConnectionManager,
}

impl RedisSubscriptionCache {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl SubscriptionCache for RedisSubscriptionCache {
    async fn get(&self, id: i64) -> Result<Option<SubscriptionModel>> {
        let mut connection = self.connection.clone();

        let payload: Option<String> = connection.get(cache_key(id)).await?;

        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, subscription: &SubscriptionModel) -> Result<()> {
        let mut connection = self.connection.clone();

        let payload = serde_json::to_string(subscription)?;
        let _: () = connection
            .set_ex(cache_key(subscription.id), payload, CACHE_TTL_SECONDS)
            .await?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut connection = self.connection.clone();

        let _: () = connection.del(cache_key(id)).await?;

        Ok(())
    }
}
