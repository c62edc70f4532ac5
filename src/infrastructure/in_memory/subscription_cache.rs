use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::repositories::subscription_cache::SubscriptionCache;
use crate::domain::value_objects::subscriptions::SubscriptionModel;

/// TTL-honoring stand-in for `RedisSubscriptionCache`.
pub struct InMemorySubscriptionCache {
    entries: Mutex<HashMap<i64, (SubscriptionModel, Instant)>>,
    ttl: Duration,
}

impl InMemorySubscriptionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.entries.lock().unwrap().contains_key(&id)
    }
}

#[async_trait]
impl SubscriptionCache for InMemorySubscriptionCache {
    async fn get(&self, id: i64) -> Result<Option<SubscriptionModel>> {
        let mut entries = self.entries.lock().unwrap();

        match entries.get(&id) {
            Some((subscription, inserted_at)) if inserted_at.elapsed() <= self.ttl => {
                Ok(Some(subscription.clone()))
            }
            Some(_) => {
                entries.remove(&id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, subscription: &SubscriptionModel) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(subscription.id, (subscription.clone(), Instant::now()));

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(&id);

        Ok(())
    }
}
