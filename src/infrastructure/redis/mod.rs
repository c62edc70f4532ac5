pub mod redis_connection;
pub mod subscription_cache;
