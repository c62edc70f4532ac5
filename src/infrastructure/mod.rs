#[cfg(any(test, feature = "test-utils"))]
pub mod in_memory;
pub mod postgres;
pub mod redis;
