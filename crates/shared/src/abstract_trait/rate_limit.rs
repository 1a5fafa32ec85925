use async_trait::async_trait;
use std::sync::Arc;

pub type DynRateLimitMiddleware = Arc<dyn RateLimitMiddlewareTrait + Send + Sync>;

/// Request counter keyed by client identity over a fixed time window.
#[async_trait]
pub trait RateLimitMiddlewareTrait {
    /// Counts one request for `key`. Returns whether it is allowed and the
    /// count inside the current window.
    async fn check_rate_limit(&self, key: &str) -> (bool, u32);
    async fn get_remaining(&self, key: &str) -> u32;
    async fn reset_limit(&self, key: &str) -> bool;
}
