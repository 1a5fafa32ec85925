use crate::{abstract_trait::RateLimitMiddlewareTrait, config::RateLimitConfig};
use async_trait::async_trait;
use deadpool_redis::{Connection, Pool};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::time::Instant;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started: Instant,
}

/// Single-instance limiter; counters live in this process only.
#[derive(Debug)]
pub struct InMemoryRateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<String, Window>>,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    fn window_len(&self) -> Duration {
        Duration::from_secs(u64::from(self.config.window_seconds))
    }
}

#[async_trait]
impl RateLimitMiddlewareTrait for InMemoryRateLimiter {
    async fn check_rate_limit(&self, key: &str) -> (bool, u32) {
        let now = Instant::now();
        let window_len = self.window_len();
        let mut windows = self.windows.lock();

        windows.retain(|_, w| now.duration_since(w.started) < window_len);

        let window = windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            started: now,
        });
        window.count += 1;

        let allowed = window.count <= self.config.max_requests;
        if !allowed {
            debug!("Rate limit exceeded for key: {key}");
        }

        (allowed, window.count)
    }

    async fn get_remaining(&self, key: &str) -> u32 {
        let now = Instant::now();
        let window_len = self.window_len();

        let current = self
            .windows
            .lock()
            .get(key)
            .filter(|w| now.duration_since(w.started) < window_len)
            .map(|w| w.count)
            .unwrap_or(0);

        self.config.max_requests.saturating_sub(current)
    }

    async fn reset_limit(&self, key: &str) -> bool {
        self.windows.lock().remove(key).is_some()
    }
}

/// Limiter shared by every instance through Redis `INCR` + `EXPIRE`.
#[derive(Clone)]
pub struct RedisRateLimiter {
    pool: Arc<Pool>,
    config: RateLimitConfig,
}

impl RedisRateLimiter {
    pub fn new(pool: Pool, config: RateLimitConfig) -> Self {
        Self {
            pool: Arc::new(pool),
            config,
        }
    }

    async fn get_conn(&self) -> Option<Connection> {
        match self.pool.get().await {
            Ok(conn) => Some(conn),
            Err(e) => {
                error!("Failed to get Redis pooled connection: {:?}", e);
                None
            }
        }
    }
}

#[async_trait]
impl RateLimitMiddlewareTrait for RedisRateLimiter {
    async fn check_rate_limit(&self, key: &str) -> (bool, u32) {
        let Some(mut conn) = self.get_conn().await else {
            // Fail open: a Redis outage must not take the API down with it.
            return (true, 0);
        };

        let result: redis::RedisResult<(u32,)> = redis::pipe()
            .atomic()
            .cmd("INCR")
            .arg(key)
            .cmd("EXPIRE")
            .arg(key)
            .arg(self.config.window_seconds)
            .arg("NX")
            .ignore()
            .query_async(&mut conn)
            .await;

        match result {
            Ok((current,)) => {
                if current > self.config.max_requests {
                    debug!("Rate limit exceeded for key: {key}");
                    (false, current)
                } else {
                    (true, current)
                }
            }
            Err(e) => {
                error!("Rate limit pipeline failed for key {key}: {:?}", e);
                (true, 0)
            }
        }
    }

    async fn get_remaining(&self, key: &str) -> u32 {
        let Some(mut conn) = self.get_conn().await else {
            return 0;
        };

        let current: u32 = redis::cmd("GET")
            .arg(key)
            .query_async::<Option<u32>>(&mut conn)
            .await
            .ok()
            .flatten()
            .unwrap_or(0);

        self.config.max_requests.saturating_sub(current)
    }

    async fn reset_limit(&self, key: &str) -> bool {
        match self.get_conn().await {
            Some(mut conn) => redis::cmd("DEL")
                .arg(key)
                .query_async::<()>(&mut conn)
                .await
                .is_ok(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_seconds: u32) -> InMemoryRateLimiter {
        InMemoryRateLimiter::new(RateLimitConfig {
            max_requests,
            window_seconds,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn blocks_after_max_requests_in_window() {
        let limiter = limiter(3, 60);

        for expected in 1..=3 {
            assert_eq!(limiter.check_rate_limit("ip:1").await, (true, expected));
        }

        assert_eq!(limiter.check_rate_limit("ip:1").await, (false, 4));
        assert_eq!(limiter.get_remaining("ip:1").await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn keys_are_counted_independently() {
        let limiter = limiter(1, 60);

        assert!(limiter.check_rate_limit("ip:1").await.0);
        assert!(!limiter.check_rate_limit("ip:1").await.0);
        assert!(limiter.check_rate_limit("ip:2").await.0);
    }

    #[tokio::test(start_paused = true)]
    async fn window_expiry_resets_the_counter() {
        let limiter = limiter(1, 60);

        assert!(limiter.check_rate_limit("ip:1").await.0);
        assert!(!limiter.check_rate_limit("ip:1").await.0);

        tokio::time::advance(Duration::from_secs(61)).await;

        assert_eq!(limiter.check_rate_limit("ip:1").await, (true, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_clears_the_key() {
        let limiter = limiter(2, 60);

        limiter.check_rate_limit("ip:1").await;
        assert_eq!(limiter.get_remaining("ip:1").await, 1);

        assert!(limiter.reset_limit("ip:1").await);
        assert_eq!(limiter.get_remaining("ip:1").await, 2);
        assert!(!limiter.reset_limit("ip:1").await);
    }
}
