use crate::{
    di::{DependenciesInject, Repositories},
    repository::memory::InMemoryStore,
};
use anyhow::{Context, Result};
use prometheus_client::registry::Registry;
use shared::{
    abstract_trait::{DynJwtService, DynRateLimitMiddleware},
    cache::{InMemoryRateLimiter, RedisRateLimiter},
    config::{Config, ConnectionPool, JwtConfig, RateLimitConfig, RedisClient},
    utils::{SystemMetrics, run_metrics_collector},
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub jwt_config: DynJwtService,
    pub rate_limit: DynRateLimitMiddleware,
    pub di_container: DependenciesInject,
    pub registry: Arc<Mutex<Registry>>,
    pub system_metrics: Arc<SystemMetrics>,
}

impl AppState {
    pub async fn new(pool: ConnectionPool, config: &Config) -> Result<Self> {
        let rate_limit: DynRateLimitMiddleware = match &config.redis_url {
            Some(url) => {
                info!("Initializing Redis rate limiter");
                let redis = RedisClient::new(url).context("Failed to connect to Redis")?;
                redis.ping().await.context("Failed to ping Redis server")?;
                Arc::new(RedisRateLimiter::new(redis.pool, config.rate_limit))
            }
            None => {
                info!("REDIS_URL not set, rate limiting in process");
                Arc::new(InMemoryRateLimiter::new(config.rate_limit))
            }
        };

        let state = Self::build(
            Repositories::postgres(pool),
            &config.jwt_secret,
            rate_limit,
        );

        tokio::spawn(run_metrics_collector(state.system_metrics.clone()));

        Ok(state)
    }

    /// State backed by an `InMemoryStore`; no background collectors are spawned.
    pub fn in_memory(store: &InMemoryStore, jwt_secret: &str, rate_limit: RateLimitConfig) -> Self {
        Self::build(
            Repositories::in_memory(store),
            jwt_secret,
            Arc::new(InMemoryRateLimiter::new(rate_limit)),
        )
    }

    fn build(repos: Repositories, jwt_secret: &str, rate_limit: DynRateLimitMiddleware) -> Self {
        let jwt_config = Arc::new(JwtConfig::new(jwt_secret)) as DynJwtService;
        let mut registry = Registry::default();
        let system_metrics = Arc::new(SystemMetrics::new());

        let di_container = DependenciesInject::new(repos, &mut registry);
        system_metrics.register(&mut registry);

        Self {
            jwt_config,
            rate_limit,
            di_container,
            registry: Arc::new(Mutex::new(registry)),
            system_metrics,
        }
    }
}
