use async_trait::async_trait;
use coinlens_core::cache::port::{Cache, CacheExt};
use coinlens_core::common::CurrencyPair;
use coinlens_core::market::error::MarketError;
use coinlens_core::market::port::DigitalCurrencyProvider;
use coinlens_core::series::entity::RawDailyPayload;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// # Summary
/// 为任意数据源加上按交易对记忆的固定时长缓存，用于遵守上游限流。
///
/// # Invariants
/// - 缓存键为 `{provider}:daily:{SYMBOL}:{MARKET}`。
/// - 只缓存成功的载荷，错误永不缓存。
/// - 缓存读写失败只降级为直连上游，不会使请求失败。
/// - `ttl` 为零时完全旁路缓存。
pub struct CachedProvider {
    inner: Arc<dyn DigitalCurrencyProvider>,
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl CachedProvider {
    pub fn new(
        inner: Arc<dyn DigitalCurrencyProvider>,
        cache: Arc<dyn Cache>,
        ttl: Duration,
    ) -> Self {
        Self { inner, cache, ttl }
    }

    fn key(&self, pair: &CurrencyPair) -> String {
        format!("{}:daily:{}", self.inner.name(), pair.cache_key())
    }
}

#[async_trait]
impl DigitalCurrencyProvider for CachedProvider {
    /// # Logic
    /// 1. 命中未过期缓存则直接返回。
    /// 2. 否则请求内部数据源，成功后以 `ttl` 写回缓存。
    async fn fetch_daily(&self, pair: &CurrencyPair) -> Result<RawDailyPayload, MarketError> {
        if self.ttl.is_zero() {
            return self.inner.fetch_daily(pair).await;
        }

        let key = self.key(pair);
        match self.cache.get::<RawDailyPayload>(&key).await {
            Ok(Some(payload)) => {
                debug!("Cache hit: {}", key);
                return Ok(payload);
            }
            Ok(None) => debug!("Cache miss: {}", key),
            Err(e) => warn!("Cache read failed for {}: {}", key, e),
        }

        let payload = self.inner.fetch_daily(pair).await?;
        if let Err(e) = self.cache.set(&key, &payload, Some(self.ttl)).await {
            warn!("Cache write failed for {}: {}", key, e);
        }
        Ok(payload)
    }

    async fn invalidate(&self, pair: &CurrencyPair) -> Result<(), MarketError> {
        let key = self.key(pair);
        self.cache
            .del(&key)
            .await
            .map_err(|e| MarketError::Unknown(format!("cache invalidation failed: {}", e)))?;
        debug!("Cache invalidated: {}", key);
        self.inner.invalidate(pair).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
