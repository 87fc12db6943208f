use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coinlens_core::cache::error::CacheError;
use coinlens_core::cache::port::Cache;
use coinlens_core::common::time::{RealTimeProvider, TimeProvider};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// 单个缓存条目
struct Entry {
    value: Vec<u8>,
    // None 表示永不过期
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// # Summary
/// 基于 DashMap 的内存缓存实现，支持按条目过期。
///
/// # Invariants
/// - 所有操作均通过并发哈希表 `DashMap` 执行，保证多线程安全。
/// - 过期判断统一经由注入的 `TimeProvider`，读取时惰性剔除过期条目。
/// - 不提供容量限制；条目数量由上游键空间（交易对数量）决定。
pub struct MemCache {
    // 线程安全的 KV 存储容器
    storage: DashMap<String, Entry>,
    // 时钟
    clock: Arc<dyn TimeProvider>,
}

impl MemCache {
    /// # Summary
    /// 创建一个使用系统时钟的 MemCache 实例。
    pub fn new() -> Self {
        Self::with_clock(Arc::new(RealTimeProvider))
    }

    /// # Summary
    /// 创建一个使用指定时钟的 MemCache 实例。
    ///
    /// # Arguments
    /// * `clock`: 时间供给器，测试中可注入 `FakeClockProvider`。
    pub fn with_clock(clock: Arc<dyn TimeProvider>) -> Self {
        Self {
            storage: DashMap::new(),
            clock,
        }
    }

    /// # Summary
    /// 清理全部已过期条目。
    ///
    /// # Returns
    /// 被移除的条目数量。
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.storage.len();
        self.storage.retain(|_, entry| entry.is_live(now));
        let removed = before.saturating_sub(self.storage.len());
        if removed > 0 {
            debug!("Purged {} expired cache entries", removed);
        }
        removed
    }

    /// 当前条目数（包含尚未被剔除的过期条目）
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

impl Default for MemCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for MemCache {
    /// # Summary
    /// 设置原始字节数据。
    ///
    /// # Logic
    /// 1. 根据当前时钟与 `ttl` 计算过期时刻；`ttl` 超出 chrono 表示范围时视为永不过期。
    /// 2. 插入哈希表，若存在同名 Key 则覆盖。
    async fn set_raw(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let now = self.clock.now();
        let expires_at = ttl.and_then(|ttl| {
            chrono::Duration::from_std(ttl)
                .ok()
                .and_then(|delta| now.checked_add_signed(delta))
        });
        self.storage
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    /// # Summary
    /// 获取原始字节数据。
    ///
    /// # Logic
    /// 1. 命中且未过期：克隆数据返回。
    /// 2. 命中但已过期：移除该条目并返回 None。
    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let now = self.clock.now();
        if let Some(entry) = self.storage.get(key) {
            if entry.is_live(now) {
                return Ok(Some(entry.value.clone()));
            }
        } else {
            return Ok(None);
        }

        // 读锁已释放，此处再移除过期条目
        self.storage.remove_if(key, |_, entry| !entry.is_live(now));
        debug!("Cache entry expired: {}", key);
        Ok(None)
    }

    /// # Summary
    /// 删除指定键，无论键是否存在均返回 Ok。
    async fn del(&self, key: &str) -> Result<(), CacheError> {
        self.storage.remove(key);
        Ok(())
    }
}
