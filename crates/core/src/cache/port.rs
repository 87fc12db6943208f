use crate::cache::error::CacheError;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;

/// # Summary
/// 业务无关的异步 KV 存储接口 (Port)。
///
/// # Invariants
/// - 处理原始字节，确保 Trait 是对象安全的 (Object Safe)。
/// - 写入时可附带存活时长；过期条目对读取不可见。
#[async_trait]
pub trait Cache: Send + Sync {
    /// # Summary
    /// 设置原始字节数据。
    ///
    /// # Logic
    /// 1. 将数据以原子方式写入存储介质，覆盖同名键。
    /// 2. `ttl` 为 `None` 时条目永不过期。
    ///
    /// # Arguments
    /// * `key`: 唯一键。
    /// * `value`: 原始字节数组。
    /// * `ttl`: 可选的存活时长。
    ///
    /// # Returns
    /// 成功返回 Ok，失败返回 `CacheError`。
    async fn set_raw(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError>;

    /// # Summary
    /// 获取原始字节数据。
    ///
    /// # Returns
    /// 存在且未过期则返回 `Some(Vec<u8>)`，否则返回 `None`。
    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// 删除指定键，键不存在时同样返回 Ok。
    async fn del(&self, key: &str) -> Result<(), CacheError>;
}

/// # Summary
/// 在字节接口之上提供强类型读写，编码固定为 JSON。
///
/// # Invariants
/// - 通过 blanket impl 对任意 `Cache`（含 `dyn Cache`）可用。
#[async_trait]
pub trait CacheExt: Cache {
    /// 序列化后写入，`ttl` 语义同 `set_raw`。
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value).map_err(|e| CacheError::Serialize(e.to_string()))?;
        self.set_raw(key, bytes, ttl).await
    }

    /// 读取并反序列化；结构不匹配时返回 `CacheError::Deserialize`。
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>, CacheError> {
        self.get_raw(key)
            .await?
            .map(|bytes| serde_json::from_slice(&bytes))
            .transpose()
            .map_err(|e| CacheError::Deserialize(e.to_string()))
    }
}

impl<T: Cache + ?Sized> CacheExt for T {}
