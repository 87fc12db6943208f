use serde::{Deserialize, Serialize};

/// 全局应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub alphavantage: AlphaVantageConfig,
    pub defaults: DefaultsConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// AlphaVantage 接入参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphaVantageConfig {
    // 必填，启动时校验
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

/// `/home` 与看板使用的默认交易对
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub symbol: String,
    pub market: String,
}

/// 上游响应缓存参数，`ttl_secs = 0` 表示关闭缓存
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://www.alphavantage.co/query".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            symbol: "BTC".to_string(),
            market: "USD".to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

impl ServerConfig {
    /// 监听地址，形如 `0.0.0.0:8000`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
