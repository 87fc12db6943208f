//! # 启动配置加载
//!
//! 分层顺序（后者覆盖前者）：
//! 1. `AppConfig::default()`
//! 2. 可选的 `coinlens.toml`
//! 3. `COINLENS__SECTION__KEY` 形式的环境变量
//! 4. 兼容旧部署的扁平变量 `ALPHAVANTAGE_API_KEY` / `DEFAULT_SYMBOL` / `DEFAULT_MARKET`

use std::path::Path;

use config::{Config, ConfigError, Environment, File, Map};
use thiserror::Error;

use coinlens_core::common::{CurrencyPair, PairError};
use coinlens_core::config::AppConfig;

pub const ENV_PREFIX: &str = "COINLENS";
pub const LEGACY_API_KEY: &str = "ALPHAVANTAGE_API_KEY";
pub const LEGACY_SYMBOL: &str = "DEFAULT_SYMBOL";
pub const LEGACY_MARKET: &str = "DEFAULT_MARKET";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Missing AlphaVantage API key (set ALPHAVANTAGE_API_KEY or COINLENS__ALPHAVANTAGE__API_KEY)")]
    MissingApiKey,

    #[error("Invalid default currency pair: {0}")]
    InvalidDefaultPair(#[from] PairError),
}

/// 校验通过的启动配置
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: AppConfig,
    pub default_pair: CurrencyPair,
}

/// # Summary
/// 按分层顺序加载并校验配置。
///
/// # Arguments
/// * `path`: 配置文件路径，不存在时跳过。
/// * `env`: 环境变量快照，生产环境传入 `std::env::vars()`。
///
/// # Returns
/// 缺少 API Key 或默认交易对非法时返回错误，服务不应启动。
pub fn load(path: &Path, env: Map<String, String>) -> Result<Settings, SettingsError> {
    let legacy = |key: &str| {
        env.get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let api_key = legacy(LEGACY_API_KEY);
    let symbol = legacy(LEGACY_SYMBOL);
    let market = legacy(LEGACY_MARKET);

    let config: AppConfig = Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(Some(env)),
        )
        .set_override_option("alphavantage.api_key", api_key)?
        .set_override_option("defaults.symbol", symbol)?
        .set_override_option("defaults.market", market)?
        .build()?
        .try_deserialize()?;

    if config.alphavantage.api_key.trim().is_empty() {
        return Err(SettingsError::MissingApiKey);
    }
    let default_pair = CurrencyPair::parse(&config.defaults.symbol, &config.defaults.market)?;

    Ok(Settings {
        config,
        default_pair,
    })
}
