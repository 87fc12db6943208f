pub mod time;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 代码最大长度（AlphaVantage 数字货币与法币代码均不超过该长度）
const MAX_CODE_LEN: usize = 10;

/// # Summary
/// 交易对身份实体，由数字货币代码与计价市场代码组成。
///
/// # Invariants
/// - `symbol` 与 `market` 均为 1..=10 位大写 ASCII 字母或数字。
/// - 只能通过 `CurrencyPair::parse` 构造，保证外部输入在进入请求参数前已被清洗。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    // 数字货币代码 (例如: BTC, ETH)
    symbol: String,
    // 计价市场代码 (例如: USD, EUR)
    market: String,
}

/// # Summary
/// 交易对解析错误。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PairError {
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),
    #[error("Invalid market: {0:?}")]
    InvalidMarket(String),
}

impl CurrencyPair {
    /// # Summary
    /// 从用户输入解析交易对。
    ///
    /// # Logic
    /// 1. 去除首尾空白并转换为大写。
    /// 2. 校验长度与字符集，拒绝任何非字母数字字符。
    ///
    /// # Arguments
    /// * `symbol`: 数字货币代码。
    /// * `market`: 计价市场代码。
    ///
    /// # Returns
    /// 成功返回规范化后的交易对，失败返回 `PairError`。
    pub fn parse(symbol: &str, market: &str) -> Result<Self, PairError> {
        let symbol =
            normalize_code(symbol).ok_or_else(|| PairError::InvalidSymbol(symbol.to_string()))?;
        let market =
            normalize_code(market).ok_or_else(|| PairError::InvalidMarket(market.to_string()))?;
        Ok(Self { symbol, market })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    /// 缓存及日志使用的唯一键，形如 `BTC:USD`
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.symbol, self.market)
    }
}

impl std::fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.symbol, self.market)
    }
}

fn normalize_code(raw: &str) -> Option<String> {
    let code = raw.trim().to_ascii_uppercase();
    let valid = !code.is_empty()
        && code.len() <= MAX_CODE_LEN
        && code.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then_some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let pair = CurrencyPair::parse(" btc ", "usd").unwrap();
        assert_eq!(pair.symbol(), "BTC");
        assert_eq!(pair.market(), "USD");
        assert_eq!(pair.cache_key(), "BTC:USD");
        assert_eq!(pair.to_string(), "BTC/USD");
    }

    #[test]
    fn test_parse_rejects_bad_codes() {
        assert_eq!(
            CurrencyPair::parse("", "USD"),
            Err(PairError::InvalidSymbol(String::new()))
        );
        assert!(matches!(
            CurrencyPair::parse("BTC&apikey=x", "USD"),
            Err(PairError::InvalidSymbol(_))
        ));
        assert!(matches!(
            CurrencyPair::parse("BTC", "DOLLARS_US"),
            Err(PairError::InvalidMarket(_))
        ));
        assert!(matches!(
            CurrencyPair::parse("ABCDEFGHIJK", "USD"),
            Err(PairError::InvalidSymbol(_))
        ));
    }
}
