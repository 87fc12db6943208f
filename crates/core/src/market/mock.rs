use crate::common::CurrencyPair;
use crate::market::error::MarketError;
use crate::market::port::DigitalCurrencyProvider;
use crate::series::entity::RawDailyPayload;
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// # Summary
/// 测试用的静态数据源：每次调用返回预设的载荷或错误，并记录调用次数。
pub struct StaticProvider {
    response: Mutex<Result<RawDailyPayload, MarketError>>,
    fetches: AtomicUsize,
    invalidations: AtomicUsize,
}

impl StaticProvider {
    pub fn new(payload: RawDailyPayload) -> Self {
        Self::with_response(Ok(payload))
    }

    pub fn failing(err: MarketError) -> Self {
        Self::with_response(Err(err))
    }

    fn with_response(response: Result<RawDailyPayload, MarketError>) -> Self {
        Self {
            response: Mutex::new(response),
            fetches: AtomicUsize::new(0),
            invalidations: AtomicUsize::new(0),
        }
    }

    /// 替换后续调用的返回值
    pub fn set_response(&self, response: Result<RawDailyPayload, MarketError>) {
        *self
            .response
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = response;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn invalidate_count(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DigitalCurrencyProvider for StaticProvider {
    async fn fetch_daily(&self, _pair: &CurrencyPair) -> Result<RawDailyPayload, MarketError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.response
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    async fn invalidate(&self, _pair: &CurrencyPair) -> Result<(), MarketError> {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "static"
    }
}
