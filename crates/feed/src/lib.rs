pub mod alphavantage;
pub mod cached;
