pub mod traits;

// Market-data provider implementations
pub mod yahoo_finance;
