pub mod event;
pub mod holding;
pub mod ledger;
pub mod quote;
