pub mod fee_service;
pub mod quote_service;
pub mod replay_service;
pub mod simulation_service;
pub mod transaction_service;
