pub mod engine;
pub mod rates;
