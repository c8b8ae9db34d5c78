pub mod aggregator;
pub mod trend;
pub mod window;
