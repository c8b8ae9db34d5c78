pub mod pricing;
pub mod records;
pub mod stats;
