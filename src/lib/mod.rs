pub mod constants;
pub mod units;
pub mod errors;
pub mod fleet;
pub mod performance;
pub mod emission_factors;
pub mod ridepooling_emissions;
pub mod reference_mobility;
pub mod comparison;
pub mod catalog;
pub mod report;
pub mod session;
pub mod export;
pub mod session_storage;
