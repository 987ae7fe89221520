pub mod data_models;
pub mod filter_criteria;

pub use data_models::*;
pub use filter_criteria::*;
