pub mod data_context;
pub mod sales_loader;

pub use data_context::*;
pub use sales_loader::*;
