pub mod aggregator;
pub mod filter_engine;
pub mod geo_enrichment;
pub mod value_formatter;

pub use aggregator::*;
pub use filter_engine::*;
pub use geo_enrichment::*;
pub use value_formatter::*;
