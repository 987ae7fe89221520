pub mod geojson_fetcher;

pub use geojson_fetcher::*;
