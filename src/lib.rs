pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetcher;
pub mod host;
pub mod loader;
pub mod models;
pub mod processor;

pub use dashboard::Dashboard;
pub use error::DashboardError;
pub use host::HostSession;
