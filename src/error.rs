use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while loading, filtering, or aggregating sales data.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("failed to open workbook {path}: {message}")]
    WorkbookOpen { path: String, message: String },

    #[error("workbook {0} contains no worksheets")]
    NoWorksheets(String),

    #[error("worksheet {sheet} not found in {path}")]
    WorksheetNotFound { path: String, sheet: String },

    #[error("missing expected column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("row {row}, column {column}: {message}")]
    InvalidCell {
        row: usize,
        column: String,
        message: String,
    },

    #[error("geo boundary fetch failed: {0}")]
    GeoFetch(String),

    #[error("data frame operation failed: {0}")]
    Frame(#[from] PolarsError),
}

impl DashboardError {
    /// True for every failure that aborts a run before any rendering.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            DashboardError::WorkbookOpen { .. }
                | DashboardError::NoWorksheets(_)
                | DashboardError::WorksheetNotFound { .. }
                | DashboardError::MissingColumns(_)
                | DashboardError::InvalidCell { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
