use polars::prelude::*;
use tracing::{info, warn};

use crate::error::Result;
use crate::loader::date_to_days;
use crate::models::{FilterCriteria, DATE_COL, PRODUCT_COL, REGION_COL};

/// Returns the rows of `df` that match every predicate of `criteria`.
///
/// The input frame is left untouched and row order is preserved. An inverted
/// date range or an empty selection simply yields an empty frame.
pub fn filter_sales(df: &DataFrame, criteria: &FilterCriteria) -> Result<DataFrame> {
    let start = date_to_days(criteria.start);
    let end = date_to_days(criteria.end);

    let days = df.column(DATE_COL)?.cast(&DataType::Int32)?;
    let days = days.i32()?;
    let regions = df.column(REGION_COL)?.str()?;
    let products = df.column(PRODUCT_COL)?.str()?;

    let mask: BooleanChunked = days
        .into_iter()
        .zip(regions.into_iter())
        .zip(products.into_iter())
        .map(|((day, region), product)| match (day, region, product) {
            (Some(day), Some(region), Some(product)) => {
                day >= start
                    && day <= end
                    && criteria.regions.contains(region)
                    && criteria.products.contains(product)
            }
            _ => false,
        })
        .collect();

    let filtered = df.filter(&mask)?;

    if filtered.height() == 0 {
        warn!(
            "Filters matched no rows ({} to {}, {} regions, {} products)",
            criteria.start,
            criteria.end,
            criteria.regions.len(),
            criteria.products.len()
        );
    } else {
        info!("Filters kept {} of {} rows", filtered.height(), df.height());
    }

    Ok(filtered)
}
