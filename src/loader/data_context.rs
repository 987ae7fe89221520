use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashSet;

use crate::error::{DashboardError, Result};
use crate::models::{
    FilterOptions, SaleRecord, CATEGORY_COL, DATE_COL, PRODUCT_COL, PROFIT_COL, QUANTITY_COL,
    REGION_COL, REVENUE_COL,
};

/// The loaded sales table. Built once per process and borrowed by every render.
#[derive(Debug, Clone)]
pub struct DataContext {
    frame: DataFrame,
    options: FilterOptions,
}

impl DataContext {
    pub fn from_records(records: &[SaleRecord]) -> Result<Self> {
        let frame = records_to_dataframe(records)?;
        let options = collect_filter_options(records);
        Ok(Self { frame, options })
    }

    #[cfg(test)]
    pub(crate) fn from_parts(frame: DataFrame, options: FilterOptions) -> Self {
        Self { frame, options }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn filter_options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn records(&self) -> Result<Vec<SaleRecord>> {
        dataframe_to_records(&self.frame)
    }
}

// `NaiveDate::default()` is 1970-01-01, the origin of the polars Date dtype.
pub(crate) fn date_to_days(date: NaiveDate) -> i32 {
    (date - NaiveDate::default()).num_days() as i32
}

pub(crate) fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::default().checked_add_signed(chrono::Duration::days(days as i64))
}

pub fn records_to_dataframe(records: &[SaleRecord]) -> Result<DataFrame> {
    let dates: Vec<i32> = records.iter().map(|r| date_to_days(r.date)).collect();
    let regions: Vec<&str> = records.iter().map(|r| r.region.as_str()).collect();
    let products: Vec<&str> = records.iter().map(|r| r.product.as_str()).collect();
    let categories: Vec<&str> = records.iter().map(|r| r.category.as_str()).collect();
    let quantities: Vec<f64> = records.iter().map(|r| r.quantity).collect();
    let revenues: Vec<f64> = records.iter().map(|r| r.revenue).collect();
    let profits: Vec<f64> = records.iter().map(|r| r.profit).collect();

    let date_column = Column::new(DATE_COL.into(), dates).cast(&DataType::Date)?;

    let df = DataFrame::new(vec![
        date_column,
        Column::new(REGION_COL.into(), regions),
        Column::new(PRODUCT_COL.into(), products),
        Column::new(CATEGORY_COL.into(), categories),
        Column::new(QUANTITY_COL.into(), quantities),
        Column::new(REVENUE_COL.into(), revenues),
        Column::new(PROFIT_COL.into(), profits),
    ])?;

    Ok(df)
}

pub fn dataframe_to_records(df: &DataFrame) -> Result<Vec<SaleRecord>> {
    let days = df.column(DATE_COL)?.cast(&DataType::Int32)?;
    let days = days.i32()?;
    let regions = df.column(REGION_COL)?.str()?;
    let products = df.column(PRODUCT_COL)?.str()?;
    let categories = df.column(CATEGORY_COL)?.str()?;
    let quantities = df.column(QUANTITY_COL)?.f64()?;
    let revenues = df.column(REVENUE_COL)?.f64()?;
    let profits = df.column(PROFIT_COL)?.f64()?;

    let mut records = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let date = days
            .get(idx)
            .and_then(days_to_date)
            .ok_or_else(|| DashboardError::InvalidCell {
                row: idx,
                column: DATE_COL.to_string(),
                message: "missing date".to_string(),
            })?;

        records.push(SaleRecord {
            date,
            region: regions.get(idx).unwrap_or_default().to_string(),
            product: products.get(idx).unwrap_or_default().to_string(),
            category: categories.get(idx).unwrap_or_default().to_string(),
            quantity: quantities.get(idx).unwrap_or(0.0),
            revenue: revenues.get(idx).unwrap_or(0.0),
            profit: profits.get(idx).unwrap_or(0.0),
        });
    }

    Ok(records)
}

fn collect_filter_options(records: &[SaleRecord]) -> FilterOptions {
    let mut seen_regions = HashSet::new();
    let mut seen_products = HashSet::new();
    let mut regions = Vec::new();
    let mut products = Vec::new();

    for record in records {
        if seen_regions.insert(record.region.as_str()) {
            regions.push(record.region.clone());
        }
        if seen_products.insert(record.product.as_str()) {
            products.push(record.product.clone());
        }
    }

    FilterOptions {
        min_date: records.iter().map(|r| r.date).min(),
        max_date: records.iter().map(|r| r.date).max(),
        regions,
        products,
    }
}
