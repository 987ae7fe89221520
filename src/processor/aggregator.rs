use polars::prelude::*;
use std::cmp::Ordering;

use crate::error::Result;
use crate::loader::days_to_date;
use crate::models::{
    CategoryRevenue, DailyRevenue, Kpis, ProductMargin, RegionProfit, RegionRevenue, CATEGORY_COL,
    DATE_COL, PRODUCT_COL, PROFIT_COL, QUANTITY_COL, REGION_COL, REVENUE_COL,
};

/// Grouped sums over a filtered sales frame. Every method is pure; an empty
/// frame produces empty tables and zero KPIs.
pub struct Aggregator;

impl Aggregator {
    pub fn new() -> Self {
        Aggregator
    }

    /// Revenue summed per region code, keyed ascending by region.
    pub fn totals_by_region(&self, df: &DataFrame) -> Result<Vec<RegionRevenue>> {
        let grouped = self.sum_by(df, REGION_COL, &[REVENUE_COL])?;
        let mut rows: Vec<RegionRevenue> = string_keys(&grouped, REGION_COL)?
            .into_iter()
            .zip(float_values(&grouped, REVENUE_COL)?)
            .map(|(region, revenue)| RegionRevenue { region, revenue })
            .collect();

        rows.sort_by(|a, b| a.region.cmp(&b.region));
        Ok(rows)
    }

    /// Profit summed per region, ascending by profit.
    pub fn profit_by_region(&self, df: &DataFrame) -> Result<Vec<RegionProfit>> {
        let grouped = self.sum_by(df, REGION_COL, &[PROFIT_COL])?;
        let mut rows: Vec<RegionProfit> = string_keys(&grouped, REGION_COL)?
            .into_iter()
            .zip(float_values(&grouped, PROFIT_COL)?)
            .map(|(region, profit)| RegionProfit { region, profit })
            .collect();

        rows.sort_by(|a, b| a.profit.total_cmp(&b.profit).then_with(|| a.region.cmp(&b.region)));
        Ok(rows)
    }

    /// Profit, revenue and margin per product, ascending by margin. Products
    /// with zero revenue have no margin and sort last.
    pub fn margin_by_product(&self, df: &DataFrame) -> Result<Vec<ProductMargin>> {
        let grouped = self.sum_by(df, PRODUCT_COL, &[PROFIT_COL, REVENUE_COL])?;
        let products = string_keys(&grouped, PRODUCT_COL)?;
        let profits = float_values(&grouped, PROFIT_COL)?;
        let revenues = float_values(&grouped, REVENUE_COL)?;

        let mut rows: Vec<ProductMargin> = products
            .into_iter()
            .zip(profits)
            .zip(revenues)
            .map(|((product, profit), revenue)| ProductMargin {
                product,
                profit,
                revenue,
                margin_pct: margin_pct(profit, revenue),
            })
            .collect();

        rows.sort_by(|a, b| {
            compare_margins(a.margin_pct, b.margin_pct).then_with(|| a.product.cmp(&b.product))
        });
        Ok(rows)
    }

    /// Revenue summed per calendar day, ascending by date.
    pub fn revenue_over_time(&self, df: &DataFrame) -> Result<Vec<DailyRevenue>> {
        let grouped = self.sum_by(df, DATE_COL, &[REVENUE_COL])?;
        let days = grouped.column(DATE_COL)?.cast(&DataType::Int32)?;
        let days = days.i32()?;
        let revenues = float_values(&grouped, REVENUE_COL)?;

        let mut rows: Vec<DailyRevenue> = days
            .into_iter()
            .zip(revenues)
            .filter_map(|(day, revenue)| {
                day.and_then(days_to_date)
                    .map(|date| DailyRevenue { date, revenue })
            })
            .collect();

        rows.sort_by_key(|row| row.date);
        Ok(rows)
    }

    /// Revenue summed per product category, ascending by revenue.
    pub fn revenue_by_category(&self, df: &DataFrame) -> Result<Vec<CategoryRevenue>> {
        let grouped = self.sum_by(df, CATEGORY_COL, &[REVENUE_COL])?;
        let mut rows: Vec<CategoryRevenue> = string_keys(&grouped, CATEGORY_COL)?
            .into_iter()
            .zip(float_values(&grouped, REVENUE_COL)?)
            .map(|(category, revenue)| CategoryRevenue { category, revenue })
            .collect();

        rows.sort_by(|a, b| {
            a.revenue
                .total_cmp(&b.revenue)
                .then_with(|| a.category.cmp(&b.category))
        });
        Ok(rows)
    }

    /// Whole-frame totals. The average ticket is zero when no units were sold.
    pub fn kpis(&self, df: &DataFrame) -> Result<Kpis> {
        let total_revenue = column_sum(df, REVENUE_COL)?;
        let total_units = column_sum(df, QUANTITY_COL)?;
        let total_profit = column_sum(df, PROFIT_COL)?;

        let average_ticket = if total_units > 0.0 {
            total_revenue / total_units
        } else {
            0.0
        };

        Ok(Kpis {
            total_revenue,
            total_units,
            total_profit,
            average_ticket,
        })
    }

    fn sum_by(&self, df: &DataFrame, key: &str, values: &[&str]) -> Result<DataFrame> {
        let aggs: Vec<Expr> = values.iter().map(|name| col(*name).sum()).collect();

        let grouped = df
            .clone()
            .lazy()
            .group_by_stable([col(key)])
            .agg(aggs)
            .collect()?;

        Ok(grouped)
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// `100 * profit / revenue`, or `None` when revenue is zero.
pub fn margin_pct(profit: f64, revenue: f64) -> Option<f64> {
    if revenue == 0.0 {
        None
    } else {
        Some(profit * 100.0 / revenue)
    }
}

fn compare_margins(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn column_sum(df: &DataFrame, name: &str) -> Result<f64> {
    Ok(df.column(name)?.f64()?.sum().unwrap_or(0.0))
}

fn string_keys(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    Ok(df
        .column(name)?
        .str()?
        .into_iter()
        .map(|key| key.unwrap_or_default().to_string())
        .collect())
}

fn float_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    Ok(df
        .column(name)?
        .f64()?
        .into_iter()
        .map(|value| value.unwrap_or(0.0))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::records_to_dataframe;
    use crate::models::SaleRecord;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn sale(d: u32, region: &str, product: &str, category: &str, qty: f64, revenue: f64, profit: f64) -> SaleRecord {
        SaleRecord {
            date: day(d),
            region: region.to_string(),
            product: product.to_string(),
            category: category.to_string(),
            quantity: qty,
            revenue,
            profit,
        }
    }

    fn frame() -> DataFrame {
        records_to_dataframe(&[
            sale(2, "SP", "Gas", "Fuel", 10.0, 100.0, 20.0),
            sale(1, "RJ", "Gas", "Fuel", 5.0, 50.0, 5.0),
            sale(2, "SP", "Diesel", "Fuel", 20.0, 400.0, 100.0),
            sale(3, "MG", "Oil", "Lubricant", 2.0, 60.0, -6.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_totals_by_region() {
        let rows = Aggregator::new().totals_by_region(&frame()).unwrap();
        let pairs: Vec<(&str, f64)> = rows.iter().map(|r| (r.region.as_str(), r.revenue)).collect();
        assert_eq!(pairs, vec![("MG", 60.0), ("RJ", 50.0), ("SP", 500.0)]);
    }

    #[test]
    fn test_profit_by_region_sorted_ascending() {
        let rows = Aggregator::new().profit_by_region(&frame()).unwrap();
        let pairs: Vec<(&str, f64)> = rows.iter().map(|r| (r.region.as_str(), r.profit)).collect();
        assert_eq!(pairs, vec![("MG", -6.0), ("RJ", 5.0), ("SP", 120.0)]);
    }

    #[test]
    fn test_margin_by_product() {
        let rows = Aggregator::new().margin_by_product(&frame()).unwrap();
        let products: Vec<&str> = rows.iter().map(|r| r.product.as_str()).collect();
        assert_eq!(products, vec!["Oil", "Gas", "Diesel"]);

        let gas = &rows[1];
        assert_eq!(gas.profit, 25.0);
        assert_eq!(gas.revenue, 150.0);
        assert!((gas.margin_pct.unwrap() - 16.666_666).abs() < 1e-4);
        assert_eq!(rows[2].margin_pct, Some(25.0));
    }

    #[test]
    fn test_zero_revenue_margin_is_none_and_last() {
        let df = records_to_dataframe(&[
            sale(1, "SP", "Brinde", "Promo", 1.0, 0.0, -3.0),
            sale(1, "SP", "Amostra", "Promo", 1.0, 0.0, 4.0),
            sale(1, "SP", "Gas", "Fuel", 1.0, 10.0, -1.0),
        ])
        .unwrap();

        let rows = Aggregator::new().margin_by_product(&df).unwrap();
        assert_eq!(rows[0].product, "Gas");
        assert_eq!(rows[0].margin_pct, Some(-10.0));
        assert_eq!(rows[1].margin_pct, None);
        assert_eq!(rows[2].margin_pct, None);
    }

    #[test]
    fn test_revenue_over_time_sorted_by_date() {
        let rows = Aggregator::new().revenue_over_time(&frame()).unwrap();
        assert_eq!(
            rows,
            vec![
                DailyRevenue { date: day(1), revenue: 50.0 },
                DailyRevenue { date: day(2), revenue: 500.0 },
                DailyRevenue { date: day(3), revenue: 60.0 },
            ]
        );
    }

    #[test]
    fn test_revenue_by_category() {
        let rows = Aggregator::new().revenue_by_category(&frame()).unwrap();
        let pairs: Vec<(&str, f64)> = rows.iter().map(|r| (r.category.as_str(), r.revenue)).collect();
        assert_eq!(pairs, vec![("Lubricant", 60.0), ("Fuel", 550.0)]);
    }

    #[test]
    fn test_kpis() {
        let kpis = Aggregator::new().kpis(&frame()).unwrap();
        assert_eq!(kpis.total_revenue, 610.0);
        assert_eq!(kpis.total_units, 37.0);
        assert_eq!(kpis.total_profit, 119.0);
        assert!((kpis.average_ticket - 610.0 / 37.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_units_ticket_is_zero() {
        let df = records_to_dataframe(&[sale(1, "SP", "Gas", "Fuel", 0.0, 100.0, 10.0)]).unwrap();
        let kpis = Aggregator::new().kpis(&df).unwrap();
        assert_eq!(kpis.total_revenue, 100.0);
        assert_eq!(kpis.average_ticket, 0.0);
    }

    #[test]
    fn test_empty_frame_degrades_gracefully() {
        let df = records_to_dataframe(&[]).unwrap();
        let aggregator = Aggregator::new();

        assert!(aggregator.totals_by_region(&df).unwrap().is_empty());
        assert!(aggregator.profit_by_region(&df).unwrap().is_empty());
        assert!(aggregator.margin_by_product(&df).unwrap().is_empty());
        assert!(aggregator.revenue_over_time(&df).unwrap().is_empty());
        assert!(aggregator.revenue_by_category(&df).unwrap().is_empty());
        assert_eq!(aggregator.kpis(&df).unwrap(), Kpis::default());
    }

    #[test]
    fn test_margin_pct_sentinel() {
        assert_eq!(margin_pct(5.0, 0.0), None);
        assert_eq!(margin_pct(-5.0, 0.0), None);
        assert_eq!(margin_pct(0.0, 0.0), None);
        assert_eq!(margin_pct(20.0, 100.0), Some(20.0));
    }
}
