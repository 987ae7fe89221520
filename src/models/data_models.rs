use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// Exact sheet headers, case-sensitive.
pub const DATE_COL: &str = "Data";
pub const REGION_COL: &str = "Estado";
pub const PRODUCT_COL: &str = "Produto";
pub const CATEGORY_COL: &str = "Categoria";
pub const QUANTITY_COL: &str = "Quantidade Vendida";
pub const REVENUE_COL: &str = "Receita Total";
pub const PROFIT_COL: &str = "Lucro";

pub const REQUIRED_COLUMNS: [&str; 7] = [
    DATE_COL,
    REGION_COL,
    PRODUCT_COL,
    CATEGORY_COL,
    QUANTITY_COL,
    REVENUE_COL,
    PROFIT_COL,
];

/// One row of the sales sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub date: NaiveDate,
    pub region: String,
    pub product: String,
    pub category: String,
    pub quantity: f64,
    pub revenue: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRevenue {
    pub region: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionProfit {
    pub region: String,
    pub profit: f64,
}

/// Profit margin of one product. `margin_pct` is `None` when the product's
/// summed revenue is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMargin {
    pub product: String,
    pub profit: f64,
    pub revenue: f64,
    pub margin_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRevenue {
    pub category: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Kpis {
    pub total_revenue: f64,
    pub total_units: f64,
    pub total_profit: f64,
    pub average_ticket: f64,
}

/// A single KPI card: label plus its display string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiCard {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiCards {
    pub total_revenue: KpiCard,
    pub total_units: KpiCard,
    pub total_profit: KpiCard,
    pub average_ticket: KpiCard,
}

/// Region row ready for map shading; every reference region appears once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRegion {
    pub code: String,
    pub name: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapPanel {
    pub regions: Vec<MapRegion>,
    /// Colour scale bounds, `(0, max revenue)`.
    pub color_range: (f64, f64),
    pub feature_id_key: String,
    /// Boundary document, absent until fetched or when the fetch failed.
    pub boundaries: Option<serde_json::Value>,
    pub boundary_error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardOutputs {
    pub row_count: usize,
    pub kpis: Kpis,
    pub kpi_cards: KpiCards,
    pub map: MapPanel,
    pub profit_by_region: Vec<RegionProfit>,
    pub margin_by_product: Vec<ProductMargin>,
    pub revenue_over_time: Vec<DailyRevenue>,
    pub revenue_by_category: Vec<CategoryRevenue>,
}
