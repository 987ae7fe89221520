use tracing::{error, info, warn};

use crate::error::Result;
use crate::fetcher::BoundarySource;
use crate::loader::DataContext;
use crate::models::{DashboardOutputs, FilterCriteria};
use crate::processor::{enrich_regions, filter_sales, kpi_cards, map_panel, Aggregator, REGION_REFERENCE};

/// Turns filter criteria into every panel of the dashboard.
pub struct Dashboard {
    aggregator: Aggregator,
    feature_id_key: String,
}

impl Dashboard {
    pub fn new(feature_id_key: &str) -> Self {
        Self {
            aggregator: Aggregator::new(),
            feature_id_key: feature_id_key.to_string(),
        }
    }

    /// One full render cycle without region boundaries.
    pub fn render(&self, ctx: &DataContext, criteria: &FilterCriteria) -> Result<DashboardOutputs> {
        let filtered = filter_sales(ctx.frame(), criteria)?;
        let kpis = self.aggregator.kpis(&filtered)?;
        let region_totals = self.aggregator.totals_by_region(&filtered)?;
        let regions = enrich_regions(&region_totals, &REGION_REFERENCE);

        let outputs = DashboardOutputs {
            row_count: filtered.height(),
            kpis,
            kpi_cards: kpi_cards(&kpis),
            map: map_panel(regions, &self.feature_id_key),
            profit_by_region: self.aggregator.profit_by_region(&filtered)?,
            margin_by_product: self.aggregator.margin_by_product(&filtered)?,
            revenue_over_time: self.aggregator.revenue_over_time(&filtered)?,
            revenue_by_category: self.aggregator.revenue_by_category(&filtered)?,
        };

        info!(
            "Rendered dashboard over {} rows: revenue {}, profit {}",
            outputs.row_count, outputs.kpi_cards.total_revenue.value, outputs.kpi_cards.total_profit.value
        );

        Ok(outputs)
    }

    /// Renders, then attaches freshly fetched boundaries to the map panel.
    /// A failed fetch only affects the map; the other panels are returned as is.
    pub async fn render_with_boundaries(
        &self,
        ctx: &DataContext,
        criteria: &FilterCriteria,
        source: &dyn BoundarySource,
    ) -> Result<DashboardOutputs> {
        let mut outputs = self.render(ctx, criteria)?;
        outputs.map.feature_id_key = source.feature_id_key().to_string();

        match source.fetch_boundaries().await {
            Ok(boundaries) => {
                let unmatched = boundaries.unmatched_regions(&outputs.map.regions);
                if !unmatched.is_empty() {
                    warn!("No boundary feature for: {}", unmatched.join(", "));
                }
                outputs.map.boundaries = Some(boundaries.document);
            }
            Err(e) => {
                error!("Map panel unavailable: {}", e);
                outputs.map.boundary_error = Some(e.to_string());
            }
        }

        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use crate::fetcher::{GeoBoundaries, GeoJsonFetcher};
    use crate::models::{CategoryRevenue, Kpis, SaleRecord};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::time::Duration;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn sale(d: u32, region: &str, product: &str, qty: f64, revenue: f64, profit: f64) -> SaleRecord {
        SaleRecord {
            date: day(d),
            region: region.to_string(),
            product: product.to_string(),
            category: "Fuel".to_string(),
            quantity: qty,
            revenue,
            profit,
        }
    }

    fn context() -> DataContext {
        DataContext::from_records(&[
            sale(1, "SP", "Gas", 10.0, 100.0, 20.0),
            sale(2, "RJ", "Gas", 5.0, 50.0, 5.0),
            sale(3, "SP", "Diesel", 20.0, 400.0, 100.0),
        ])
        .unwrap()
    }

    struct StaticSource(serde_json::Value);

    #[async_trait]
    impl BoundarySource for StaticSource {
        fn feature_id_key(&self) -> &str {
            "name"
        }

        async fn fetch_boundaries(&self) -> Result<GeoBoundaries> {
            GeoBoundaries::from_document(self.0.clone(), "name")
        }
    }

    struct FailingSource;

    #[async_trait]
    impl BoundarySource for FailingSource {
        fn feature_id_key(&self) -> &str {
            "name"
        }

        async fn fetch_boundaries(&self) -> Result<GeoBoundaries> {
            Err(DashboardError::GeoFetch("connection refused".to_string()))
        }
    }

    #[test]
    fn test_single_region_end_to_end() {
        let ctx = context();
        let criteria = FilterCriteria::new(day(1), day(3), ["SP"], ["Gas", "Diesel"]);

        let outputs = Dashboard::new("name").render(&ctx, &criteria).unwrap();

        assert_eq!(outputs.row_count, 2);
        assert_eq!(outputs.kpis.total_revenue, 500.0);
        assert_eq!(outputs.kpis.total_units, 30.0);
        assert_eq!(outputs.kpis.total_profit, 120.0);
        assert!((outputs.kpis.average_ticket - 16.67).abs() < 0.005);
        assert_eq!(outputs.kpi_cards.average_ticket.value, "R$ 16.67");
        assert_eq!(
            outputs.revenue_by_category,
            vec![CategoryRevenue { category: "Fuel".to_string(), revenue: 500.0 }]
        );
    }

    #[test]
    fn test_map_sum_matches_total_revenue() {
        let ctx = context();
        let criteria = FilterCriteria::all(ctx.filter_options());

        let outputs = Dashboard::new("name").render(&ctx, &criteria).unwrap();
        let map_sum: f64 = outputs.map.regions.iter().map(|r| r.revenue).sum();

        assert_eq!(outputs.map.regions.len(), 27);
        assert_eq!(map_sum, outputs.kpis.total_revenue);
        assert_eq!(outputs.map.color_range, (0.0, 500.0));
    }

    #[test]
    fn test_empty_region_selection() {
        let ctx = context();
        let criteria = FilterCriteria::new(day(1), day(3), Vec::<String>::new(), ["Gas", "Diesel"]);

        let outputs = Dashboard::new("name").render(&ctx, &criteria).unwrap();

        assert_eq!(outputs.row_count, 0);
        assert_eq!(outputs.kpis, Kpis::default());
        assert!(outputs.profit_by_region.is_empty());
        assert!(outputs.margin_by_product.is_empty());
        assert!(outputs.revenue_over_time.is_empty());
        assert!(outputs.revenue_by_category.is_empty());
        assert!(outputs.map.regions.iter().all(|r| r.revenue == 0.0));
        assert_eq!(outputs.kpi_cards.total_revenue.value, "R$ 0.00");
    }

    #[tokio::test]
    async fn test_boundaries_attached() {
        let ctx = context();
        let criteria = FilterCriteria::all(ctx.filter_options());
        let source = StaticSource(json!({
            "type": "FeatureCollection",
            "features": [{"type": "Feature", "properties": {"name": "São Paulo"}, "geometry": null}]
        }));

        let outputs = Dashboard::new("name")
            .render_with_boundaries(&ctx, &criteria, &source)
            .await
            .unwrap();

        assert!(outputs.map.boundaries.is_some());
        assert!(outputs.map.boundary_error.is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_only_affects_map() {
        let ctx = context();
        let criteria = FilterCriteria::all(ctx.filter_options());

        let outputs = Dashboard::new("name")
            .render_with_boundaries(&ctx, &criteria, &FailingSource)
            .await
            .unwrap();

        assert!(outputs.map.boundaries.is_none());
        assert!(outputs.map.boundary_error.as_deref().unwrap().contains("connection refused"));
        assert_eq!(outputs.map.regions.len(), 27);
        assert_eq!(outputs.kpis.total_revenue, 550.0);
        assert_eq!(outputs.revenue_over_time.len(), 3);
    }

    #[tokio::test]
    async fn test_unreachable_boundary_url_reported_on_map() {
        let ctx = context();
        let criteria = FilterCriteria::all(ctx.filter_options());
        let fetcher = GeoJsonFetcher::new("http://127.0.0.1:9/states.geojson", "name", Duration::from_secs(2));

        let outputs = Dashboard::new("name")
            .render_with_boundaries(&ctx, &criteria, &fetcher)
            .await
            .unwrap();

        assert!(outputs.map.boundaries.is_none());
        assert!(outputs.map.boundary_error.as_deref().unwrap().contains("127.0.0.1:9"));
        assert_eq!(outputs.kpis.total_revenue, 550.0);
    }
}
