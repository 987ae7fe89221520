use std::collections::HashMap;

use crate::models::{MapPanel, MapRegion, RegionRevenue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionRef {
    pub code: &'static str,
    pub name: &'static str,
}

const fn region(code: &'static str, name: &'static str) -> RegionRef {
    RegionRef { code, name }
}

/// The 27 Brazilian federative units, code to full name.
pub const REGION_REFERENCE: [RegionRef; 27] = [
    region("AC", "Acre"),
    region("AL", "Alagoas"),
    region("AP", "Amapá"),
    region("AM", "Amazonas"),
    region("BA", "Bahia"),
    region("CE", "Ceará"),
    region("DF", "Distrito Federal"),
    region("ES", "Espírito Santo"),
    region("GO", "Goiás"),
    region("MA", "Maranhão"),
    region("MT", "Mato Grosso"),
    region("MS", "Mato Grosso do Sul"),
    region("MG", "Minas Gerais"),
    region("PA", "Pará"),
    region("PB", "Paraíba"),
    region("PR", "Paraná"),
    region("PE", "Pernambuco"),
    region("PI", "Piauí"),
    region("RJ", "Rio de Janeiro"),
    region("RN", "Rio Grande do Norte"),
    region("RS", "Rio Grande do Sul"),
    region("RO", "Rondônia"),
    region("RR", "Roraima"),
    region("SC", "Santa Catarina"),
    region("SP", "São Paulo"),
    region("SE", "Sergipe"),
    region("TO", "Tocantins"),
];

/// Left join of region totals onto `reference`.
///
/// Every reference entry appears exactly once, in reference order, with zero
/// revenue when absent from `totals`. Codes outside the reference are dropped.
pub fn enrich_regions(totals: &[RegionRevenue], reference: &[RegionRef]) -> Vec<MapRegion> {
    let mut by_code: HashMap<&str, f64> = HashMap::new();
    for row in totals {
        *by_code.entry(row.region.as_str()).or_insert(0.0) += row.revenue;
    }

    reference
        .iter()
        .map(|r| MapRegion {
            code: r.code.to_string(),
            name: r.name.to_string(),
            revenue: by_code.get(r.code).copied().unwrap_or(0.0),
        })
        .collect()
}

/// Map panel without boundaries; the colour range spans zero to the largest revenue.
pub fn map_panel(regions: Vec<MapRegion>, feature_id_key: &str) -> MapPanel {
    let max_revenue = regions
        .iter()
        .map(|r| r.revenue)
        .fold(0.0_f64, f64::max);

    MapPanel {
        regions,
        color_range: (0.0, max_revenue),
        feature_id_key: feature_id_key.to_string(),
        boundaries: None,
        boundary_error: None,
    }
}
