use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Values offered to the user as filter choices, derived from the loaded data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    /// Region codes in order of first appearance.
    pub regions: Vec<String>,
    /// Product names in order of first appearance.
    pub products: Vec<String>,
}

/// Date interval (inclusive) plus accepted region codes and product names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub regions: HashSet<String>,
    pub products: HashSet<String>,
}

impl FilterCriteria {
    pub fn new<R, P>(start: NaiveDate, end: NaiveDate, regions: R, products: P) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            start,
            end,
            regions: regions.into_iter().map(Into::into).collect(),
            products: products.into_iter().map(Into::into).collect(),
        }
    }

    /// Default selection: full date range, every region and every product.
    pub fn all(options: &FilterOptions) -> Self {
        let start = options.min_date.unwrap_or(NaiveDate::MIN);
        let end = options.max_date.unwrap_or(NaiveDate::MAX);
        Self::new(
            start,
            end,
            options.regions.iter().cloned(),
            options.products.iter().cloned(),
        )
    }

    pub fn matches(&self, date: NaiveDate, region: &str, product: &str) -> bool {
        date >= self.start
            && date <= self.end
            && self.regions.contains(region)
            && self.products.contains(product)
    }

    /// Returns new criteria with the fields present in `event` replaced.
    pub fn apply(&self, event: FilterEvent) -> Self {
        Self {
            start: event.start_date.unwrap_or(self.start),
            end: event.end_date.unwrap_or(self.end),
            regions: event
                .regions
                .map(|r| r.into_iter().collect())
                .unwrap_or_else(|| self.regions.clone()),
            products: event
                .products
                .map(|p| p.into_iter().collect())
                .unwrap_or_else(|| self.products.clone()),
        }
    }
}

/// A user interaction from the host loop. Absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterEvent {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub regions: Option<Vec<String>>,
    #[serde(default)]
    pub products: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_all_uses_full_range() {
        let options = FilterOptions {
            min_date: Some(day(1)),
            max_date: Some(day(3)),
            regions: vec!["SP".to_string(), "RJ".to_string()],
            products: vec!["Gas".to_string()],
        };
        let criteria = FilterCriteria::all(&options);
        assert_eq!(criteria.start, day(1));
        assert_eq!(criteria.end, day(3));
        assert!(criteria.matches(day(2), "RJ", "Gas"));
        assert!(!criteria.matches(day(2), "MG", "Gas"));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let criteria = FilterCriteria::new(day(1), day(3), ["SP"], ["Gas"]);
        assert!(criteria.matches(day(1), "SP", "Gas"));
        assert!(criteria.matches(day(3), "SP", "Gas"));
        assert!(!criteria.matches(day(4), "SP", "Gas"));
    }

    #[test]
    fn test_event_replaces_only_given_fields() {
        let criteria = FilterCriteria::new(day(1), day(3), ["SP", "RJ"], ["Gas"]);
        let event: FilterEvent =
            serde_json::from_str(r#"{"end_date": "2024-01-02", "regions": ["RJ"]}"#).unwrap();
        let updated = criteria.apply(event);

        assert_eq!(updated.start, day(1));
        assert_eq!(updated.end, day(2));
        assert_eq!(updated.regions, HashSet::from(["RJ".to_string()]));
        assert_eq!(updated.products, criteria.products);
    }

    #[test]
    fn test_empty_event_is_identity() {
        let criteria = FilterCriteria::new(day(1), day(3), ["SP"], ["Gas", "Diesel"]);
        let updated = criteria.apply(serde_json::from_str("{}").unwrap());
        assert_eq!(updated, criteria);
    }
}
