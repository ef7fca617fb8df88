//! Properties page derivation: search, grade and expiration filters, sorting,
//! and the memoized view the page renders from.
//!
//! A property without `days_until_expiration` is treated as expiring in
//! [`MISSING_EXPIRATION_DAYS`] days for both filtering and sorting.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use portfolio_types::{HealthGrade, Property};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Stand-in for a missing expiration: far enough out to sort last ascending
pub const MISSING_EXPIRATION_DAYS: i64 = 999;

pub fn effective_days(property: &Property) -> i64 {
    property
        .days_until_expiration
        .unwrap_or(MISSING_EXPIRATION_DAYS)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "days", rename_all = "snake_case")]
pub enum ExpirationFilter {
    #[default]
    All,
    /// Inclusive: `days <= n`
    WithinDays(i64),
}

impl ExpirationFilter {
    pub fn matches(&self, property: &Property) -> bool {
        match self {
            ExpirationFilter::All => true,
            ExpirationFilter::WithinDays(n) => effective_days(property) <= *n,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyFilter {
    /// Case-insensitive match against name, city and street
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub grade: Option<HealthGrade>,
    #[serde(default)]
    pub expiration: ExpirationFilter,
}

impl PropertyFilter {
    pub fn matches(&self, property: &Property) -> bool {
        self.matches_search(property)
            && self
                .grade
                .map_or(true, |grade| property.health_grade() == grade)
            && self.expiration.matches(property)
    }

    fn matches_search(&self, property: &Property) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        [
            property.name.as_str(),
            property.address.city.as_str(),
            property.address.street.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Name,
    Health,
    Tiv,
    Premium,
    Expiration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl PropertySort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Column-header click: same field flips direction, a new field starts ascending
    pub fn toggled(self, field: SortField) -> Self {
        if self.field == field {
            let direction = match self.direction {
                SortDirection::Asc => SortDirection::Desc,
                SortDirection::Desc => SortDirection::Asc,
            };
            Self { field, direction }
        } else {
            Self {
                field,
                direction: SortDirection::Asc,
            }
        }
    }

    pub fn compare(&self, a: &Property, b: &Property) -> Ordering {
        let ordering = match self.field {
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortField::Health => a.health_score.total_cmp(&b.health_score),
            SortField::Tiv => a.total_insured_value.total_cmp(&b.total_insured_value),
            SortField::Premium => a.total_premium.total_cmp(&b.total_premium),
            SortField::Expiration => effective_days(a).cmp(&effective_days(b)),
        };

        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Keep matching properties in input order
pub fn filter_properties<'a>(
    properties: &'a [Property],
    filter: &PropertyFilter,
) -> Vec<&'a Property> {
    properties.iter().filter(|p| filter.matches(p)).collect()
}

/// Stable sort: equal keys keep their relative order in both directions
pub fn sort_properties(properties: &mut [&Property], sort: &PropertySort) {
    properties.sort_by(|a, b| sort.compare(a, b));
}

pub fn derive_property_view(
    properties: &[Property],
    filter: &PropertyFilter,
    sort: &PropertySort,
) -> Vec<Property> {
    let mut visible = filter_properties(properties, filter);
    sort_properties(&mut visible, sort);
    visible.into_iter().cloned().collect()
}

/// Totals over whatever list the page is currently showing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStats {
    pub count: usize,
    pub total_insured_value: f64,
    pub total_premium: f64,
    pub average_health_score: Option<f64>,
    pub by_grade: BTreeMap<HealthGrade, usize>,
    pub critical_gaps: u32,
}

pub fn portfolio_stats<'a, I>(properties: I) -> PortfolioStats
where
    I: IntoIterator<Item = &'a Property>,
{
    let mut stats = PortfolioStats::default();
    let mut score_sum = 0.0;

    for property in properties {
        stats.count += 1;
        stats.total_insured_value += property.total_insured_value;
        stats.total_premium += property.total_premium;
        stats.critical_gaps += property.gaps.critical;
        score_sum += property.health_score;
        *stats.by_grade.entry(property.health_grade()).or_insert(0) += 1;
    }

    if stats.count > 0 {
        stats.average_health_score = Some(score_sum / stats.count as f64);
    }

    stats
}

/// Memoized filter/sort over the page's property list.
///
/// The derived order is cached as indices into the source list and only
/// recomputed after the list, the filter or the sort actually changes.
#[derive(Debug, Default)]
pub struct PropertyView {
    properties: Vec<Property>,
    filter: PropertyFilter,
    sort: PropertySort,
    cached: Option<Vec<usize>>,
    recomputes: u64,
}

impl PropertyView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_properties(&mut self, properties: Vec<Property>) {
        self.properties = properties;
        self.cached = None;
    }

    pub fn set_filter(&mut self, filter: PropertyFilter) {
        if self.filter != filter {
            self.filter = filter;
            self.cached = None;
        }
    }

    pub fn set_sort(&mut self, sort: PropertySort) {
        if self.sort != sort {
            self.sort = sort;
            self.cached = None;
        }
    }

    pub fn toggle_sort(&mut self, field: SortField) {
        let sort = self.sort.toggled(field);
        self.set_sort(sort);
    }

    pub fn filter(&self) -> &PropertyFilter {
        &self.filter
    }

    pub fn sort(&self) -> PropertySort {
        self.sort
    }

    pub fn all(&self) -> &[Property] {
        &self.properties
    }

    pub fn find(&self, id: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == id)
    }

    /// How many times the derived list has been rebuilt
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }

    pub fn visible(&mut self) -> Vec<&Property> {
        if self.cached.is_none() {
            let mut order: Vec<usize> = (0..self.properties.len())
                .filter(|&i| self.filter.matches(&self.properties[i]))
                .collect();
            let sort = self.sort;
            let properties = &self.properties;
            order.sort_by(|&a, &b| sort.compare(&properties[a], &properties[b]));

            debug!(
                total = self.properties.len(),
                visible = order.len(),
                "Recomputed property view"
            );
            self.recomputes += 1;
            self.cached = Some(order);
        }

        match &self.cached {
            Some(order) => order.iter().map(|&i| &self.properties[i]).collect(),
            None => Vec::new(),
        }
    }

    pub fn stats(&mut self) -> PortfolioStats {
        portfolio_stats(self.visible())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_types::Address;
    use pretty_assertions::assert_eq;

    fn property(id: &str, name: &str, city: &str, score: u8, days: Option<i64>) -> Property {
        Property {
            id: id.to_string(),
            name: name.to_string(),
            address: Address {
                street: format!("{} Main St", id),
                city: city.to_string(),
                state: "FL".to_string(),
                zip: "33101".to_string(),
            },
            geolocation: None,
            property_type: "multifamily".to_string(),
            unit_count: 10,
            building_count: 1,
            total_insured_value: 1_000_000.0,
            total_premium: 10_000.0,
            health_score: f64::from(score),
            gaps: Default::default(),
            expiration_date: None,
            days_until_expiration: days,
            compliance_status: "compliant".to_string(),
            completeness_pct: 100.0,
        }
    }

    fn ids(list: &[&Property]) -> Vec<String> {
        list.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn test_search_matches_name_city_and_street() {
        let props = vec![
            property("p1", "Harbor View", "Miami", 90, Some(10)),
            property("p2", "Oak Court", "Tampa", 80, Some(20)),
            property("p3", "Pine Ridge", "Orlando", 70, Some(30)),
        ];

        let by_name = PropertyFilter {
            search: "harbor".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_properties(&props, &by_name)), vec!["p1"]);

        let by_city = PropertyFilter {
            search: "TAMPA".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_properties(&props, &by_city)), vec!["p2"]);

        let by_street = PropertyFilter {
            search: "p3 main".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_properties(&props, &by_street)), vec!["p3"]);
    }

    #[test]
    fn test_grade_filter() {
        let props = vec![
            property("p1", "A", "Miami", 95, None),
            property("p2", "B", "Miami", 85, None),
            property("p3", "A2", "Miami", 91, None),
        ];
        let filter = PropertyFilter {
            grade: Some(HealthGrade::A),
            ..Default::default()
        };
        assert_eq!(ids(&filter_properties(&props, &filter)), vec!["p1", "p3"]);
    }

    #[test]
    fn test_missing_expiration_counts_as_999_days() {
        let props = vec![property("p1", "X", "Miami", 90, None)];

        let within_998 = PropertyFilter {
            expiration: ExpirationFilter::WithinDays(998),
            ..Default::default()
        };
        assert!(filter_properties(&props, &within_998).is_empty());

        let within_999 = PropertyFilter {
            expiration: ExpirationFilter::WithinDays(999),
            ..Default::default()
        };
        assert_eq!(filter_properties(&props, &within_999).len(), 1);
    }

    #[test]
    fn test_within_days_is_inclusive() {
        let props = vec![
            property("p30", "X", "Miami", 90, Some(30)),
            property("p31", "Y", "Miami", 90, Some(31)),
            property("late", "Z", "Miami", 90, Some(-5)),
        ];
        let filter = PropertyFilter {
            expiration: ExpirationFilter::WithinDays(30),
            ..Default::default()
        };
        assert_eq!(ids(&filter_properties(&props, &filter)), vec!["p30", "late"]);
    }

    #[test]
    fn test_expiration_sort_places_missing_last() {
        let props = vec![
            property("none", "X", "Miami", 90, None),
            property("soon", "Y", "Miami", 90, Some(5)),
            property("later", "Z", "Miami", 90, Some(400)),
        ];
        let sort = PropertySort::new(SortField::Expiration, SortDirection::Asc);
        let view = derive_property_view(&props, &PropertyFilter::default(), &sort);
        let order: Vec<&str> = view.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, vec!["soon", "later", "none"]);
    }

    #[test]
    fn test_descending_sort_keeps_ties_in_input_order() {
        let props = vec![
            property("p1", "A", "Miami", 80, None),
            property("p2", "B", "Miami", 90, None),
            property("p3", "C", "Miami", 80, None),
        ];
        let sort = PropertySort::new(SortField::Health, SortDirection::Desc);
        let view = derive_property_view(&props, &PropertyFilter::default(), &sort);
        let order: Vec<&str> = view.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, vec!["p2", "p1", "p3"]);
    }

    #[test]
    fn test_name_sort_ignores_case() {
        let props = vec![
            property("p1", "beta", "Miami", 80, None),
            property("p2", "Alpha", "Miami", 80, None),
        ];
        let view =
            derive_property_view(&props, &PropertyFilter::default(), &PropertySort::default());
        assert_eq!(view[0].id, "p2");
    }

    #[test]
    fn test_toggle_sort() {
        let sort = PropertySort::default();
        let flipped = sort.toggled(SortField::Name);
        assert_eq!(flipped.direction, SortDirection::Desc);

        let switched = flipped.toggled(SortField::Premium);
        assert_eq!(switched, PropertySort::new(SortField::Premium, SortDirection::Asc));
    }

    #[test]
    fn test_view_recomputes_only_on_change() {
        let mut view = PropertyView::new();
        view.set_properties(vec![
            property("p1", "Harbor", "Miami", 90, Some(10)),
            property("p2", "Oak", "Tampa", 70, Some(50)),
        ]);

        assert_eq!(view.visible().len(), 2);
        assert_eq!(view.visible().len(), 2);
        assert_eq!(view.recompute_count(), 1);

        // Same filter again: no recompute
        view.set_filter(PropertyFilter::default());
        view.visible();
        assert_eq!(view.recompute_count(), 1);

        view.set_filter(PropertyFilter {
            search: "oak".to_string(),
            ..Default::default()
        });
        assert_eq!(ids(&view.visible()), vec!["p2"]);
        assert_eq!(view.recompute_count(), 2);
    }

    #[test]
    fn test_stats_over_visible() {
        let mut view = PropertyView::new();
        let mut p1 = property("p1", "Harbor", "Miami", 90, Some(10));
        p1.gaps.critical = 2;
        view.set_properties(vec![p1, property("p2", "Oak", "Tampa", 70, Some(50))]);

        let stats = view.stats();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.total_insured_value, 2_000_000.0);
        assert_eq!(stats.average_health_score, Some(80.0));
        assert_eq!(stats.by_grade.get(&HealthGrade::A), Some(&1));
        assert_eq!(stats.by_grade.get(&HealthGrade::C), Some(&1));
        assert_eq!(stats.critical_gaps, 2);
    }

    #[test]
    fn test_stats_empty_has_no_average() {
        let stats = portfolio_stats(std::iter::empty());
        assert_eq!(stats.count, 0);
        assert_eq!(stats.average_health_score, None);
    }
}
