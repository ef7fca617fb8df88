//! Chart data for the analytics page
//!
//! Time series are procedurally generated mock data: a trend, a yearly
//! seasonal swing and bounded noise, reproducible from a seed. Breakdowns are
//! computed from real property records.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use chrono::{Datelike, Months, NaiveDate};
use portfolio_types::Property;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    PremiumTrend,
    ClaimsFrequency,
    LossRatio,
}

struct SeriesShape {
    base: f64,
    /// Compounded per month
    growth: f64,
    /// Fraction of the value, peaks in `peak_month`
    seasonal: f64,
    peak_month: u32,
    /// Fraction of the value, uniform
    noise: f64,
    ceiling: Option<f64>,
    integral: bool,
}

impl SeriesKind {
    pub fn label(&self) -> &'static str {
        match self {
            SeriesKind::PremiumTrend => "Monthly premium",
            SeriesKind::ClaimsFrequency => "Claims filed",
            SeriesKind::LossRatio => "Loss ratio (%)",
        }
    }

    fn shape(&self) -> SeriesShape {
        match self {
            SeriesKind::PremiumTrend => SeriesShape {
                base: 120_000.0,
                growth: 0.012,
                seasonal: 0.03,
                peak_month: 6,
                noise: 0.02,
                ceiling: None,
                integral: false,
            },
            // Hurricane season peaks in September
            SeriesKind::ClaimsFrequency => SeriesShape {
                base: 6.0,
                growth: 0.0,
                seasonal: 0.4,
                peak_month: 9,
                noise: 0.25,
                ceiling: None,
                integral: true,
            },
            SeriesKind::LossRatio => SeriesShape {
                base: 55.0,
                growth: -0.003,
                seasonal: 0.15,
                peak_month: 9,
                noise: 0.08,
                ceiling: Some(150.0),
                integral: false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// `YYYY-MM`
    pub period: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub kind: SeriesKind,
    pub label: String,
    pub points: Vec<SeriesPoint>,
}

/// Monthly series starting at `start`'s month. Same inputs, same output.
pub fn generate_series(kind: SeriesKind, start: NaiveDate, months: u32, seed: u64) -> ChartSeries {
    let shape = kind.shape();
    let mut rng = StdRng::seed_from_u64(seed ^ kind as u64);
    let first = start.with_day(1).unwrap_or(start);

    let points = (0..months)
        .filter_map(|i| {
            let date = first.checked_add_months(Months::new(i))?;
            let phase = 2.0 * PI * (date.month() as f64 - shape.peak_month as f64) / 12.0;
            let seasonal = 1.0 + shape.seasonal * phase.cos();
            let noise = 1.0 + shape.noise * rng.random_range(-1.0..=1.0);
            let trend = (1.0 + shape.growth).powi(i as i32);

            let mut value = (shape.base * trend * seasonal * noise).max(0.0);
            if let Some(ceiling) = shape.ceiling {
                value = value.min(ceiling);
            }
            if shape.integral {
                value = value.round();
            } else {
                value = (value * 100.0).round() / 100.0;
            }

            Some(SeriesPoint {
                period: format!("{:04}-{:02}", date.year(), date.month()),
                value,
            })
        })
        .collect();

    ChartSeries {
        kind,
        label: kind.label().to_string(),
        points,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeBreakdown {
    pub property_type: String,
    pub count: usize,
    pub total_insured_value: f64,
    pub total_premium: f64,
}

/// Portfolio split by property type, largest insured value first
pub fn breakdown_by_type(properties: &[Property]) -> Vec<TypeBreakdown> {
    let mut groups: BTreeMap<String, TypeBreakdown> = BTreeMap::new();

    for property in properties {
        let key = if property.property_type.trim().is_empty() {
            "other".to_string()
        } else {
            property.property_type.to_lowercase()
        };
        let entry = groups.entry(key.clone()).or_insert_with(|| TypeBreakdown {
            property_type: key,
            ..Default::default()
        });
        entry.count += 1;
        entry.total_insured_value += property.total_insured_value;
        entry.total_premium += property.total_premium;
    }

    let mut breakdown: Vec<TypeBreakdown> = groups.into_values().collect();
    breakdown.sort_by(|a, b| b.total_insured_value.total_cmp(&a.total_insured_value));
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan_2025() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn test_series_is_reproducible() {
        let a = generate_series(SeriesKind::PremiumTrend, jan_2025(), 12, 7);
        let b = generate_series(SeriesKind::PremiumTrend, jan_2025(), 12, 7);
        assert_eq!(a, b);

        let c = generate_series(SeriesKind::PremiumTrend, jan_2025(), 12, 8);
        assert_ne!(a, c);
    }

    #[test]
    fn test_series_periods() {
        let series = generate_series(SeriesKind::LossRatio, jan_2025(), 14, 1);
        assert_eq!(series.points.len(), 14);
        assert_eq!(series.points[0].period, "2025-01");
        assert_eq!(series.points[13].period, "2026-02");
    }

    #[test]
    fn test_claims_are_whole_and_non_negative() {
        let series = generate_series(SeriesKind::ClaimsFrequency, jan_2025(), 36, 42);
        for point in &series.points {
            assert!(point.value >= 0.0);
            assert_eq!(point.value, point.value.round());
        }
    }

    #[test]
    fn test_loss_ratio_respects_ceiling() {
        for seed in 0..20 {
            let series = generate_series(SeriesKind::LossRatio, jan_2025(), 24, seed);
            assert!(series.points.iter().all(|p| p.value <= 150.0));
        }
    }

    #[test]
    fn test_breakdown_groups_and_orders() {
        let json = r#"[
            {"id": "1", "name": "a", "property_type": "Multifamily", "total_insured_value": 100.0, "total_premium": 1.0},
            {"id": "2", "name": "b", "property_type": "retail", "total_insured_value": 500.0, "total_premium": 5.0},
            {"id": "3", "name": "c", "property_type": "multifamily", "total_insured_value": 300.0, "total_premium": 3.0},
            {"id": "4", "name": "d"}
        ]"#;
        let properties: Vec<Property> = serde_json::from_str(json).unwrap();
        let breakdown = breakdown_by_type(&properties);

        assert_eq!(breakdown.len(), 3);
        assert_eq!(breakdown[0].property_type, "retail");
        assert_eq!(breakdown[1].property_type, "multifamily");
        assert_eq!(breakdown[1].count, 2);
        assert_eq!(breakdown[1].total_insured_value, 400.0);
        assert_eq!(breakdown[2].property_type, "other");
    }
}
