//! Mock portfolio used when the backend is unavailable or returns nothing,
//! and served by the development mock server.
//!
//! The dashboard summary is derived from the other fixtures so the numbers
//! on every page agree with each other.

use chrono::{DateTime, NaiveDate, Utc};
use portfolio_types::{
    Address, AlertConfig, AlertStatus, Claim, ClaimStatus, DashboardSummary, Document,
    ExtractionStatus, GapCounts, GeoLocation, Property, RenewalAlert, RenewalForecast,
    RenewalMilestone, RenewalTimeline, Severity, UploadStatus,
};

use crate::properties::effective_days;

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

struct PropertySeed {
    id: &'static str,
    name: &'static str,
    street: &'static str,
    city: &'static str,
    zip: &'static str,
    lat: f64,
    lng: f64,
    kind: &'static str,
    units: u32,
    buildings: u32,
    tiv: f64,
    premium: f64,
    score: u8,
    gaps: (u32, u32, u32),
    days: Option<i64>,
    expires: Option<NaiveDate>,
    carrier: &'static str,
}

fn seeds() -> Vec<PropertySeed> {
    vec![
        PropertySeed {
            id: "prop-001",
            name: "Harbor View Apartments",
            street: "1200 Brickell Bay Dr",
            city: "Miami",
            zip: "33131",
            lat: 25.7617,
            lng: -80.1918,
            kind: "multifamily",
            units: 240,
            buildings: 2,
            tiv: 48_500_000.0,
            premium: 612_000.0,
            score: 92,
            gaps: (0, 1, 2),
            days: Some(18),
            expires: date(2026, 11, 6),
            carrier: "Travelers",
        },
        PropertySeed {
            id: "prop-002",
            name: "Oak Court Townhomes",
            street: "455 Bayshore Blvd",
            city: "Tampa",
            zip: "33606",
            lat: 27.9506,
            lng: -82.4572,
            kind: "multifamily",
            units: 64,
            buildings: 8,
            tiv: 14_200_000.0,
            premium: 188_500.0,
            score: 84,
            gaps: (0, 2, 1),
            days: Some(42),
            expires: date(2026, 11, 30),
            carrier: "Chubb",
        },
        PropertySeed {
            id: "prop-003",
            name: "Pine Ridge Plaza",
            street: "78 Orange Ave",
            city: "Orlando",
            zip: "32801",
            lat: 28.5383,
            lng: -81.3792,
            kind: "retail",
            units: 22,
            buildings: 1,
            tiv: 21_750_000.0,
            premium: 246_000.0,
            score: 71,
            gaps: (1, 2, 0),
            days: Some(75),
            expires: date(2027, 1, 2),
            carrier: "Zurich",
        },
        PropertySeed {
            id: "prop-004",
            name: "Cypress Landing",
            street: "3300 Gulf Shore Blvd",
            city: "Naples",
            zip: "34103",
            lat: 26.1420,
            lng: -81.7948,
            kind: "multifamily",
            units: 132,
            buildings: 3,
            tiv: 36_900_000.0,
            premium: 534_000.0,
            score: 63,
            gaps: (2, 1, 1),
            days: Some(9),
            expires: date(2026, 10, 28),
            carrier: "Citizens",
        },
        PropertySeed {
            id: "prop-005",
            name: "Riverside Office Park",
            street: "501 Riverside Ave",
            city: "Jacksonville",
            zip: "32202",
            lat: 30.3322,
            lng: -81.6557,
            kind: "office",
            units: 40,
            buildings: 4,
            tiv: 52_300_000.0,
            premium: 401_000.0,
            score: 88,
            gaps: (0, 0, 2),
            days: Some(150),
            expires: date(2027, 3, 18),
            carrier: "Liberty Mutual",
        },
        PropertySeed {
            id: "prop-006",
            name: "Sunset Palms",
            street: "900 Ocean Dr",
            city: "Miami Beach",
            zip: "33139",
            lat: 25.7907,
            lng: -80.1300,
            kind: "mixed_use",
            units: 58,
            buildings: 1,
            tiv: 27_400_000.0,
            premium: 455_000.0,
            score: 55,
            gaps: (3, 2, 0),
            days: Some(-4),
            expires: date(2026, 10, 15),
            carrier: "Heritage",
        },
        PropertySeed {
            id: "prop-007",
            name: "Magnolia Storage",
            street: "12 Industrial Way",
            city: "Tallahassee",
            zip: "32301",
            lat: 30.4383,
            lng: -84.2807,
            kind: "industrial",
            units: 410,
            buildings: 6,
            tiv: 9_800_000.0,
            premium: 72_400.0,
            score: 79,
            gaps: (0, 1, 3),
            days: None,
            expires: None,
            carrier: "Hartford",
        },
        PropertySeed {
            id: "prop-008",
            name: "Coral Gables Commons",
            street: "2200 Ponce de Leon Blvd",
            city: "Coral Gables",
            zip: "33134",
            lat: 25.7215,
            lng: -80.2684,
            kind: "retail",
            units: 18,
            buildings: 2,
            tiv: 18_600_000.0,
            premium: 231_000.0,
            score: 96,
            gaps: (0, 0, 0),
            days: Some(58),
            expires: date(2026, 12, 16),
            carrier: "AIG",
        },
    ]
}

pub fn properties() -> Vec<Property> {
    seeds()
        .into_iter()
        .map(|s| {
            let (critical, warning, info) = s.gaps;
            Property {
                id: s.id.to_string(),
                name: s.name.to_string(),
                address: Address {
                    street: s.street.to_string(),
                    city: s.city.to_string(),
                    state: "FL".to_string(),
                    zip: s.zip.to_string(),
                },
                geolocation: Some(GeoLocation {
                    lat: s.lat,
                    lng: s.lng,
                }),
                property_type: s.kind.to_string(),
                unit_count: s.units,
                building_count: s.buildings,
                total_insured_value: s.tiv,
                total_premium: s.premium,
                health_score: f64::from(s.score),
                gaps: GapCounts {
                    critical,
                    warning,
                    info,
                },
                expiration_date: s.expires,
                days_until_expiration: s.days,
                compliance_status: if critical > 0 {
                    "non_compliant".to_string()
                } else {
                    "compliant".to_string()
                },
                completeness_pct: f64::from(s.score.min(100)).max(40.0),
            }
        })
        .collect()
}

pub fn claims() -> Vec<Claim> {
    #[rustfmt::skip]
    let rows: [(&str, &str, &str, ClaimStatus, &str, f64, u32, bool); 10] = [
        ("clm-1001", "prop-001", "Harbor View Apartments", ClaimStatus::Open, "water_damage", 18_400.0, 3, false),
        ("clm-1002", "prop-004", "Cypress Landing", ClaimStatus::Open, "wind", 126_000.0, 7, true),
        ("clm-1003", "prop-006", "Sunset Palms", ClaimStatus::Open, "flood", 342_500.0, 12, true),
        ("clm-1004", "prop-002", "Oak Court Townhomes", ClaimStatus::InReview, "fire", 64_200.0, 5, false),
        ("clm-1005", "prop-003", "Pine Ridge Plaza", ClaimStatus::InReview, "liability", 22_000.0, 2, false),
        ("clm-1006", "prop-005", "Riverside Office Park", ClaimStatus::Processing, "theft", 8_750.0, 4, false),
        ("clm-1007", "prop-001", "Harbor View Apartments", ClaimStatus::Processing, "wind", 51_300.0, 6, true),
        ("clm-1008", "prop-008", "Coral Gables Commons", ClaimStatus::Closed, "water_damage", 12_900.0, 2, false),
        ("clm-1009", "prop-007", "Magnolia Storage", ClaimStatus::Closed, "vandalism", 4_300.0, 1, false),
        ("clm-1010", "prop-004", "Cypress Landing", ClaimStatus::Closed, "wind", 88_000.0, 9, false),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, (id, property_id, property_name, status, kind, amount, attachments, alert))| {
            let day = 1 + i as u32 * 2;
            Claim {
                id: id.to_string(),
                claim_number: id.to_uppercase(),
                property_id: property_id.to_string(),
                property_name: Some(property_name.to_string()),
                status: *status,
                claim_type: kind.to_string(),
                date_of_loss: date(2026, 8, day),
                date_reported: date(2026, 8, day + 2),
                amount_incurred: *amount,
                attachment_count: *attachments,
                has_alert: *alert,
            }
        })
        .collect()
}

fn alert_rows() -> Vec<(&'static str, &'static str, Severity, i64, AlertStatus)> {
    vec![
        ("alert-01", "prop-006", Severity::Critical, 30, AlertStatus::Pending),
        ("alert-02", "prop-004", Severity::Critical, 30, AlertStatus::Pending),
        ("alert-03", "prop-001", Severity::Critical, 30, AlertStatus::Acknowledged),
        ("alert-04", "prop-002", Severity::Warning, 60, AlertStatus::Pending),
        ("alert-05", "prop-008", Severity::Warning, 60, AlertStatus::Resolved),
        ("alert-06", "prop-003", Severity::Info, 90, AlertStatus::Expired),
    ]
}

pub fn renewal_alerts() -> Vec<RenewalAlert> {
    let names: std::collections::HashMap<String, String> = properties()
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();

    alert_rows()
        .into_iter()
        .enumerate()
        .map(|(i, (id, property_id, severity, trigger_days, status))| {
            let name = names.get(property_id).cloned().unwrap_or_default();
            let created = timestamp(1_788_000_000 + i as i64 * 86_400);
            RenewalAlert {
                id: id.to_string(),
                property_id: property_id.to_string(),
                title: format!("{} renewal within {} days", name, trigger_days),
                message: format!(
                    "Policy for {} expires within {} days. Start marketing the renewal.",
                    name, trigger_days
                ),
                severity,
                trigger_days,
                status,
                created_at: created,
                acknowledged_at: matches!(status, AlertStatus::Acknowledged | AlertStatus::Resolved)
                    .then(|| timestamp(1_788_000_000 + i as i64 * 86_400 + 3_600)),
                resolved_at: (status == AlertStatus::Resolved)
                    .then(|| timestamp(1_788_000_000 + i as i64 * 86_400 + 7_200)),
                resolution_notes: (status == AlertStatus::Resolved)
                    .then(|| "Bound renewal with incumbent carrier".to_string()),
            }
        })
        .collect()
}

pub fn renewal_timelines() -> Vec<RenewalTimeline> {
    let alerts = renewal_alerts();

    seeds()
        .into_iter()
        .zip(properties())
        .filter(|(seed, _)| seed.days.is_some())
        .map(|(seed, property)| {
            let active_alerts = alerts
                .iter()
                .filter(|a| a.property_id == property.id && a.status.is_active())
                .count() as u32;

            RenewalTimeline {
                days_until_expiration: effective_days(&property),
                property_id: property.id,
                property_name: property.name,
                expiration_date: property.expiration_date,
                current_premium: property.total_premium,
                carrier: Some(seed.carrier.to_string()),
                active_alerts,
                milestones: vec![
                    RenewalMilestone {
                        name: "Submission to market".to_string(),
                        due_date: property
                            .expiration_date
                            .and_then(|d| d.checked_sub_days(chrono::Days::new(90))),
                        completed: effective_days_of(seed.days) < 90,
                    },
                    RenewalMilestone {
                        name: "Quotes received".to_string(),
                        due_date: property
                            .expiration_date
                            .and_then(|d| d.checked_sub_days(chrono::Days::new(45))),
                        completed: effective_days_of(seed.days) < 45,
                    },
                    RenewalMilestone {
                        name: "Bind coverage".to_string(),
                        due_date: property
                            .expiration_date
                            .and_then(|d| d.checked_sub_days(chrono::Days::new(7))),
                        completed: false,
                    },
                ],
            }
        })
        .collect()
}

fn effective_days_of(days: Option<i64>) -> i64 {
    days.unwrap_or(crate::properties::MISSING_EXPIRATION_DAYS)
}

/// Forecasts exist for some properties only, like a partially failed fan-out
pub fn renewal_forecasts() -> Vec<RenewalForecast> {
    let changes = [
        ("prop-001", 8.5, vec!["Coastal wind capacity tightening"]),
        ("prop-002", 4.0, vec!["Favorable loss history"]),
        ("prop-003", 6.2, vec!["Retail liability trend"]),
        ("prop-004", 18.0, vec!["Open wind claim", "Reinsurance cost increase"]),
        ("prop-006", 24.5, vec!["Flood loss", "Carrier exiting market"]),
        ("prop-008", -2.0, vec!["Roof replacement completed"]),
    ];
    let premiums: std::collections::HashMap<String, f64> = properties()
        .into_iter()
        .map(|p| (p.id, p.total_premium))
        .collect();

    changes
        .into_iter()
        .map(|(id, change_pct, factors)| {
            let current = premiums.get(id).copied().unwrap_or_default();
            let mid = (current * (1.0 + change_pct / 100.0)).round();
            RenewalForecast {
                property_id: id.to_string(),
                current_premium: current,
                low: (mid * 0.94).round(),
                mid,
                high: (mid * 1.08).round(),
                change_pct,
                factors: factors.into_iter().map(String::from).collect(),
            }
        })
        .collect()
}

pub fn documents() -> Vec<Document> {
    #[rustfmt::skip]
    let rows = [
        ("doc-01", "harbor-view-policy-2025.pdf", Some("policy"), UploadStatus::Uploaded, ExtractionStatus::Completed, Some(0.97), Some("prop-001")),
        ("doc-02", "oak-court-sov.xlsx", Some("statement_of_values"), UploadStatus::Uploaded, ExtractionStatus::Completed, Some(0.91), Some("prop-002")),
        ("doc-03", "pine-ridge-coi.pdf", Some("certificate"), UploadStatus::Uploaded, ExtractionStatus::Processing, None, Some("prop-003")),
        ("doc-04", "cypress-loss-runs.pdf", Some("loss_run"), UploadStatus::Uploaded, ExtractionStatus::Failed, Some(0.32), Some("prop-004")),
        ("doc-05", "scan-0042.pdf", None, UploadStatus::Uploading, ExtractionStatus::Pending, None, None),
    ];

    rows.into_iter()
        .enumerate()
        .map(
            |(i, (id, filename, kind, upload, extraction, confidence, property_id))| Document {
                id: id.to_string(),
                filename: filename.to_string(),
                document_type: kind.map(String::from),
                upload_status: upload,
                extraction_status: extraction,
                confidence,
                property_id: property_id.map(String::from),
                uploaded_at: Some(timestamp(1_787_000_000 + i as i64 * 3_600)),
            },
        )
        .collect()
}

pub fn alert_configs() -> Vec<AlertConfig> {
    properties()
        .iter()
        .map(|p| AlertConfig::default_for(&p.id))
        .collect()
}

pub fn dashboard_summary() -> DashboardSummary {
    summarize(&properties(), &claims(), &renewal_alerts())
}

/// Summary numbers derived from whatever records are on hand
pub fn summarize(
    properties: &[Property],
    claims: &[Claim],
    alerts: &[RenewalAlert],
) -> DashboardSummary {
    let count = properties.len();
    let within = |n: i64| {
        properties
            .iter()
            .filter(|p| effective_days(p) <= n)
            .count() as u32
    };

    DashboardSummary {
        property_count: count as u32,
        total_insured_value: properties.iter().map(|p| p.total_insured_value).sum(),
        total_premium: properties.iter().map(|p| p.total_premium).sum(),
        open_claims: claims
            .iter()
            .filter(|c| c.status != ClaimStatus::Closed)
            .count() as u32,
        pending_alerts: alerts
            .iter()
            .filter(|a| a.status == AlertStatus::Pending)
            .count() as u32,
        average_health_score: if count == 0 {
            0.0
        } else {
            properties
                .iter()
                .map(|p| p.health_score)
                .sum::<f64>()
                / count as f64
        },
        expiring_30_days: within(30),
        expiring_60_days: within(60),
        expiring_90_days: within(90),
    }
}
