//! Property-based tests for the dashboard derivations
//!
//! Test categories:
//! - Property filtering (only matches, order preserved)
//! - Sorting (idempotent, stable)
//! - Missing expiration handling at the N / N+1 boundary
//! - Kanban moves (exactly once, nothing else touched)
//! - Renewal urgency partition

use std::collections::HashMap;

use portfolio_engine::{
    derive_property_view, filter_properties, summarize_renewals, ExpirationFilter, KanbanBoard,
    PropertyFilter, PropertySort, SortDirection, SortField, UrgencyBucket,
    MISSING_EXPIRATION_DAYS,
};
use portfolio_types::{Address, Claim, ClaimStatus, HealthGrade, Property, RenewalTimeline};
use proptest::prelude::*;

// ============================================================
// Strategies
// ============================================================

fn arb_property() -> impl Strategy<Value = Property> {
    (
        "[A-Za-z ]{1,12}",
        prop_oneof![Just("Miami"), Just("Tampa"), Just("Orlando"), Just("Naples")],
        0u8..=100,
        prop::option::of(-30i64..400),
        0.0f64..1e8,
        0.0f64..1e6,
    )
        .prop_map(|(name, city, score, days, tiv, premium)| Property {
            id: String::new(),
            name,
            address: Address {
                street: "1 Main St".to_string(),
                city: city.to_string(),
                state: "FL".to_string(),
                zip: "33101".to_string(),
            },
            geolocation: None,
            property_type: "multifamily".to_string(),
            unit_count: 1,
            building_count: 1,
            total_insured_value: tiv,
            total_premium: premium,
            health_score: f64::from(score),
            gaps: Default::default(),
            expiration_date: None,
            days_until_expiration: days,
            compliance_status: String::new(),
            completeness_pct: 0.0,
        })
}

/// Properties with ids equal to their input position
fn arb_properties() -> impl Strategy<Value = Vec<Property>> {
    prop::collection::vec(arb_property(), 0..40).prop_map(|mut props| {
        for (i, p) in props.iter_mut().enumerate() {
            p.id = format!("p{:03}", i);
        }
        props
    })
}

fn arb_filter() -> impl Strategy<Value = PropertyFilter> {
    (
        prop_oneof![Just(""), Just("a"), Just("miami"), Just("TAMPA"), Just("main")],
        prop::option::of(prop_oneof![
            Just(HealthGrade::A),
            Just(HealthGrade::B),
            Just(HealthGrade::C),
            Just(HealthGrade::D),
            Just(HealthGrade::F),
        ]),
        prop_oneof![
            Just(ExpirationFilter::All),
            (-10i64..1000).prop_map(ExpirationFilter::WithinDays),
        ],
    )
        .prop_map(|(search, grade, expiration)| PropertyFilter {
            search: search.to_string(),
            grade,
            expiration,
        })
}

fn arb_sort() -> impl Strategy<Value = PropertySort> {
    (
        prop_oneof![
            Just(SortField::Name),
            Just(SortField::Health),
            Just(SortField::Tiv),
            Just(SortField::Premium),
            Just(SortField::Expiration),
        ],
        prop_oneof![Just(SortDirection::Asc), Just(SortDirection::Desc)],
    )
        .prop_map(|(field, direction)| PropertySort::new(field, direction))
}

fn arb_status() -> impl Strategy<Value = ClaimStatus> {
    prop_oneof![
        Just(ClaimStatus::Open),
        Just(ClaimStatus::InReview),
        Just(ClaimStatus::Processing),
        Just(ClaimStatus::Closed),
    ]
}

fn arb_claims() -> impl Strategy<Value = Vec<Claim>> {
    prop::collection::vec(arb_status(), 1..30).prop_map(|statuses| {
        statuses
            .into_iter()
            .enumerate()
            .map(|(i, status)| Claim {
                id: format!("c{}", i),
                claim_number: format!("CLM-{}", i),
                property_id: "p1".to_string(),
                property_name: None,
                status,
                claim_type: "wind".to_string(),
                date_of_loss: None,
                date_reported: None,
                amount_incurred: i as f64,
                attachment_count: 0,
                has_alert: false,
            })
            .collect()
    })
}

fn timeline(days: i64) -> RenewalTimeline {
    RenewalTimeline {
        property_id: format!("p{}", days),
        property_name: String::new(),
        expiration_date: None,
        days_until_expiration: days,
        current_premium: 0.0,
        carrier: None,
        active_alerts: 0,
        milestones: Vec::new(),
    }
}

fn ids(props: &[Property]) -> Vec<String> {
    props.iter().map(|p| p.id.clone()).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // ============================================================
    // Filtering
    // ============================================================

    /// Property: every filtered element satisfies the filter and order is preserved
    #[test]
    fn filter_returns_only_matches_in_order(props in arb_properties(), filter in arb_filter()) {
        let kept = filter_properties(&props, &filter);
        prop_assert!(kept.iter().all(|p| filter.matches(p)));

        // ids encode input position, so input order means ascending ids
        let kept_ids: Vec<&str> = kept.iter().map(|p| p.id.as_str()).collect();
        let mut sorted = kept_ids.clone();
        sorted.sort();
        prop_assert_eq!(&kept_ids, &sorted);

        let expected = props.iter().filter(|p| filter.matches(p)).count();
        prop_assert_eq!(kept.len(), expected);
    }

    // ============================================================
    // Sorting
    // ============================================================

    /// Property: sorting a sorted list by the same key changes nothing
    #[test]
    fn sort_is_idempotent(props in arb_properties(), sort in arb_sort()) {
        let once = derive_property_view(&props, &PropertyFilter::default(), &sort);
        let twice = derive_property_view(&once, &PropertyFilter::default(), &sort);
        prop_assert_eq!(ids(&once), ids(&twice));
    }

    /// Property: equal keys keep input order (ids ascend within a tie)
    #[test]
    fn sort_is_stable(props in arb_properties(), sort in arb_sort()) {
        let view = derive_property_view(&props, &PropertyFilter::default(), &sort);
        for pair in view.windows(2) {
            if sort.compare(&pair[0], &pair[1]) == std::cmp::Ordering::Equal {
                prop_assert!(pair[0].id < pair[1].id);
            }
        }
    }

    // ============================================================
    // Missing expiration
    // ============================================================

    /// Property: a missing expiration behaves exactly like 999 days at N and N+1
    #[test]
    fn missing_expiration_is_999(mut prop in arb_property(), n in 990i64..1010) {
        prop.days_until_expiration = None;
        let props = vec![prop];

        let within = |days: i64| PropertyFilter {
            expiration: ExpirationFilter::WithinDays(days),
            ..Default::default()
        };
        let kept_at_n = !filter_properties(&props, &within(n)).is_empty();
        prop_assert_eq!(kept_at_n, MISSING_EXPIRATION_DAYS <= n);

        let kept_at_999 = !filter_properties(&props, &within(MISSING_EXPIRATION_DAYS)).is_empty();
        let kept_at_998 =
            !filter_properties(&props, &within(MISSING_EXPIRATION_DAYS - 1)).is_empty();
        prop_assert!(kept_at_999);
        prop_assert!(!kept_at_998);
    }

    /// Property: within-N keeps N and drops N+1
    #[test]
    fn within_days_boundary(mut prop in arb_property(), n in -30i64..400) {
        prop.days_until_expiration = Some(n);
        let props = vec![prop.clone()];
        let filter = PropertyFilter {
            expiration: ExpirationFilter::WithinDays(n),
            ..Default::default()
        };
        prop_assert_eq!(filter_properties(&props, &filter).len(), 1);

        prop.days_until_expiration = Some(n + 1);
        let props = vec![prop];
        prop_assert!(filter_properties(&props, &filter).is_empty());
    }

    /// Property: under expiration sort a missing value lands where 999 would
    #[test]
    fn missing_expiration_sorts_as_999(props in arb_properties()) {
        let sort = PropertySort::new(SortField::Expiration, SortDirection::Asc);
        let with_nones = derive_property_view(&props, &PropertyFilter::default(), &sort);

        let mut explicit = props.clone();
        for p in explicit.iter_mut() {
            p.days_until_expiration.get_or_insert(MISSING_EXPIRATION_DAYS);
        }
        let with_999 = derive_property_view(&explicit, &PropertyFilter::default(), &sort);
        prop_assert_eq!(ids(&with_nones), ids(&with_999));
    }

    // ============================================================
    // Kanban
    // ============================================================

    /// Property: a cross-column drop moves exactly one claim exactly once
    #[test]
    fn kanban_move_exactly_once(
        claims in arb_claims(),
        pick in any::<prop::sample::Index>(),
        target in arb_status(),
    ) {
        let chosen = pick.get(&claims).clone();
        let mut board = KanbanBoard::from_claims(claims.clone());
        let before: HashMap<ClaimStatus, Vec<String>> = ClaimStatus::COLUMNS
            .iter()
            .map(|s| (*s, board.column(*s).iter().map(|c| c.id.clone()).collect()))
            .collect();

        prop_assert!(board.drag_start(&chosen.id));
        let outcome = board.drop(target);

        if chosen.status == target {
            prop_assert!(!outcome.is_moved());
            for status in ClaimStatus::COLUMNS {
                let now: Vec<String> = board.column(status).iter().map(|c| c.id.clone()).collect();
                prop_assert_eq!(&now, &before[&status]);
            }
        } else {
            prop_assert!(outcome.is_moved());

            let mut expected_source = before[&chosen.status].clone();
            expected_source.retain(|id| id != &chosen.id);
            let mut expected_target = before[&target].clone();
            expected_target.push(chosen.id.clone());

            for status in ClaimStatus::COLUMNS {
                let now: Vec<String> = board.column(status).iter().map(|c| c.id.clone()).collect();
                if status == chosen.status {
                    prop_assert_eq!(&now, &expected_source);
                } else if status == target {
                    prop_assert_eq!(&now, &expected_target);
                } else {
                    prop_assert_eq!(&now, &before[&status]);
                }
            }
            prop_assert_eq!(board.claim(&chosen.id).map(|c| c.status), Some(target));
        }

        prop_assert_eq!(board.total_claims(), claims.len());
    }

    // ============================================================
    // Renewals
    // ============================================================

    /// Property: urgency buckets partition the timelines with no overlap or omission
    #[test]
    fn urgency_buckets_partition(days in prop::collection::vec(-60i64..400, 0..50)) {
        let timelines: Vec<RenewalTimeline> = days.iter().map(|d| timeline(*d)).collect();
        let summary = summarize_renewals(&timelines, &HashMap::new());

        prop_assert_eq!(summary.by_urgency.total(), timelines.len());

        let critical = days
            .iter()
            .filter(|d| UrgencyBucket::for_days(**d) == UrgencyBucket::Critical)
            .count();
        let warning = days.iter().filter(|d| (31..=60).contains(*d)).count();
        let info = days.iter().filter(|d| **d > 60).count();
        prop_assert_eq!(summary.by_urgency.critical, critical);
        prop_assert_eq!(summary.by_urgency.warning, warning);
        prop_assert_eq!(summary.by_urgency.info, info);
        prop_assert_eq!(critical, days.iter().filter(|d| **d <= 30).count());
    }
}

#[test]
fn urgency_example_5_35_70() {
    let timelines = vec![timeline(5), timeline(35), timeline(70)];
    let summary = summarize_renewals(&timelines, &HashMap::new());
    assert_eq!(summary.by_urgency.critical, 1);
    assert_eq!(summary.by_urgency.warning, 1);
    assert_eq!(summary.by_urgency.info, 1);
}
