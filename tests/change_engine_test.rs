mod common;

use assert_matches::assert_matches;
use market_monitor::analysis::{compute_changes, ChangeStatus};
use market_monitor::domain_types::{ComparisonMode, Direction, MetricValue, MetricValues};
use proptest::prelude::*;
use rstest::rstest;

use common::values;

#[rstest]
#[case(1400.0, 1380.0, 20.0, Some(1.45), Direction::Up)]
#[case(2450.0, 2500.0, -50.0, Some(-2.0), Direction::Down)]
#[case(14.0, 14.0, 0.0, Some(0.0), Direction::Unchanged)]
#[case(-5.0, -10.0, 5.0, Some(50.0), Direction::Up)]
fn test_percentage_change(
    #[case] current: f64,
    #[case] previous: f64,
    #[case] change_value: f64,
    #[case] change_pct: Option<f64>,
    #[case] direction: Direction,
) {
    let changes = compute_changes(
        &values(&[("X", Some(current))]),
        &values(&[("X", Some(previous))]),
        ComparisonMode::Percentage,
    );

    let record = &changes["X"];
    assert_eq!(record.change_value, Some(change_value));
    assert_eq!(record.change_pct, change_pct);
    assert_eq!(record.direction, Some(direction));
    assert_eq!(record.status, None);
}

#[test]
fn test_zero_previous_has_no_percentage() {
    let changes = compute_changes(
        &values(&[("X", Some(3.0))]),
        &values(&[("X", Some(0.0))]),
        ComparisonMode::Percentage,
    );

    let record = &changes["X"];
    assert_eq!(record.change_value, Some(3.0));
    assert!(!record.has_pct());
    assert_eq!(record.direction, Some(Direction::Up));
}

#[test]
fn test_absolute_mode_for_yields() {
    let changes = compute_changes(
        &values(&[("US_10Y", Some(4.35))]),
        &values(&[("US_10Y", Some(4.25))]),
        ComparisonMode::Absolute,
    );

    let record = &changes["US_10Y"];
    assert_eq!(record.change_value, Some(0.1));
    assert_eq!(record.change_pct, None);
    assert_eq!(record.direction, Some(Direction::Up));
}

#[test]
fn test_missing_sides_are_no_comparison() {
    let current = values(&[("A", Some(1.0)), ("B", None), ("C", Some(2.0))]);
    let previous = values(&[("A", None), ("B", Some(1.0))]);

    let changes = compute_changes(&current, &previous, ComparisonMode::Percentage);

    assert_eq!(changes.len(), 3);
    for record in changes.values() {
        assert_eq!(record.status, Some(ChangeStatus::NoComparisonData));
        assert_eq!(record.change_value, None);
    }
    assert_eq!(changes["B"].previous, Some(MetricValue::Number(1.0)));
}

#[test]
fn test_text_values_report_change() {
    let mut current = MetricValues::new();
    current.insert("risk".into(), Some(MetricValue::Text("HIGH".into())));
    let mut previous = MetricValues::new();
    previous.insert("risk".into(), Some(MetricValue::Text("LOW".into())));

    let changes = compute_changes(&current, &previous, ComparisonMode::Percentage);
    let json = serde_json::to_value(&changes["risk"]).unwrap();
    assert_eq!(json["change"], "CHANGED");
    assert!(json.get("change_pct").is_none());
}

#[test]
fn test_mixed_types_are_calculation_errors() {
    let mut current = MetricValues::new();
    current.insert("risk".into(), Some(MetricValue::Text("HIGH".into())));
    let previous = values(&[("risk", Some(1.0))]);

    let changes = compute_changes(&current, &previous, ComparisonMode::Percentage);
    let record = &changes["risk"];
    assert_matches!(record.status, Some(ChangeStatus::CalculationError));
    assert!(record.error.is_some());
}

#[test]
fn test_non_finite_operand_does_not_abort_batch() {
    let current = values(&[("bad", Some(f64::NAN)), ("good", Some(2.0))]);
    let previous = values(&[("bad", Some(1.0)), ("good", Some(1.0))]);

    let changes = compute_changes(&current, &previous, ComparisonMode::Percentage);

    assert_eq!(changes["bad"].status, Some(ChangeStatus::CalculationError));
    assert_eq!(changes["good"].change_pct, Some(100.0));
}

fn metric_values() -> impl Strategy<Value = MetricValues> {
    prop::collection::btree_map(
        "[A-E]",
        prop::option::of(prop_oneof![
            prop::num::f64::ANY.prop_map(MetricValue::Number),
            "[a-z]{1,3}".prop_map(MetricValue::Text),
        ]),
        0..6,
    )
}

proptest! {
    #[test]
    fn prop_one_record_per_current_key(
        current in metric_values(),
        previous in metric_values(),
        absolute in any::<bool>(),
    ) {
        let mode = if absolute { ComparisonMode::Absolute } else { ComparisonMode::Percentage };
        let changes = compute_changes(&current, &previous, mode);

        prop_assert_eq!(changes.len(), current.len());
        prop_assert!(changes.keys().eq(current.keys()));
        for record in changes.values() {
            if let Some(pct) = record.change_pct {
                prop_assert!(pct.is_finite());
            }
            if mode == ComparisonMode::Absolute {
                prop_assert!(record.change_pct.is_none());
            }
        }
    }

    #[test]
    fn prop_zero_previous_never_has_percentage(current in -1.0e9f64..1.0e9) {
        let changes = compute_changes(
            &values(&[("X", Some(current))]),
            &values(&[("X", Some(0.0))]),
            ComparisonMode::Percentage,
        );
        prop_assert!(changes["X"].change_pct.is_none());
        prop_assert!(changes["X"].change_value.is_some());
    }
}
