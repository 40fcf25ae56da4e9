mod common;

use market_monitor::analysis::status::{BondTrend, VolatilityTrend};
use market_monitor::analysis::{
    analyze_market_status, compute_changes, direction_for_category, significant_changes,
    CategoryChanges, ChangeRecord, MarketDirection, RiskLevel,
};
use market_monitor::domain_types::{Category, ComparisonMode};
use rstest::rstest;
use std::collections::BTreeMap;

use common::values;

/// 產生 `up` 個上漲、`down` 個下跌，其餘持平，共 `total` 筆
fn records(up: usize, down: usize, total: usize) -> BTreeMap<String, ChangeRecord> {
    let mut current = Vec::new();
    let mut previous = Vec::new();
    for i in 0..total {
        let name = format!("M{:02}", i);
        let now = if i < up {
            110.0
        } else if i < up + down {
            90.0
        } else {
            100.0
        };
        current.push((name.clone(), Some(now)));
        previous.push((name, Some(100.0)));
    }
    let borrow = |entries: &[(String, Option<f64>)]| {
        values(
            &entries
                .iter()
                .map(|(name, value)| (name.as_str(), *value))
                .collect::<Vec<_>>(),
        )
    };
    compute_changes(&borrow(&current), &borrow(&previous), ComparisonMode::Percentage)
}

#[rstest]
#[case(7, 0, 10, MarketDirection::StronglyUp)]
#[case(6, 0, 10, MarketDirection::SlightlyUp)]
#[case(5, 5, 10, MarketDirection::Mixed)]
#[case(5, 0, 10, MarketDirection::Mixed)]
#[case(0, 6, 10, MarketDirection::SlightlyDown)]
#[case(1, 7, 10, MarketDirection::StronglyDown)]
#[case(2, 1, 3, MarketDirection::StronglyUp)]
#[case(0, 0, 0, MarketDirection::Undefined)]
fn test_direction_thresholds(
    #[case] up: usize,
    #[case] down: usize,
    #[case] total: usize,
    #[case] expected: MarketDirection,
) {
    assert_eq!(direction_for_category(&records(up, down, total)), expected);
}

#[test]
fn test_missing_data_counts_against_ratio() {
    // 兩檔上漲、一檔無前值：2/3 仍為強漲，但 2/4 只是混合
    let current = values(&[("A", Some(2.0)), ("B", Some(2.0)), ("C", Some(2.0))]);
    let previous = values(&[("A", Some(1.0)), ("B", Some(1.0))]);
    let changes = compute_changes(&current, &previous, ComparisonMode::Percentage);
    assert_eq!(direction_for_category(&changes), MarketDirection::StronglyUp);

    let current = values(&[
        ("A", Some(2.0)),
        ("B", Some(2.0)),
        ("C", Some(2.0)),
        ("D", Some(2.0)),
    ]);
    let changes = compute_changes(&current, &previous, ComparisonMode::Percentage);
    assert_eq!(direction_for_category(&changes), MarketDirection::Mixed);
}

fn pct_changes(category: Category, entries: &[(&str, f64)]) -> CategoryChanges {
    let current = values(
        &entries
            .iter()
            .map(|(name, pct)| (*name, Some(100.0 + pct)))
            .collect::<Vec<_>>(),
    );
    let previous = values(
        &entries
            .iter()
            .map(|(name, _)| (*name, Some(100.0)))
            .collect::<Vec<_>>(),
    );
    let mut changes = CategoryChanges::new();
    changes.insert(
        category,
        compute_changes(&current, &previous, ComparisonMode::Percentage),
    );
    changes
}

#[test]
fn test_significant_changes_ordering() {
    let changes = pct_changes(
        Category::GlobalIndices,
        &[("A", 1.5), ("B", -3.2), ("C", 4.0), ("D", -2.1)],
    );

    let significant = significant_changes(&changes, 2.0);
    let pcts: Vec<f64> = significant.iter().map(|s| s.change_pct).collect();
    assert_eq!(pcts, vec![4.0, -3.2, -2.1]);
    assert_eq!(significant[0].metric, "C");
    assert_eq!(significant[0].category, Category::GlobalIndices);
}

#[test]
fn test_threshold_is_inclusive() {
    let changes = pct_changes(Category::Commodities, &[("GOLD", 2.0), ("SILVER", 1.99)]);
    let significant = significant_changes(&changes, 2.0);
    assert_eq!(significant.len(), 1);
    assert_eq!(significant[0].metric, "GOLD");
}

#[test]
fn test_full_status() {
    let mut changes = pct_changes(Category::LocalIndices, &[("KOSPI", 1.0), ("KOSDAQ", 2.5)]);
    changes.extend(pct_changes(Category::Volatility, &[("VIX", -10.0)]));
    changes.insert(
        Category::Bonds,
        compute_changes(
            &values(&[("US_10Y", Some(4.35)), ("US_2Y", Some(4.1))]),
            &values(&[("US_10Y", Some(4.25)), ("US_2Y", Some(4.1))]),
            ComparisonMode::Absolute,
        ),
    );

    let status = analyze_market_status(&changes, 2.0);

    assert_eq!(
        status.market_direction[&Category::LocalIndices],
        MarketDirection::StronglyUp
    );
    assert_eq!(
        status.market_direction[&Category::GlobalIndices],
        MarketDirection::Undefined
    );
    assert_eq!(status.risk_indicators.bond_market, BondTrend::YieldRising);
    // VIX 現值 90 → 極高風險
    assert_eq!(status.risk_indicators.volatility_change.level, RiskLevel::VeryHigh);
    assert_eq!(
        status.risk_indicators.volatility_change.trend,
        VolatilityTrend::Down
    );

    let metrics: Vec<&str> = status
        .significant_changes
        .iter()
        .map(|s| s.metric.as_str())
        .collect();
    assert_eq!(metrics, vec!["VIX", "KOSDAQ"]);

    let json = serde_json::to_value(&status).unwrap();
    assert_eq!(json["risk_indicators"]["volatility_change"]["level"], "VERY HIGH");
}

#[test]
fn test_invalid_threshold_yields_empty_status() {
    let changes = pct_changes(Category::LocalIndices, &[("KOSPI", 5.0)]);
    let status = analyze_market_status(&changes, f64::NAN);
    assert!(status.market_direction.is_empty());
    assert!(status.significant_changes.is_empty());
}
