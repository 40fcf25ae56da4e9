//! 衍生指標計算
//!
//! 每個衍生指標各自檢查輸入，缺少輸入只會略過該指標。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

use crate::analysis::error::{CalculationError, CalculationResult};
use crate::domain_types::{Category, MetricValue, Snapshot};
use crate::utils::round_to;

/// 衍生指標寫入資料表時的欄位前綴
pub const DERIVED_PREFIX: &str = "derived_";

pub const GLOBAL_CORRELATION: &str = "global_correlation";
pub const GOLD_DOLLAR_RATIO: &str = "gold_dollar_ratio";
pub const RISK_LEVEL: &str = "risk_level";
pub const COMMODITY_INDEX: &str = "commodity_index";

/// 以波動率指數分級的風險等級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "MODERATE")]
    Moderate,
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "VERY HIGH")]
    VeryHigh,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl RiskLevel {
    /// `<15` LOW、`<25` MODERATE、`<35` HIGH，其餘 VERY HIGH
    pub fn from_vix(vix: f64) -> Self {
        if !vix.is_finite() {
            RiskLevel::Unknown
        } else if vix < 15.0 {
            RiskLevel::Low
        } else if vix < 25.0 {
            RiskLevel::Moderate
        } else if vix < 35.0 {
            RiskLevel::High
        } else {
            RiskLevel::VeryHigh
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::High => "HIGH",
            RiskLevel::VeryHigh => "VERY HIGH",
            RiskLevel::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 兩個數值的同向指標 `(x*y)/(|x|*|y|)`
///
/// 只反映兩者正負號是否一致（結果為 -1、0 或 1），並非統計相關係數。
/// 分母為零時返回 0。
pub fn co_movement(x: f64, y: f64) -> f64 {
    let denominator = x.abs() * y.abs();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let value = (x * y) / denominator;
    if value.is_finite() {
        round_to(value, 4)
    } else {
        0.0
    }
}

/// 比率，取至小數 4 位
pub fn ratio(numerator: f64, denominator: f64) -> CalculationResult<f64> {
    if denominator == 0.0 {
        return Err(CalculationError::DivisionByZero);
    }
    let value = numerator / denominator;
    if !value.is_finite() {
        return Err(CalculationError::NonFiniteResult(format!(
            "{} / {}",
            numerator, denominator
        )));
    }
    Ok(round_to(value, 4))
}

/// 類別內所有有值項目的平均，取至小數 2 位；沒有任何值時返回 `None`
pub fn category_mean<'a, I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Option<MetricValue>>,
{
    let present: Vec<f64> = values
        .into_iter()
        .filter_map(|value| value.as_ref().and_then(MetricValue::as_f64))
        .filter(|value| value.is_finite())
        .collect();
    if present.is_empty() {
        return None;
    }
    let mean = present.iter().sum::<f64>() / present.len() as f64;
    mean.is_finite().then(|| round_to(mean, 2))
}

/// 有值且非零的數值
fn nonzero(snapshot: &Snapshot, category: Category, name: &str) -> Option<f64> {
    snapshot
        .number(category, name)
        .filter(|value| *value != 0.0 && value.is_finite())
}

/// 由完整快照計算衍生指標
pub fn calculate_derived(snapshot: &Snapshot) -> BTreeMap<String, MetricValue> {
    let mut derived = BTreeMap::new();

    if let (Some(kospi), Some(snp)) = (
        nonzero(snapshot, Category::LocalIndices, "KOSPI"),
        nonzero(snapshot, Category::GlobalIndices, "S&P500"),
    ) {
        derived.insert(
            GLOBAL_CORRELATION.to_string(),
            MetricValue::Number(co_movement(kospi, snp)),
        );
    }

    if let (Some(gold), Some(usd)) = (
        nonzero(snapshot, Category::Commodities, "GOLD"),
        nonzero(snapshot, Category::ExchangeRates, "USD/KRW"),
    ) {
        match ratio(gold, usd) {
            Ok(value) => {
                derived.insert(GOLD_DOLLAR_RATIO.to_string(), MetricValue::Number(value));
            }
            Err(e) => warn!("{} 計算失敗: {}", GOLD_DOLLAR_RATIO, e),
        }
    }

    if let Some(vix) = nonzero(snapshot, Category::Volatility, "VIX") {
        derived.insert(
            RISK_LEVEL.to_string(),
            MetricValue::from(RiskLevel::from_vix(vix).as_str()),
        );
    }

    if let Some(mean) = snapshot
        .category(Category::Commodities)
        .and_then(|commodities| category_mean(commodities.values()))
    {
        derived.insert(COMMODITY_INDEX.to_string(), MetricValue::Number(mean));
    }

    debug!("衍生指標計算完成: {} 項", derived.len());
    derived
}

/// 加上資料表欄位前綴
pub fn prefixed(name: &str) -> String {
    format!("{}{}", DERIVED_PREFIX, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_types::MetricValues;
    use chrono::NaiveDate;

    fn snapshot(entries: &[(Category, &str, Option<f64>)]) -> Snapshot {
        let mut values: BTreeMap<Category, MetricValues> = BTreeMap::new();
        for (category, name, value) in entries {
            values
                .entry(*category)
                .or_default()
                .insert(name.to_string(), value.map(MetricValue::Number));
        }
        let timestamp = NaiveDate::from_ymd_opt(2024, 11, 8)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap();
        Snapshot::new(timestamp, values)
    }

    #[test]
    fn test_risk_level_cutoffs() {
        assert_eq!(RiskLevel::from_vix(14.99), RiskLevel::Low);
        assert_eq!(RiskLevel::from_vix(15.0), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_vix(25.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_vix(35.0), RiskLevel::VeryHigh);
        assert_eq!(RiskLevel::VeryHigh.to_string(), "VERY HIGH");
    }

    #[test]
    fn test_co_movement_is_sign_agreement() {
        assert_eq!(co_movement(2500.0, 5900.0), 1.0);
        assert_eq!(co_movement(-1.5, 3.0), -1.0);
        assert_eq!(co_movement(0.0, 3.0), 0.0);
    }

    #[test]
    fn test_ratio_guards_zero() {
        assert_eq!(ratio(2650.0, 1380.0), Ok(1.9203));
        assert_eq!(ratio(1.0, 0.0), Err(CalculationError::DivisionByZero));
    }

    #[test]
    fn test_full_snapshot() {
        let snapshot = snapshot(&[
            (Category::LocalIndices, "KOSPI", Some(2500.0)),
            (Category::GlobalIndices, "S&P500", Some(5900.0)),
            (Category::Commodities, "GOLD", Some(2650.0)),
            (Category::Commodities, "SILVER", Some(31.0)),
            (Category::Commodities, "COPPER", None),
            (Category::ExchangeRates, "USD/KRW", Some(1380.0)),
            (Category::Volatility, "VIX", Some(18.2)),
        ]);

        let derived = calculate_derived(&snapshot);
        assert_eq!(derived[GLOBAL_CORRELATION], MetricValue::Number(1.0));
        assert_eq!(derived[GOLD_DOLLAR_RATIO], MetricValue::Number(1.9203));
        assert_eq!(derived[RISK_LEVEL], MetricValue::from("MODERATE"));
        assert_eq!(derived[COMMODITY_INDEX], MetricValue::Number(1340.5));
    }

    #[test]
    fn test_missing_inputs_skip_only_their_indicator() {
        let snapshot = snapshot(&[
            (Category::LocalIndices, "KOSPI", None),
            (Category::GlobalIndices, "S&P500", Some(5900.0)),
            (Category::Commodities, "GOLD", None),
            (Category::Volatility, "VIX", Some(40.0)),
        ]);

        let derived = calculate_derived(&snapshot);
        assert!(!derived.contains_key(GLOBAL_CORRELATION));
        assert!(!derived.contains_key(GOLD_DOLLAR_RATIO));
        assert!(!derived.contains_key(COMMODITY_INDEX));
        assert_eq!(derived[RISK_LEVEL], MetricValue::from("VERY HIGH"));
    }

    #[test]
    fn test_prefixed() {
        assert_eq!(prefixed(RISK_LEVEL), "derived_risk_level");
    }
}
