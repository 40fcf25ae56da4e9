//! 指標變動計算

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::analysis::error::{CalculationError, CalculationResult};
use crate::domain_types::{ComparisonMode, Direction, MetricValue, MetricValues};
use crate::utils::round_to;

/// 顯示欄位的小數位數
pub const DISPLAY_PRECISION: u32 = 2;

/// 無法產生數值變動時的狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeStatus {
    NoComparisonData,
    CalculationError,
}

/// 文字指標的變動
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextChange {
    Changed,
    Unchanged,
}

/// 單一指標的變動紀錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub current: Option<MetricValue>,
    pub previous: Option<MetricValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<TextChange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ChangeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChangeRecord {
    fn base(current: Option<MetricValue>, previous: Option<MetricValue>) -> Self {
        Self {
            current,
            previous,
            change_value: None,
            change_pct: None,
            direction: None,
            change: None,
            status: None,
            error: None,
        }
    }

    pub fn no_comparison(current: Option<MetricValue>, previous: Option<MetricValue>) -> Self {
        Self {
            status: Some(ChangeStatus::NoComparisonData),
            ..Self::base(current, previous)
        }
    }

    pub fn calculation_error(
        current: Option<MetricValue>,
        previous: Option<MetricValue>,
        error: &CalculationError,
    ) -> Self {
        Self {
            status: Some(ChangeStatus::CalculationError),
            error: Some(error.to_string()),
            ..Self::base(current, previous)
        }
    }

    /// 是否帶有百分比變動
    pub fn has_pct(&self) -> bool {
        self.change_pct.is_some()
    }
}

/// 比較兩個數值
fn numeric_change(current: f64, previous: f64, mode: ComparisonMode) -> CalculationResult<ChangeRecord> {
    if !current.is_finite() {
        return Err(CalculationError::NonFiniteOperand {
            field: "current",
            value: current,
        });
    }
    if !previous.is_finite() {
        return Err(CalculationError::NonFiniteOperand {
            field: "previous",
            value: previous,
        });
    }

    let change_value = current - previous;
    if !change_value.is_finite() {
        return Err(CalculationError::NonFiniteResult(format!(
            "{} - {}",
            current, previous
        )));
    }

    let change_pct = match mode {
        ComparisonMode::Percentage if previous != 0.0 => {
            let pct = change_value / previous.abs() * 100.0;
            if !pct.is_finite() {
                return Err(CalculationError::NonFiniteResult(format!(
                    "({} - {}) / |{}|",
                    current, previous, previous
                )));
            }
            Some(pct)
        }
        _ => None,
    };

    let direction = Direction::from_delta(change_pct.unwrap_or(change_value));

    Ok(ChangeRecord {
        change_value: Some(round_to(change_value, DISPLAY_PRECISION)),
        change_pct: change_pct.map(|pct| round_to(pct, DISPLAY_PRECISION)),
        direction: Some(direction),
        ..ChangeRecord::base(
            Some(MetricValue::Number(round_to(current, DISPLAY_PRECISION))),
            Some(MetricValue::Number(round_to(previous, DISPLAY_PRECISION))),
        )
    })
}

/// 比較單一指標
pub fn compare_values(
    current: Option<&MetricValue>,
    previous: Option<&MetricValue>,
    mode: ComparisonMode,
) -> ChangeRecord {
    let (current, previous) = match (current, previous) {
        (Some(current), Some(previous)) => (current, previous),
        (current, previous) => {
            return ChangeRecord::no_comparison(current.cloned(), previous.cloned());
        }
    };

    let result = match (current, previous) {
        (MetricValue::Number(c), MetricValue::Number(p)) => numeric_change(*c, *p, mode),
        (MetricValue::Text(c), MetricValue::Text(p)) => Ok(ChangeRecord {
            change: Some(if c == p {
                TextChange::Unchanged
            } else {
                TextChange::Changed
            }),
            ..ChangeRecord::base(Some(current.clone()), Some(previous.clone()))
        }),
        _ => Err(CalculationError::TypeMismatch {
            current: current.kind(),
            previous: previous.kind(),
        }),
    };

    result.unwrap_or_else(|e| {
        ChangeRecord::calculation_error(Some(current.clone()), Some(previous.clone()), &e)
    })
}

/// 計算所有指標的變動
///
/// `current` 中的每個鍵都恰好產生一筆紀錄；任何單一指標的錯誤都轉為
/// `CALCULATION_ERROR` 狀態，整體永不失敗。
pub fn compute_changes(
    current: &MetricValues,
    previous: &MetricValues,
    mode: ComparisonMode,
) -> BTreeMap<String, ChangeRecord> {
    current
        .iter()
        .map(|(name, value)| {
            let previous_value = previous.get(name).and_then(Option::as_ref);
            let record = compare_values(value.as_ref(), previous_value, mode);
            if let Some(error) = &record.error {
                warn!("指標 {} 變動計算失敗: {}", name, error);
            }
            (name.clone(), record)
        })
        .collect()
}
