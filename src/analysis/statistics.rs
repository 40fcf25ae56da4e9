//! 歷史資料統計

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::storage::StoredRow;
use crate::utils::{format_date, format_timestamp, round_to};

/// 單一欄位的統計值（皆取至小數 2 位）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// 樣本標準差，少於兩筆時為 `None`
    pub std: Option<f64>,
    /// `(最新 - 最舊) / |最舊| * 100`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<f64>,
}

impl ColumnStatistics {
    /// `values` 依日期遞減排列；空集合返回 `None`
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let count = values.len();
        if count == 0 {
            return None;
        }

        let mean = values.iter().sum::<f64>() / count as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let std = (count > 1).then(|| {
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            round_to(variance.sqrt(), 2)
        });

        let change_percent = match (values.first(), values.last()) {
            (Some(newest), Some(oldest)) if count > 1 && *oldest != 0.0 => {
                Some(round_to((newest - oldest) / oldest.abs() * 100.0, 2))
            }
            _ => None,
        };

        Some(Self {
            count,
            mean: round_to(mean, 2),
            min: round_to(min, 2),
            max: round_to(max, 2),
            std,
            change_percent,
        })
    }
}

/// 資料集歷史摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub total_records: usize,
    /// `最舊日期 ~ 最新日期`
    pub date_range: Option<String>,
    pub latest_update: Option<String>,
    pub columns: Vec<String>,
    pub statistics: BTreeMap<String, ColumnStatistics>,
}

/// 計算歷史摘要；`rows` 依日期遞減排列
///
/// 只統計數值欄位，文字欄位（例如風險等級）與缺值都會略過。
pub fn summarize(rows: &[StoredRow], columns: &[String]) -> HistorySummary {
    let statistics = columns
        .iter()
        .filter_map(|column| {
            let values: Vec<f64> = rows.iter().filter_map(|row| row.number(column)).collect();
            ColumnStatistics::from_values(&values).map(|stats| (column.clone(), stats))
        })
        .collect();

    let date_range = match (rows.last(), rows.first()) {
        (Some(oldest), Some(newest)) => Some(format!(
            "{} ~ {}",
            format_date(&oldest.date),
            format_date(&newest.date)
        )),
        _ => None,
    };

    HistorySummary {
        total_records: rows.len(),
        date_range,
        latest_update: rows.first().map(|row| format_timestamp(&row.timestamp)),
        columns: columns.to_vec(),
        statistics,
    }
}
