//! 資料列與查詢條件

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain_types::{MetricValue, MetricValues};
use crate::utils::time_utils::timestamp_format;

/// 待寫入的資料列
///
/// 保留欄位加入的順序，新欄位依此順序附加到資料表結構的尾端。
#[derive(Debug, Clone, PartialEq)]
pub struct NewRow {
    pub date: NaiveDate,
    pub timestamp: NaiveDateTime,
    cells: Vec<(String, Option<MetricValue>)>,
}

impl NewRow {
    /// 以時間戳建立資料列，日期取自時間戳
    pub fn new(timestamp: NaiveDateTime) -> Self {
        Self {
            date: timestamp.date(),
            timestamp,
            cells: Vec::new(),
        }
    }

    /// 覆寫日期（時間戳與日期不同日時使用）
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// 設定欄位值，同名欄位以新值覆蓋
    pub fn push(&mut self, column: impl Into<String>, value: Option<MetricValue>) {
        let column = column.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Option<MetricValue>>) -> Self {
        self.push(column, value.into());
        self
    }

    /// 依給定順序加入多個欄位
    pub fn extend<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = (S, Option<MetricValue>)>,
        S: Into<String>,
    {
        for (column, value) in cells {
            self.push(column, value);
        }
    }

    pub fn cells(&self) -> &[(String, Option<MetricValue>)] {
        &self.cells
    }

    /// 將缺值與 NaN 替換為 0
    ///
    /// 僅用於要求純數值欄位的擴展資料集，屬刻意的有損轉換。
    pub fn fill_missing_with_zero(mut self) -> Self {
        for (_, value) in self.cells.iter_mut() {
            let missing = match value {
                None => true,
                Some(MetricValue::Number(number)) => number.is_nan(),
                Some(MetricValue::Text(_)) => false,
            };
            if missing {
                *value = Some(MetricValue::Number(0.0));
            }
        }
        self
    }
}

/// 已持久化的資料列
///
/// 只保存有值的欄位；缺值與「此列不適用的欄位」都不出現在 `values` 中。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRow {
    pub date: NaiveDate,
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    #[serde(flatten)]
    pub values: BTreeMap<String, MetricValue>,
}

impl StoredRow {
    pub fn get(&self, column: &str) -> Option<&MetricValue> {
        self.values.get(column)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.values.get(column).and_then(MetricValue::as_f64)
    }

    /// 取出指定欄位作為比較用的指標值（不存在的欄位記為缺值）
    pub fn select<'a, I>(&self, columns: I) -> MetricValues
    where
        I: IntoIterator<Item = &'a str>,
    {
        columns
            .into_iter()
            .map(|column| (column.to_string(), self.values.get(column).cloned()))
            .collect()
    }

    /// 取出帶有前綴的欄位並去除前綴
    pub fn strip_prefixed(&self, prefix: &str) -> MetricValues {
        self.values
            .iter()
            .filter_map(|(column, value)| {
                column
                    .strip_prefix(prefix)
                    .map(|name| (name.to_string(), Some(value.clone())))
            })
            .collect()
    }
}

/// 歷史查詢條件
///
/// 先以日期區間（兩端皆含）過濾，再截取最新的 `limit` 筆。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl HistoryQuery {
    /// 不限條件
    pub fn all() -> Self {
        Self::default()
    }

    /// 最新的 `limit` 筆
    pub fn latest(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// 日期區間
    pub fn between(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Self {
        Self {
            limit: None,
            start_date,
            end_date,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// 日期是否落在區間內
    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.start_date.map_or(true, |start| *date >= start)
            && self.end_date.map_or(true, |end| *date <= end)
    }
}
