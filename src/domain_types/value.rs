//! 指標數值類型

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::utils::round_to;

/// 單一指標的數值：數字，或文字標籤（例如風險等級）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

/// 指標名稱 → 數值（`None` 表示缺值）
pub type MetricValues = BTreeMap<String, Option<MetricValue>>;

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Number(value) => Some(*value),
            MetricValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetricValue::Number(_) => None,
            MetricValue::Text(text) => Some(text),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, MetricValue::Number(_))
    }

    /// 類型名稱，用於錯誤訊息
    pub fn kind(&self) -> &'static str {
        match self {
            MetricValue::Number(_) => "number",
            MetricValue::Text(_) => "text",
        }
    }

    /// 數字取整；文字原樣返回
    pub fn rounded(&self, decimals: u32) -> Self {
        match self {
            MetricValue::Number(value) => MetricValue::Number(round_to(*value, decimals)),
            MetricValue::Text(text) => MetricValue::Text(text.clone()),
        }
    }

    /// 是否為可寫入的值（非 NaN、非無限大）
    pub fn is_writable(&self) -> bool {
        match self {
            MetricValue::Number(value) => value.is_finite(),
            MetricValue::Text(_) => true,
        }
    }

    /// 解析 CSV 儲存格
    ///
    /// 空字串與非有限數值（`NaN`、`inf`）視為缺值。
    pub fn parse_cell(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Some(MetricValue::Number(value)),
            Ok(_) => None,
            Err(_) => Some(MetricValue::Text(trimmed.to_string())),
        }
    }

    /// 轉為 CSV 儲存格內容
    pub fn to_cell(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(value) => write!(f, "{}", value),
            MetricValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Number(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        MetricValue::Text(value.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        MetricValue::Text(value)
    }
}
