//! 市場快照

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain_types::{
    category::Category,
    value::{MetricValue, MetricValues},
};
use crate::utils::time_utils::timestamp_format;

/// 一次收集週期內所有類別的指標值
///
/// 快照在建構後不再修改；衍生指標透過 [`Snapshot::with_derived`] 產生新的快照。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub date: NaiveDate,
    pub values: BTreeMap<Category, MetricValues>,
    #[serde(default)]
    pub derived_indicators: BTreeMap<String, MetricValue>,
}

impl Snapshot {
    /// 以收集時間建立快照，日期取自時間戳
    pub fn new(timestamp: NaiveDateTime, values: BTreeMap<Category, MetricValues>) -> Self {
        Self {
            timestamp,
            date: timestamp.date(),
            values,
            derived_indicators: BTreeMap::new(),
        }
    }

    /// 附上衍生指標
    pub fn with_derived(mut self, derived: BTreeMap<String, MetricValue>) -> Self {
        self.derived_indicators = derived;
        self
    }

    /// 某類別的指標值；類別不存在時返回 `None`
    pub fn category(&self, category: Category) -> Option<&MetricValues> {
        self.values.get(&category)
    }

    /// 讀取單一指標的數值（缺值或非數字時返回 `None`）
    pub fn number(&self, category: Category, name: &str) -> Option<f64> {
        self.values
            .get(&category)
            .and_then(|values| values.get(name))
            .and_then(|value| value.as_ref())
            .and_then(MetricValue::as_f64)
    }

    /// 某類別的值，類別為衍生指標時由 `derived_indicators` 轉出
    pub fn category_values(&self, category: Category) -> MetricValues {
        match category {
            Category::DerivedIndicators => self
                .derived_indicators
                .iter()
                .map(|(name, value)| (name.clone(), Some(value.clone())))
                .collect(),
            _ => self.values.get(&category).cloned().unwrap_or_default(),
        }
    }
}
