//! 服務層回應結構

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analysis::{CategoryChanges, ChangeRecord, MarketStatus};
use crate::domain_types::{MetricValue, Snapshot};
use crate::utils::time_utils::timestamp_format;

/// 回應狀態；部分指標失敗時仍為 `success`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    #[default]
    Success,
    Error,
}

/// 比較基準的已儲存資料（衍生指標已去除前綴）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LatestSavedData {
    pub basic_indicators: BTreeMap<String, MetricValue>,
    pub global_indicators: BTreeMap<String, MetricValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonInfo {
    #[serde(with = "timestamp_format")]
    pub current_time: NaiveDateTime,
    /// 比較基準列的時間戳；沒有足夠的歷史時為 `None`
    pub comparison_time: Option<String>,
    pub comparison_offset: usize,
}

/// 市場變動結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketChanges {
    pub status: ResponseStatus,
    pub current_data: Snapshot,
    pub latest_saved_data: LatestSavedData,
    pub changes: CategoryChanges,
    pub market_status: MarketStatus,
    pub comparison_info: ComparisonInfo,
}

/// 已儲存的市場變動報告與檔案修改時間
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedMarketChanges {
    pub status: ResponseStatus,
    pub data: MarketChanges,
    #[serde(with = "timestamp_format")]
    pub file_updated_at: NaiveDateTime,
}

/// 自選指標的變動
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedChanges {
    pub status: ResponseStatus,
    pub comparison_period: String,
    pub current_time: String,
    pub previous_time: String,
    pub changes: BTreeMap<String, ChangeRecord>,
}

/// 自選指標更新結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedUpdate {
    pub status: ResponseStatus,
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub current_data: BTreeMap<String, Option<MetricValue>>,
    /// 歷史不足時為 `None`
    pub changes: Option<SelectedChanges>,
}
