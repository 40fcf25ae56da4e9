//! 市場狀態分析

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::warn;

use crate::analysis::change::ChangeRecord;
use crate::analysis::derived::RiskLevel;
use crate::domain_types::{Category, Direction, MetricValue};

/// 預設的顯著變動門檻（百分比）
pub const DEFAULT_SIGNIFICANT_THRESHOLD: f64 = 2.0;

/// 類別 → 指標 → 變動紀錄
pub type CategoryChanges = BTreeMap<Category, BTreeMap<String, ChangeRecord>>;

/// 類別整體方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketDirection {
    StronglyUp,
    SlightlyUp,
    StronglyDown,
    SlightlyDown,
    Mixed,
    Undefined,
}

/// 債券殖利率走勢
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BondTrend {
    YieldRising,
    YieldFalling,
    Stable,
    Unknown,
}

/// 波動率走勢；沒有資料時 `trend` 為 `UNKNOWN`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolatilityTrend {
    Up,
    Down,
    Unchanged,
    Unknown,
}

impl From<Option<Direction>> for VolatilityTrend {
    fn from(direction: Option<Direction>) -> Self {
        match direction {
            Some(Direction::Up) => VolatilityTrend::Up,
            Some(Direction::Down) => VolatilityTrend::Down,
            Some(Direction::Unchanged) => VolatilityTrend::Unchanged,
            None => VolatilityTrend::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolatilityStatus {
    pub level: RiskLevel,
    pub trend: VolatilityTrend,
}

impl Default for VolatilityStatus {
    fn default() -> Self {
        Self {
            level: RiskLevel::Unknown,
            trend: VolatilityTrend::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskIndicators {
    pub volatility_change: VolatilityStatus,
    pub bond_market: BondTrend,
}

impl Default for RiskIndicators {
    fn default() -> Self {
        Self {
            volatility_change: VolatilityStatus::default(),
            bond_market: BondTrend::Unknown,
        }
    }
}

/// 超過門檻的變動
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignificantChange {
    pub category: Category,
    pub metric: String,
    pub change_pct: f64,
    pub direction: Option<Direction>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketStatus {
    pub market_direction: BTreeMap<Category, MarketDirection>,
    pub risk_indicators: RiskIndicators,
    pub significant_changes: Vec<SignificantChange>,
}

/// 參與整體方向判斷的類別
pub const DIRECTION_CATEGORIES: [Category; 4] = [
    Category::LocalIndices,
    Category::GlobalIndices,
    Category::ExchangeRates,
    Category::Commodities,
];

fn count_directions(records: &BTreeMap<String, ChangeRecord>) -> (usize, usize) {
    records
        .values()
        .fold((0, 0), |(up, down), record| match record.direction {
            Some(Direction::Up) => (up + 1, down),
            Some(Direction::Down) => (up, down + 1),
            _ => (up, down),
        })
}

/// 依上漲、下跌比例判斷類別方向
///
/// 分母為紀錄總數（含無法比較的紀錄）。比例門檻皆為嚴格大於：
/// 上漲 `>0.6` 強漲、`>0.5` 小漲，下跌對稱，其餘（含五五波）為 `MIXED`。
pub fn direction_for_category(records: &BTreeMap<String, ChangeRecord>) -> MarketDirection {
    let total = records.len();
    if total == 0 {
        return MarketDirection::Undefined;
    }

    let (up, down) = count_directions(records);
    let up_ratio = up as f64 / total as f64;
    let down_ratio = down as f64 / total as f64;

    if up_ratio > 0.6 {
        MarketDirection::StronglyUp
    } else if up_ratio > 0.5 {
        MarketDirection::SlightlyUp
    } else if down_ratio > 0.6 {
        MarketDirection::StronglyDown
    } else if down_ratio > 0.5 {
        MarketDirection::SlightlyDown
    } else {
        MarketDirection::Mixed
    }
}

/// 債券殖利率走勢：比較上升與下降的數量
pub fn bond_trend(records: &BTreeMap<String, ChangeRecord>) -> BondTrend {
    if records.is_empty() {
        return BondTrend::Unknown;
    }
    let (up, down) = count_directions(records);
    match up.cmp(&down) {
        Ordering::Greater => BondTrend::YieldRising,
        Ordering::Less => BondTrend::YieldFalling,
        Ordering::Equal => BondTrend::Stable,
    }
}

/// 波動率狀態：以 VIX 的現值分級，走勢取其變動方向
pub fn volatility_status(records: &BTreeMap<String, ChangeRecord>) -> VolatilityStatus {
    match records.get("VIX") {
        Some(record) => VolatilityStatus {
            level: record
                .current
                .as_ref()
                .and_then(MetricValue::as_f64)
                .map(RiskLevel::from_vix)
                .unwrap_or(RiskLevel::Unknown),
            trend: record.direction.into(),
        },
        None => VolatilityStatus::default(),
    }
}

/// 擷取 `|change_pct| >= threshold` 的紀錄，依絕對值遞減排序
///
/// 絕對值相同時保留原本的類別與指標順序。
pub fn significant_changes(changes: &CategoryChanges, threshold: f64) -> Vec<SignificantChange> {
    let mut significant: Vec<SignificantChange> = changes
        .iter()
        .flat_map(|(category, records)| {
            records.iter().filter_map(move |(metric, record)| {
                record
                    .change_pct
                    .filter(|pct| pct.abs() >= threshold)
                    .map(|change_pct| SignificantChange {
                        category: *category,
                        metric: metric.clone(),
                        change_pct,
                        direction: record.direction,
                    })
            })
        })
        .collect();

    significant.sort_by(|a, b| {
        b.change_pct
            .abs()
            .partial_cmp(&a.change_pct.abs())
            .unwrap_or(Ordering::Equal)
    });
    significant
}

/// 彙整所有類別的變動為市場狀態
///
/// 門檻不是有限非負數時返回空的狀態。
pub fn analyze_market_status(changes: &CategoryChanges, threshold: f64) -> MarketStatus {
    if !threshold.is_finite() || threshold < 0.0 {
        warn!("顯著變動門檻無效: {}，略過市場狀態分析", threshold);
        return MarketStatus::default();
    }

    let empty = BTreeMap::new();
    let records_for = |category: Category| changes.get(&category).unwrap_or(&empty);

    let market_direction = DIRECTION_CATEGORIES
        .into_iter()
        .map(|category| (category, direction_for_category(records_for(category))))
        .collect();

    MarketStatus {
        market_direction,
        risk_indicators: RiskIndicators {
            volatility_change: volatility_status(records_for(Category::Volatility)),
            bond_market: bond_trend(records_for(Category::Bonds)),
        },
        significant_changes: significant_changes(changes, threshold),
    }
}
