//! 指標類別定義

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain_types::types::ComparisonMode;

/// 指標類別
///
/// 各類別是互不相交的命名空間，同一指標名稱可以出現在不同類別中。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ExchangeRates,
    LocalIndices,
    GlobalIndices,
    Commodities,
    Bonds,
    Volatility,
    Crypto,
    /// 自選指標組合
    Selected,
    /// 由快照計算出的衍生指標（不在目錄中）
    DerivedIndicators,
}

impl Category {
    /// 擴展市場快照收集的類別（依序）
    pub const ENHANCED: [Category; 7] = [
        Category::ExchangeRates,
        Category::LocalIndices,
        Category::GlobalIndices,
        Category::Commodities,
        Category::Bonds,
        Category::Volatility,
        Category::Crypto,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::ExchangeRates => "exchange_rates",
            Category::LocalIndices => "local_indices",
            Category::GlobalIndices => "global_indices",
            Category::Commodities => "commodities",
            Category::Bonds => "bonds",
            Category::Volatility => "volatility",
            Category::Crypto => "crypto",
            Category::Selected => "selected",
            Category::DerivedIndicators => "derived_indicators",
        }
    }

    /// 該類別在變動計算中使用的預設比較模式
    ///
    /// 債券殖利率本身已是百分比，因此以絕對變動比較。
    pub fn comparison_mode(&self) -> ComparisonMode {
        match self {
            Category::Bonds => ComparisonMode::Absolute,
            _ => ComparisonMode::Percentage,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        [
            Category::ExchangeRates,
            Category::LocalIndices,
            Category::GlobalIndices,
            Category::Commodities,
            Category::Bonds,
            Category::Volatility,
            Category::Crypto,
            Category::Selected,
            Category::DerivedIndicators,
        ]
        .into_iter()
        .find(|category| category.as_str() == normalized)
        .ok_or_else(|| format!("未知的指標類別: {}", s))
    }
}
