//! 指標目錄
//!
//! 人類可讀的指標名稱 → 行情來源代號，依類別分組。目錄在建構完成後不可變更。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain_types::category::Category;

/// 單一指標定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDefinition {
    /// 顯示名稱，同時作為資料表欄位名
    pub name: String,
    /// 行情來源代號
    pub symbol: String,
}

impl MetricDefinition {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
        }
    }
}

/// 指標目錄
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricCatalogue {
    categories: BTreeMap<Category, Vec<MetricDefinition>>,
}

impl MetricCatalogue {
    /// 創建空目錄
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一個類別的指標（保留給定順序；同類別內重複名稱以後者覆蓋前者）
    pub fn with_category(mut self, category: Category, metrics: &[(&str, &str)]) -> Self {
        let entry = self.categories.entry(category).or_default();
        for (name, symbol) in metrics {
            match entry.iter_mut().find(|metric| metric.name == *name) {
                Some(existing) => existing.symbol = symbol.to_string(),
                None => entry.push(MetricDefinition::new(*name, *symbol)),
            }
        }
        self
    }

    /// 預設目錄：匯率、國內指數、全球指數、原物料、債券、波動率、加密貨幣與自選組合
    pub fn standard() -> Self {
        Self::new()
            .with_category(
                Category::ExchangeRates,
                &[
                    ("USD/KRW", "KRW=X"),
                    ("EUR/KRW", "EURKRW=X"),
                    ("JPY/KRW", "JPYKRW=X"),
                    ("CNY/KRW", "CNYKRW=X"),
                ],
            )
            .with_category(
                Category::LocalIndices,
                &[("KOSPI", "^KS11"), ("KOSDAQ", "^KQ11"), ("KOSPI200", "^KS200")],
            )
            .with_category(
                Category::GlobalIndices,
                &[
                    ("S&P500", "^GSPC"),
                    ("NASDAQ", "^IXIC"),
                    ("DOW", "^DJI"),
                    ("NIKKEI", "^N225"),
                    ("SHANGHAI", "000001.SS"),
                    ("HANG_SENG", "^HSI"),
                    ("FTSE", "^FTSE"),
                    ("DAX", "^GDAXI"),
                ],
            )
            .with_category(
                Category::Commodities,
                &[
                    ("GOLD", "GC=F"),
                    ("SILVER", "SI=F"),
                    ("CRUDE_OIL", "CL=F"),
                    ("NATURAL_GAS", "NG=F"),
                    ("COPPER", "HG=F"),
                ],
            )
            .with_category(
                Category::Bonds,
                &[("US_10Y", "^TNX"), ("US_30Y", "^TYX"), ("US_2Y", "^IRX")],
            )
            .with_category(Category::Volatility, &[("VIX", "^VIX")])
            .with_category(
                Category::Crypto,
                &[("BTC/USD", "BTC-USD"), ("ETH/USD", "ETH-USD")],
            )
            .with_category(
                Category::Selected,
                &[
                    ("USD/KRW", "KRW=X"),
                    ("EUR/KRW", "EURKRW=X"),
                    ("JPY/KRW", "JPYKRW=X"),
                    ("KOSPI", "^KS11"),
                    ("KOSDAQ", "^KQ11"),
                    ("KOSPI200", "^KS200"),
                    ("S&P500", "^GSPC"),
                    ("NASDAQ", "^IXIC"),
                    ("DOW", "^DJI"),
                    ("BITCOIN", "BTC-USD"),
                    ("GOLD", "GC=F"),
                    ("US_30Y_BOND", "^TYX"),
                    ("CRUDE_OIL", "CL=F"),
                    ("VIX", "^VIX"),
                ],
            )
    }

    /// 獲取某類別的指標（依目錄順序）；類別不存在時返回空切片
    pub fn metrics(&self, category: Category) -> &[MetricDefinition] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 某類別的指標名稱
    pub fn names(&self, category: Category) -> Vec<&str> {
        self.metrics(category)
            .iter()
            .map(|metric| metric.name.as_str())
            .collect()
    }

    pub fn contains(&self, category: Category, name: &str) -> bool {
        self.metrics(category).iter().any(|metric| metric.name == name)
    }

    /// 目錄中的所有類別
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.categories.keys().copied()
    }

    /// 指標總數
    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
