//! 資料集定義

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain_types::Category;

/// 獨立儲存的資料表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    /// 匯率與國內指數
    BasicIndicators,
    /// 全球指數、原物料、債券、波動率、加密貨幣與衍生指標
    GlobalIndicators,
    /// 自選指標
    SelectedIndicators,
}

impl Dataset {
    pub const ALL: [Dataset; 3] = [
        Dataset::BasicIndicators,
        Dataset::GlobalIndicators,
        Dataset::SelectedIndicators,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dataset::BasicIndicators => "basic_indicators",
            Dataset::GlobalIndicators => "global_indicators",
            Dataset::SelectedIndicators => "selected_indicators",
        }
    }

    /// 相對於資料根目錄的檔案路徑
    pub fn relative_path(&self) -> PathBuf {
        let directory = match self {
            Dataset::BasicIndicators | Dataset::GlobalIndicators => "daily",
            Dataset::SelectedIndicators => "selected",
        };
        PathBuf::from(directory).join(format!("{}.csv", self.as_str()))
    }

    /// 數值欄位寫入前取整的小數位數
    pub fn precision(&self) -> u32 {
        match self {
            Dataset::SelectedIndicators => 1,
            _ => 2,
        }
    }

    /// 寫入此資料集的快照類別
    pub fn categories(&self) -> &'static [Category] {
        match self {
            Dataset::BasicIndicators => &[Category::ExchangeRates, Category::LocalIndices],
            Dataset::GlobalIndicators => &[
                Category::GlobalIndices,
                Category::Commodities,
                Category::Bonds,
                Category::Volatility,
                Category::Crypto,
                Category::DerivedIndicators,
            ],
            Dataset::SelectedIndicators => &[Category::Selected],
        }
    }

    /// 某類別儲存於哪個擴展資料集
    pub fn for_category(category: Category) -> Option<Dataset> {
        Dataset::ALL
            .into_iter()
            .find(|dataset| dataset.categories().contains(&category))
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dataset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" | "basic_indicators" => Ok(Dataset::BasicIndicators),
            "global" | "global_indicators" => Ok(Dataset::GlobalIndicators),
            "selected" | "selected_indicators" => Ok(Dataset::SelectedIndicators),
            other => Err(format!("未知的資料集: {}", other)),
        }
    }
}
