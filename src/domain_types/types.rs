use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 數值變動方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Up,
    Down,
    Unchanged,
}

impl Direction {
    /// 依變動量的正負號分類，只有恰好為零才視為 `Unchanged`
    pub fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            Direction::Up
        } else if delta < 0.0 {
            Direction::Down
        } else {
            Direction::Unchanged
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Unchanged => "UNCHANGED",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 比較模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonMode {
    /// 百分比變動（前值為零時退回絕對變動）
    #[default]
    Percentage,
    /// 絕對變動
    Absolute,
}

impl FromStr for ComparisonMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "percentage" | "pct" | "percent" => Ok(ComparisonMode::Percentage),
            "absolute" | "abs" => Ok(ComparisonMode::Absolute),
            other => Err(format!("未知的比較模式: {}", other)),
        }
    }
}
