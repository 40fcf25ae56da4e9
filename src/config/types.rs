use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::validation::{ValidationResult, ValidationUtils, Validator};

/// 應用程序配置結構
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    pub log: LogConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl Validator for ApplicationConfig {
    fn validate(&self) -> ValidationResult {
        self.log.validate()?;
        self.storage.validate()?;
        self.provider.validate()?;
        self.analysis.validate()?;

        Ok(())
    }
}

/// 日誌配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub format: String,
}

impl Validator for LogConfig {
    fn validate(&self) -> ValidationResult {
        ValidationUtils::one_of(
            &self.level,
            &["trace", "debug", "info", "warn", "error"],
            "log.level",
        )?;
        ValidationUtils::one_of(&self.format, &["pretty", "compact"], "log.format")?;

        Ok(())
    }
}

impl LogConfig {
    /// 轉換為 `tracing` 的日誌級別；無法辨識時使用 INFO
    pub fn tracing_level(&self) -> tracing::Level {
        self.level.parse().unwrap_or(tracing::Level::INFO)
    }
}

/// 儲存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 時間序列資料表的根目錄
    pub data_dir: PathBuf,
    /// 最新市場變動報告（`market.json`）的目錄
    pub current_dir: PathBuf,
}

impl Validator for StorageConfig {
    fn validate(&self) -> ValidationResult {
        ValidationUtils::path_not_empty(&self.data_dir, "storage.data_dir")?;
        ValidationUtils::path_not_empty(&self.current_dir, "storage.current_dir")?;

        Ok(())
    }
}

/// 行情來源種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Static,
}

/// 行情來源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_concurrency: usize,
    pub user_agent: String,
    /// `kind = "static"` 時使用的固定報價（代碼 → 價格）
    pub static_quotes: HashMap<String, f64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Yahoo,
            base_url: crate::data_provider::yahoo::DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            max_concurrency: 8,
            user_agent: "Mozilla/5.0 (compatible; market_monitor)".to_string(),
            static_quotes: HashMap::new(),
        }
    }
}

impl Validator for ProviderConfig {
    fn validate(&self) -> ValidationResult {
        if self.kind == ProviderKind::Yahoo {
            ValidationUtils::not_empty(&self.base_url, "provider.base_url")?;
            ValidationUtils::not_empty(&self.user_agent, "provider.user_agent")?;
        }
        ValidationUtils::in_range(self.timeout_secs, 1..=120, "provider.timeout_secs")?;
        ValidationUtils::in_range(self.max_concurrency, 1..=64, "provider.max_concurrency")?;

        Ok(())
    }
}

/// 分析配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 顯著變動門檻（百分比）
    pub significant_change_threshold: f64,
    /// 與第幾筆已儲存的資料比較（0 為最新一筆，即剛寫入的當日資料）
    pub comparison_offset: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            significant_change_threshold: crate::analysis::DEFAULT_SIGNIFICANT_THRESHOLD,
            comparison_offset: 1,
        }
    }
}

impl Validator for AnalysisConfig {
    fn validate(&self) -> ValidationResult {
        let threshold = self.significant_change_threshold;
        ValidationUtils::finite(threshold, "analysis.significant_change_threshold")?;
        ValidationUtils::in_range(threshold, 0.0..=100.0, "analysis.significant_change_threshold")?;
        ValidationUtils::in_range(self.comparison_offset, 1..=365, "analysis.comparison_offset")?;

        Ok(())
    }
}
