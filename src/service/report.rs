//! 市場變動報告的保存與讀取

use chrono::{DateTime, Local};
use std::path::PathBuf;
use tracing::info;

use crate::service::error::ServiceResult;
use crate::service::market::MarketService;
use crate::service::types::{MarketChanges, ResponseStatus, SavedMarketChanges};
use crate::storage::atomic_file::{read_optional, write_atomic};
use crate::utils::time_utils::truncate_nanos;

/// 報告檔名
pub const REPORT_FILE: &str = "market.json";

impl MarketService {
    pub fn report_path(&self) -> PathBuf {
        self.current_dir.join(REPORT_FILE)
    }

    /// 以原子寫入保存報告，返回檔案路徑
    pub async fn save_market_changes(&self, report: &MarketChanges) -> ServiceResult<PathBuf> {
        let path = self.report_path();
        let bytes = serde_json::to_vec_pretty(report)?;
        write_atomic(&path, &bytes).await?;
        info!("市場變動報告已保存: {}", path.display());
        Ok(path)
    }

    /// 讀取已保存的報告與檔案修改時間；檔案不存在時返回 `None`
    pub async fn load_saved_market_changes(&self) -> ServiceResult<Option<SavedMarketChanges>> {
        let path = self.report_path();
        let Some(bytes) = read_optional(&path).await? else {
            return Ok(None);
        };

        let data: MarketChanges = serde_json::from_slice(&bytes)?;
        let modified = tokio::fs::metadata(&path).await?.modified()?;
        let file_updated_at = DateTime::<Local>::from(modified).naive_local();

        Ok(Some(SavedMarketChanges {
            status: ResponseStatus::Success,
            data,
            file_updated_at: truncate_nanos(file_updated_at),
        }))
    }
}
