//! 行情來源
//!
//! 引擎只透過 [`DataProvider`] 取得報價，延遲、重試與認證都由實作自行處理。

pub mod collector;
pub mod error;
pub mod static_provider;
pub mod yahoo;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::types::{ProviderConfig, ProviderKind};

pub use collector::{SnapshotCollector, SNAPSHOT_PRECISION};
pub use error::{ProviderError, ProviderResult};
pub use static_provider::StaticProvider;
pub use yahoo::YahooChartProvider;

/// 報價來源接口
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// 最新收盤價；來源沒有報價時返回 `Ok(None)`
    async fn get_latest_close(&self, symbol: &str) -> ProviderResult<Option<f64>>;

    /// 來源名稱，用於日誌
    fn name(&self) -> &str {
        "provider"
    }
}

/// 依設定建立行情來源
pub fn create_provider(config: &ProviderConfig) -> ProviderResult<Arc<dyn DataProvider>> {
    let provider: Arc<dyn DataProvider> = match config.kind {
        ProviderKind::Yahoo => Arc::new(YahooChartProvider::new(
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
            &config.user_agent,
        )?),
        ProviderKind::Static => Arc::new(StaticProvider::from_quotes(&config.static_quotes)),
    };
    tracing::info!("行情來源: {}", provider.name());
    Ok(provider)
}
