//! 快照收集

use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::analysis::calculate_derived;
use crate::data_provider::DataProvider;
use crate::domain_types::{
    Category, MetricCatalogue, MetricDefinition, MetricValue, MetricValues, Snapshot,
};
use crate::utils::{now_local, round_to};
use chrono::NaiveDateTime;

/// 快照收集的預設顯示精度
pub const SNAPSHOT_PRECISION: u32 = 2;

/// 逐一向行情來源查詢目錄中的指標
///
/// 單一指標失敗只會記為缺值，收集本身永不失敗。
pub struct SnapshotCollector {
    provider: Arc<dyn DataProvider>,
    max_concurrency: usize,
}

impl SnapshotCollector {
    pub fn new(provider: Arc<dyn DataProvider>, max_concurrency: usize) -> Self {
        Self {
            provider,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn provider(&self) -> &Arc<dyn DataProvider> {
        &self.provider
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    async fn fetch_one(&self, metric: &MetricDefinition, precision: u32) -> Option<MetricValue> {
        match self.provider.get_latest_close(&metric.symbol).await {
            Ok(Some(price)) if price.is_finite() => {
                Some(MetricValue::Number(round_to(price, precision)))
            }
            Ok(Some(price)) => {
                warn!("{} ({}) 報價不是有限數值: {}", metric.name, metric.symbol, price);
                None
            }
            Ok(None) => {
                debug!("{} ({}) 沒有報價", metric.name, metric.symbol);
                None
            }
            Err(e) => {
                warn!("{} ({}) 收集失敗: {}", metric.name, metric.symbol, e);
                None
            }
        }
    }

    /// 收集一組指標，結果以指標名稱為鍵，與完成順序無關
    pub async fn collect(&self, metrics: &[MetricDefinition], precision: u32) -> MetricValues {
        stream::iter(metrics)
            .map(|metric| async move {
                let value = self.fetch_one(metric, precision).await;
                (metric.name.clone(), value)
            })
            .buffer_unordered(self.max_concurrency)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect()
    }

    /// 收集目錄中的某個類別
    pub async fn collect_category(
        &self,
        catalogue: &MetricCatalogue,
        category: Category,
        precision: u32,
    ) -> MetricValues {
        let values = self.collect(catalogue.metrics(category), precision).await;
        let present = values.values().filter(|value| value.is_some()).count();
        debug!("{} 收集完成: {}/{}", category, present, values.len());
        values
    }

    /// 收集擴展市場快照（不含自選指標），並附上衍生指標
    pub async fn collect_snapshot_at(
        &self,
        catalogue: &MetricCatalogue,
        timestamp: NaiveDateTime,
    ) -> Snapshot {
        let mut values = BTreeMap::new();
        for category in Category::ENHANCED {
            if catalogue.metrics(category).is_empty() {
                continue;
            }
            let collected = self
                .collect_category(catalogue, category, SNAPSHOT_PRECISION)
                .await;
            values.insert(category, collected);
        }

        let snapshot = Snapshot::new(timestamp, values);
        let derived = calculate_derived(&snapshot);
        snapshot.with_derived(derived)
    }

    /// 以目前時間收集快照
    pub async fn collect_snapshot(&self, catalogue: &MetricCatalogue) -> Snapshot {
        self.collect_snapshot_at(catalogue, now_local()).await
    }
}
