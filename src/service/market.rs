//! 擴展市場快照的收集、儲存與變動分析

use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::analysis::{
    analyze_market_status, calculate_derived, compute_changes, summarize, CategoryChanges,
    HistorySummary, MarketStatus, DERIVED_PREFIX,
};
use crate::analysis::derived::prefixed;
use crate::config::{AnalysisConfig, ApplicationConfig, ProviderConfig};
use crate::data_provider::{create_provider, DataProvider, SnapshotCollector};
use crate::domain_types::{
    Category, ComparisonMode, MetricCatalogue, MetricValue, MetricValues, Snapshot,
};
use crate::service::error::ServiceResult;
use crate::service::types::{ComparisonInfo, LatestSavedData, MarketChanges, ResponseStatus};
use crate::storage::{CsvTimeSeriesStore, Dataset, HistoryQuery, NewRow, StoredRow, TimeSeriesStore};

/// 市場資料服務
///
/// 所有依賴都由建構函數傳入，不使用全域實例。
pub struct MarketService {
    pub(crate) collector: SnapshotCollector,
    pub(crate) catalogue: MetricCatalogue,
    pub(crate) store: Arc<dyn TimeSeriesStore>,
    pub(crate) current_dir: PathBuf,
    pub(crate) analysis: AnalysisConfig,
}

impl MarketService {
    pub fn new(
        provider: Arc<dyn DataProvider>,
        store: Arc<dyn TimeSeriesStore>,
        current_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            collector: SnapshotCollector::new(provider, ProviderConfig::default().max_concurrency),
            catalogue: MetricCatalogue::standard(),
            store,
            current_dir: current_dir.into(),
            analysis: AnalysisConfig::default(),
        }
    }

    /// 依應用程序配置建立服務
    pub fn from_config(config: &ApplicationConfig) -> ServiceResult<Self> {
        let provider = create_provider(&config.provider)?;
        let store = Arc::new(CsvTimeSeriesStore::open(&config.storage.data_dir));
        Ok(Self::new(provider, store, &config.storage.current_dir)
            .with_max_concurrency(config.provider.max_concurrency)
            .with_analysis(config.analysis.clone()))
    }

    pub fn with_catalogue(mut self, catalogue: MetricCatalogue) -> Self {
        self.catalogue = catalogue;
        self
    }

    pub fn with_analysis(mut self, analysis: AnalysisConfig) -> Self {
        self.analysis = analysis;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.collector = SnapshotCollector::new(self.collector.provider().clone(), max_concurrency);
        self
    }

    pub fn catalogue(&self) -> &MetricCatalogue {
        &self.catalogue
    }

    pub fn analysis(&self) -> &AnalysisConfig {
        &self.analysis
    }

    /// 同時向行情來源查詢的上限
    pub fn max_concurrency(&self) -> usize {
        self.collector.max_concurrency()
    }

    /// 收集目前的擴展市場快照
    pub async fn collect_snapshot(&self) -> Snapshot {
        self.collector.collect_snapshot(&self.catalogue).await
    }

    /// [`MarketService::collect_snapshot`] 的別名
    pub async fn get_snapshot(&self) -> Snapshot {
        self.collect_snapshot().await
    }

    /// 以指定時間收集快照
    pub async fn collect_snapshot_at(&self, timestamp: NaiveDateTime) -> Snapshot {
        self.collector
            .collect_snapshot_at(&self.catalogue, timestamp)
            .await
    }

    /// 依資料集組出待寫入的資料列，欄位依目錄順序排列
    fn row_for(&self, dataset: Dataset, snapshot: &Snapshot) -> NewRow {
        let mut row = NewRow::new(snapshot.timestamp).with_date(snapshot.date);
        for category in dataset.categories() {
            match category {
                Category::DerivedIndicators => {
                    row.extend(
                        snapshot
                            .derived_indicators
                            .iter()
                            .map(|(name, value)| (prefixed(name), Some(value.clone()))),
                    );
                }
                _ => {
                    let values = snapshot.category_values(*category);
                    let ordered = self.catalogue.names(*category);
                    row.extend(
                        ordered
                            .iter()
                            .filter_map(|name| values.get(*name).map(|value| (*name, value.clone()))),
                    );
                    row.extend(
                        values
                            .iter()
                            .filter(|(name, _)| !self.catalogue.contains(*category, name))
                            .map(|(name, value)| (name.as_str(), value.clone())),
                    );
                }
            }
        }
        row
    }

    /// 將快照寫入基本與全球指標資料集（缺值以 0 寫入）
    pub async fn save_snapshot(&self, snapshot: &Snapshot) -> ServiceResult<()> {
        for dataset in [Dataset::BasicIndicators, Dataset::GlobalIndicators] {
            let row = self.row_for(dataset, snapshot);
            self.store.upsert_numeric(dataset, row).await?;
        }
        info!("擴展市場資料已儲存: {}", snapshot.date);
        Ok(())
    }

    /// 查詢某資料集的歷史
    pub async fn get_history(
        &self,
        dataset: Dataset,
        query: &HistoryQuery,
    ) -> ServiceResult<Vec<StoredRow>> {
        Ok(self.store.read(dataset, query).await?)
    }

    /// 歷史統計摘要
    pub async fn history_summary(
        &self,
        dataset: Dataset,
        query: &HistoryQuery,
    ) -> ServiceResult<HistorySummary> {
        let rows = self.store.read(dataset, query).await?;
        let columns = self.store.columns(dataset).await?;
        Ok(summarize(&rows, &columns))
    }

    /// 由快照計算衍生指標
    pub fn get_derived(&self, snapshot: &Snapshot) -> BTreeMap<String, MetricValue> {
        calculate_derived(snapshot)
    }

    /// 由變動紀錄分析市場狀態
    pub fn get_status(&self, changes: &CategoryChanges) -> MarketStatus {
        analyze_market_status(changes, self.analysis.significant_change_threshold)
    }

    /// 收集並儲存快照，再與第 `comparison_offset` 筆已儲存資料比較
    pub async fn get_market_changes(&self) -> ServiceResult<MarketChanges> {
        self.get_changes(None, self.analysis.comparison_offset).await
    }

    /// 同 [`MarketService::get_market_changes`]，可指定比較模式與位移
    ///
    /// `mode` 為 `None` 時債券使用絕對變動，其餘類別使用百分比變動。
    pub async fn get_changes(
        &self,
        mode: Option<ComparisonMode>,
        comparison_offset: usize,
    ) -> ServiceResult<MarketChanges> {
        let snapshot = self.collect_snapshot().await;
        self.save_snapshot(&snapshot).await?;
        self.compare_snapshot_with(snapshot, mode, comparison_offset)
            .await
    }

    /// 將快照與已儲存資料比較，不收集也不寫入
    pub async fn compare_snapshot(
        &self,
        snapshot: Snapshot,
        comparison_offset: usize,
    ) -> ServiceResult<MarketChanges> {
        self.compare_snapshot_with(snapshot, None, comparison_offset)
            .await
    }

    async fn compare_snapshot_with(
        &self,
        snapshot: Snapshot,
        mode: Option<ComparisonMode>,
        comparison_offset: usize,
    ) -> ServiceResult<MarketChanges> {
        let basic_row = self
            .store
            .read_at_offset(Dataset::BasicIndicators, comparison_offset)
            .await?;
        let global_row = self
            .store
            .read_at_offset(Dataset::GlobalIndicators, comparison_offset)
            .await?;

        let mut changes = CategoryChanges::new();
        for category in Category::ENHANCED {
            let Some(current) = snapshot.category(category) else {
                continue;
            };
            let previous = Dataset::for_category(category)
                .and_then(|dataset| match dataset {
                    Dataset::BasicIndicators => basic_row.as_ref(),
                    _ => global_row.as_ref(),
                })
                .map(|row| row.select(current.keys().map(String::as_str)))
                .unwrap_or_default();
            let mode = mode.unwrap_or_else(|| category.comparison_mode());
            changes.insert(category, compute_changes(current, &previous, mode));
        }

        let current_derived = snapshot.category_values(Category::DerivedIndicators);
        let previous_derived: MetricValues = global_row
            .as_ref()
            .map(|row| row.strip_prefixed(DERIVED_PREFIX))
            .unwrap_or_default();
        changes.insert(
            Category::DerivedIndicators,
            compute_changes(
                &current_derived,
                &previous_derived,
                mode.unwrap_or(ComparisonMode::Percentage),
            ),
        );

        let market_status = self.get_status(&changes);
        debug!(
            "市場變動計算完成: offset={}, 顯著變動 {} 項",
            comparison_offset,
            market_status.significant_changes.len()
        );

        let latest_saved_data = LatestSavedData {
            basic_indicators: basic_row
                .as_ref()
                .map(|row| row.values.clone())
                .unwrap_or_default(),
            global_indicators: global_row
                .as_ref()
                .map(|row| {
                    row.values
                        .iter()
                        .map(|(name, value)| {
                            let name = name.strip_prefix(DERIVED_PREFIX).unwrap_or(name);
                            (name.to_string(), value.clone())
                        })
                        .collect()
                })
                .unwrap_or_default(),
        };

        let comparison_info = ComparisonInfo {
            current_time: snapshot.timestamp,
            comparison_time: basic_row
                .as_ref()
                .or(global_row.as_ref())
                .map(|row| crate::utils::format_timestamp(&row.timestamp)),
            comparison_offset,
        };

        Ok(MarketChanges {
            status: ResponseStatus::Success,
            current_data: snapshot,
            latest_saved_data,
            changes,
            market_status,
            comparison_info,
        })
    }
}
