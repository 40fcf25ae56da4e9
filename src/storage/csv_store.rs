//! CSV 檔案型時間序列儲存

use async_trait::async_trait;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::storage::atomic_file::{read_optional, write_atomic};
use crate::storage::dataset::Dataset;
use crate::storage::error::StorageResult;
use crate::storage::row::{HistoryQuery, NewRow, StoredRow};
use crate::storage::table::TimeSeriesTable;

/// 時間序列儲存接口
#[async_trait]
pub trait TimeSeriesStore: Send + Sync {
    /// 依日期寫入或取代一列
    async fn upsert(&self, dataset: Dataset, row: NewRow) -> StorageResult<()>;

    /// 同 [`TimeSeriesStore::upsert`]，但先將缺值與 NaN 替換為 0
    async fn upsert_numeric(&self, dataset: Dataset, row: NewRow) -> StorageResult<()> {
        self.upsert(dataset, row.fill_missing_with_zero()).await
    }

    /// 依條件讀取，結果依日期遞減
    async fn read(&self, dataset: Dataset, query: &HistoryQuery) -> StorageResult<Vec<StoredRow>>;

    /// 自最新一列往回第 `offset` 列
    async fn read_at_offset(&self, dataset: Dataset, offset: usize)
        -> StorageResult<Option<StoredRow>>;

    /// 資料表欄位（不含 `date`、`timestamp`）
    async fn columns(&self, dataset: Dataset) -> StorageResult<Vec<String>>;
}

/// 每個資料集一個 CSV 檔案
///
/// 寫入為整表讀取-修改-寫回，同一資料集的寫入者以讀寫鎖串行化；
/// 鎖只在本程序內有效，不支援多個程序同時寫入同一目錄。
pub struct CsvTimeSeriesStore {
    base_dir: PathBuf,
    locks: DashMap<Dataset, Arc<RwLock<()>>>,
}

impl CsvTimeSeriesStore {
    pub fn open(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        debug!("開啟時間序列儲存: {}", base_dir.display());
        Self {
            base_dir,
            locks: DashMap::new(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// 資料集的檔案路徑
    pub fn path_for(&self, dataset: Dataset) -> PathBuf {
        self.base_dir.join(dataset.relative_path())
    }

    fn lock_for(&self, dataset: Dataset) -> Arc<RwLock<()>> {
        self.locks.entry(dataset).or_default().clone()
    }

    async fn load(&self, dataset: Dataset) -> StorageResult<TimeSeriesTable> {
        let path = self.path_for(dataset);
        let table = match read_optional(&path).await? {
            Some(bytes) => TimeSeriesTable::from_csv_reader(bytes.as_slice()).map_err(|e| {
                error!("資料表無法讀取: {}: {}", path.display(), e);
                e
            })?,
            None => TimeSeriesTable::new(),
        };
        Ok(table)
    }

    async fn persist(&self, dataset: Dataset, table: &TimeSeriesTable) -> StorageResult<()> {
        let path = self.path_for(dataset);
        let bytes = table.to_csv_bytes()?;
        write_atomic(&path, &bytes).await.map_err(|e| {
            error!("資料表無法寫入: {}: {}", path.display(), e);
            e
        })
    }

    /// 讀取整張資料表
    pub async fn load_table(&self, dataset: Dataset) -> StorageResult<TimeSeriesTable> {
        let lock = self.lock_for(dataset);
        let _guard = lock.read().await;
        self.load(dataset).await
    }
}

#[async_trait]
impl TimeSeriesStore for CsvTimeSeriesStore {
    async fn upsert(&self, dataset: Dataset, row: NewRow) -> StorageResult<()> {
        let lock = self.lock_for(dataset);
        let _guard = lock.write().await;

        let mut table = self.load(dataset).await?;
        let date = row.date;
        table.upsert(row, dataset.precision());
        self.persist(dataset, &table).await?;

        debug!("{} 寫入 {}，共 {} 列", dataset, date, table.len());
        Ok(())
    }

    async fn read(&self, dataset: Dataset, query: &HistoryQuery) -> StorageResult<Vec<StoredRow>> {
        Ok(self.load_table(dataset).await?.query(query))
    }

    async fn read_at_offset(
        &self,
        dataset: Dataset,
        offset: usize,
    ) -> StorageResult<Option<StoredRow>> {
        Ok(self.load_table(dataset).await?.at_offset(offset).cloned())
    }

    async fn columns(&self, dataset: Dataset) -> StorageResult<Vec<String>> {
        Ok(self.load_table(dataset).await?.columns().to_vec())
    }
}
