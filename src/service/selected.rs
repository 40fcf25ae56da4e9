//! 自選指標

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::analysis::compute_changes;
use crate::domain_types::{Category, ComparisonMode};
use crate::service::error::ServiceResult;
use crate::service::market::MarketService;
use crate::service::types::{ResponseStatus, SelectedChanges, SelectedUpdate};
use crate::storage::{Dataset, HistoryQuery, NewRow, StoredRow};
use crate::utils::{format_timestamp, now_local};

impl MarketService {
    /// 收集自選指標並寫入，再計算與前一筆的變動
    pub async fn update_selected(&self) -> ServiceResult<SelectedUpdate> {
        self.update_selected_at(now_local()).await
    }

    /// 以指定時間收集並寫入自選指標
    pub async fn update_selected_at(&self, timestamp: NaiveDateTime) -> ServiceResult<SelectedUpdate> {
        let dataset = Dataset::SelectedIndicators;
        let values = self
            .collector
            .collect_category(&self.catalogue, Category::Selected, dataset.precision())
            .await;

        let mut row = NewRow::new(timestamp);
        row.extend(
            self.catalogue
                .names(Category::Selected)
                .into_iter()
                .map(|name| (name, values.get(name).cloned().flatten())),
        );
        self.store.upsert(dataset, row).await?;
        info!("自選指標已更新: {}", timestamp.date());

        let changes = self.selected_changes(1).await?;
        Ok(SelectedUpdate {
            status: ResponseStatus::Success,
            timestamp,
            current_data: values,
            changes,
        })
    }

    /// 最新一筆與第 `offset` 筆的百分比變動；歷史不足時返回 `None`
    pub async fn selected_changes(&self, offset: usize) -> ServiceResult<Option<SelectedChanges>> {
        let dataset = Dataset::SelectedIndicators;
        let current = self.store.read_at_offset(dataset, 0).await?;
        let previous = match offset {
            0 => current.clone(),
            _ => self.store.read_at_offset(dataset, offset).await?,
        };

        let (Some(current), Some(previous)) = (current, previous) else {
            debug!("自選指標歷史不足以比較 {} 筆前的資料", offset);
            return Ok(None);
        };

        let columns = self.store.columns(dataset).await?;
        let names = columns.iter().map(String::as_str);
        let changes = compute_changes(
            &current.select(names.clone()),
            &previous.select(names),
            ComparisonMode::Percentage,
        );

        Ok(Some(SelectedChanges {
            status: ResponseStatus::Success,
            comparison_period: format!("{} day(s)", offset),
            current_time: format_timestamp(&current.timestamp),
            previous_time: format_timestamp(&previous.timestamp),
            changes,
        }))
    }

    /// 最新一筆自選指標
    pub async fn selected_current(&self) -> ServiceResult<Option<StoredRow>> {
        Ok(self
            .store
            .read(Dataset::SelectedIndicators, &HistoryQuery::latest(1))
            .await?
            .into_iter()
            .next())
    }
}
