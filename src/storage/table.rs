//! 以日期為鍵的時間序列資料表

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Writer};
use std::collections::BTreeMap;
use std::io::Read;
use tracing::debug;

use crate::domain_types::MetricValue;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::row::{HistoryQuery, NewRow, StoredRow};
use crate::utils::{format_date, format_timestamp, parse_date, parse_timestamp};

const DATE_COLUMN: &str = "date";
const TIMESTAMP_COLUMN: &str = "timestamp";

fn is_reserved(column: &str) -> bool {
    column.eq_ignore_ascii_case(DATE_COLUMN) || column.eq_ignore_ascii_case(TIMESTAMP_COLUMN)
}

/// 記憶體中的資料表
///
/// 不變條件：
/// - 每個日期至多一列
/// - `rows` 依日期遞減排序
/// - `columns` 為曾寫入過的所有指標欄位之聯集，依首次出現順序排列
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeriesTable {
    columns: Vec<String>,
    rows: Vec<StoredRow>,
}

impl TimeSeriesTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指標欄位（不含 `date`、`timestamp`）
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[StoredRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 依日期寫入或取代一列
    ///
    /// 數值取整至 `precision` 位；缺值與非有限數值不寫入該列。
    pub fn upsert(&mut self, row: NewRow, precision: u32) {
        let mut values = BTreeMap::new();
        for (column, value) in row.cells() {
            if is_reserved(column) {
                continue;
            }
            if !self.columns.iter().any(|existing| existing == column) {
                self.columns.push(column.clone());
            }
            if let Some(value) = value.as_ref().filter(|value| value.is_writable()) {
                values.insert(column.clone(), value.rounded(precision));
            }
        }

        let date = row.date;
        let before = self.rows.len();
        self.rows.retain(|existing| existing.date != date);
        let replaced = before != self.rows.len();

        let position = self.rows.partition_point(|existing| existing.date > date);
        self.rows.insert(
            position,
            StoredRow {
                date,
                timestamp: row.timestamp,
                values,
            },
        );
        debug!("資料列寫入: date={}, replaced={}, total={}", date, replaced, self.rows.len());
    }

    /// 依條件查詢，結果依日期遞減
    pub fn query(&self, query: &HistoryQuery) -> Vec<StoredRow> {
        let filtered = self.rows.iter().filter(|row| query.contains(&row.date));
        match query.limit {
            Some(limit) => filtered.take(limit).cloned().collect(),
            None => filtered.cloned().collect(),
        }
    }

    /// 自最新一列往回第 `offset` 列（0 為最新）
    pub fn at_offset(&self, offset: usize) -> Option<&StoredRow> {
        self.rows.get(offset)
    }

    pub fn latest(&self) -> Option<&StoredRow> {
        self.rows.first()
    }

    pub fn find(&self, date: &NaiveDate) -> Option<&StoredRow> {
        self.rows.iter().find(|row| row.date == *date)
    }

    /// 由 CSV 內容建立資料表
    ///
    /// `date`/`timestamp` 表頭不分大小寫；磁碟上重複的日期只保留最新（最前）的一列。
    pub fn from_csv_reader<R: Read>(reader: R) -> StorageResult<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Ok(Self::new());
        }

        let date_index = headers
            .iter()
            .position(|name| name.trim().eq_ignore_ascii_case(DATE_COLUMN))
            .ok_or_else(|| StorageError::MissingColumn(DATE_COLUMN.to_string()))?;
        let timestamp_index = headers
            .iter()
            .position(|name| name.trim().eq_ignore_ascii_case(TIMESTAMP_COLUMN));

        let columns: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(_, name)| !is_reserved(name.trim()))
            .map(|(index, name)| (index, name.trim().to_string()))
            .collect();

        let mut rows = Vec::new();
        let mut record = StringRecord::new();
        while reader.read_record(&mut record)? {
            let line = record.position().map(|position| position.line()).unwrap_or(0);
            rows.push(Self::parse_record(&record, line, date_index, timestamp_index, &columns)?);
        }

        rows.sort_by(|a, b| b.date.cmp(&a.date));
        let loaded = rows.len();
        rows.dedup_by(|later, earlier| later.date == earlier.date);
        if loaded != rows.len() {
            debug!("合併重複日期: {} -> {}", loaded, rows.len());
        }

        Ok(Self {
            columns: columns.into_iter().map(|(_, name)| name).collect(),
            rows,
        })
    }

    fn parse_record(
        record: &StringRecord,
        line: u64,
        date_index: usize,
        timestamp_index: Option<usize>,
        columns: &[(usize, String)],
    ) -> StorageResult<StoredRow> {
        let raw_date = record.get(date_index).unwrap_or("");
        let date = parse_date(raw_date).ok_or_else(|| StorageError::CorruptRow {
            line,
            reason: format!("無法解析日期 '{}'", raw_date),
        })?;

        let timestamp = match timestamp_index.and_then(|index| record.get(index)) {
            Some(raw) if !raw.trim().is_empty() => {
                parse_timestamp(raw).ok_or_else(|| StorageError::CorruptRow {
                    line,
                    reason: format!("無法解析時間戳 '{}'", raw),
                })?
            }
            _ => date.and_time(chrono::NaiveTime::MIN),
        };

        let values = columns
            .iter()
            .filter_map(|(index, name)| {
                record
                    .get(*index)
                    .and_then(MetricValue::parse_cell)
                    .map(|value| (name.clone(), value))
            })
            .collect();

        Ok(StoredRow {
            date,
            timestamp,
            values,
        })
    }

    /// 以 CSV 格式輸出：`date`、`timestamp` 固定為前兩欄
    pub fn to_csv_bytes(&self) -> StorageResult<Vec<u8>> {
        let mut writer = Writer::from_writer(Vec::new());

        let mut header = vec![DATE_COLUMN, TIMESTAMP_COLUMN];
        header.extend(self.columns.iter().map(String::as_str));
        writer.write_record(&header)?;

        for row in &self.rows {
            let mut record = Vec::with_capacity(self.columns.len() + 2);
            record.push(format_date(&row.date));
            record.push(format_timestamp(&row.timestamp));
            for column in &self.columns {
                record.push(row.get(column).map(MetricValue::to_cell).unwrap_or_default());
            }
            writer.write_record(&record)?;
        }

        writer
            .into_inner()
            .map_err(|e| StorageError::Io(e.into_error()))
    }
}
