// time_utils.rs
//
// 提供時間轉換相關的工具函數。
// 資料表中的日期欄位固定為 `%Y-%m-%d`，時間戳欄位固定為 `%Y-%m-%d %H:%M:%S`（本地時間）。

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// 日期欄位格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 時間戳欄位格式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 獲取當前本地時間（精確到秒）
pub fn now_local() -> NaiveDateTime {
    truncate_nanos(Local::now().naive_local())
}

/// 去除秒以下的部分
pub fn truncate_nanos(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp.with_nanosecond(0).unwrap_or(timestamp)
}

/// 將日期格式化為 `%Y-%m-%d`
pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// 將時間戳格式化為 `%Y-%m-%d %H:%M:%S`
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// 解析日期
///
/// 接受純日期，或以日期開頭的時間戳字串（例如 `2024-11-08 15:30:00`）。
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Some(date);
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, DATE_FORMAT).ok())
}

/// 解析時間戳
///
/// 依序嘗試標準格式、ISO 8601（含 `T` 分隔與小數秒），最後退回純日期（午夜）。
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    const FORMATS: [&str; 4] = [
        TIMESTAMP_FORMAT,
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// 以 `%Y-%m-%d %H:%M:%S` 格式序列化 `NaiveDateTime` 的 serde 模組
pub mod timestamp_format {
    use super::{format_timestamp, parse_timestamp};
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(timestamp: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_timestamp(timestamp))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).ok_or_else(|| de::Error::custom(format!("無效的時間戳: {}", raw)))
    }
}
