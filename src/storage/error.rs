//! 儲存層錯誤定義

use thiserror::Error;

/// 儲存層錯誤類型
///
/// 這是唯一允許中止整個請求的錯誤類別。
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("檔案讀寫錯誤: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV 處理錯誤: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON 處理錯誤: {0}")]
    Json(#[from] serde_json::Error),

    #[error("缺少必要欄位: {0}")]
    MissingColumn(String),

    #[error("資料表損毀: 第 {line} 行, 原因: {reason}")]
    CorruptRow { line: u64, reason: String },
}

/// 儲存層結果類型
pub type StorageResult<T> = Result<T, StorageError>;
