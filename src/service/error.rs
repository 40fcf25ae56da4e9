//! 服務層錯誤定義

use thiserror::Error;

use crate::data_provider::ProviderError;
use crate::storage::StorageError;

/// 服務層錯誤
///
/// 請求期間只有儲存層錯誤會中止操作；行情來源錯誤只出現在建構階段。
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("儲存錯誤: {0}")]
    Storage(#[from] StorageError),

    #[error("行情來源錯誤: {0}")]
    Provider(#[from] ProviderError),
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::Storage(StorageError::Io(err))
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Storage(StorageError::Json(err))
    }
}

/// 服務層結果類型
pub type ServiceResult<T> = Result<T, ServiceError>;
