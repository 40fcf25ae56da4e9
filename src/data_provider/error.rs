//! 行情來源錯誤定義

use thiserror::Error;

/// 行情來源錯誤
///
/// 收集器會把單一指標的錯誤轉為缺值，這些錯誤不會中止整個快照收集。
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP 請求失敗: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{symbol} 回應狀態異常: {status}")]
    Status { symbol: String, status: u16 },

    #[error("{symbol} 回應格式錯誤: {reason}")]
    MalformedPayload { symbol: String, reason: String },

    #[error("未知的代碼: {0}")]
    UnknownSymbol(String),

    #[error("無效的 URL: {0}")]
    InvalidUrl(String),

    #[error("行情來源錯誤: {0}")]
    Other(String),
}

/// 行情來源結果類型
pub type ProviderResult<T> = Result<T, ProviderError>;
