//! 對外查詢介面
//!
//! 每個操作都返回結構化結果；只有儲存層失敗會以錯誤返回。

pub mod error;
pub mod market;
pub mod report;
pub mod selected;
pub mod types;

pub use error::{ServiceError, ServiceResult};
pub use market::MarketService;
pub use report::REPORT_FILE;
pub use types::{
    ComparisonInfo, LatestSavedData, MarketChanges, ResponseStatus, SavedMarketChanges,
    SelectedChanges, SelectedUpdate,
};
