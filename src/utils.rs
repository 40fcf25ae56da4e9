// utils.rs - 公共工具模組
//
// 提供時間格式轉換與數值取整等通用輔助函數。

pub mod rounding;
pub mod time_utils;

// 重新導出常用函數，使其可以通過 utils::function_name 直接訪問
pub use rounding::round_to;
pub use time_utils::{
    format_date, format_timestamp, now_local, parse_date, parse_timestamp, DATE_FORMAT,
    TIMESTAMP_FORMAT,
};
