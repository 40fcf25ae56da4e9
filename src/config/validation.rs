//! 配置檢查；錯誤以 `section.key` 指出出問題的設定

use std::fmt::Display;
use std::ops::RangeInclusive;
use std::path::Path;
use thiserror::Error;

pub type ValidationResult<T = ()> = Result<T, ValidationError>;

/// 配置驗證錯誤
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{key} 未設定")]
    Missing { key: &'static str },

    #[error("{key} = {value} 不是可用的選項（{allowed}）")]
    NotAllowed {
        key: &'static str,
        value: String,
        allowed: String,
    },

    #[error("{key} = {value} 超出範圍 {min}..={max}")]
    OutOfRange {
        key: &'static str,
        value: String,
        min: String,
        max: String,
    },

    #[error("{key} 必須是有限數值，目前為 {value}")]
    NotFinite { key: &'static str, value: f64 },
}

/// 各配置區段自行檢查其設定
pub trait Validator {
    fn validate(&self) -> ValidationResult;
}

pub struct ValidationUtils;

impl ValidationUtils {
    /// 字串設定不可為空白
    pub fn not_empty(value: &str, key: &'static str) -> ValidationResult {
        if value.trim().is_empty() {
            return Err(ValidationError::Missing { key });
        }
        Ok(())
    }

    /// 目錄設定不可為空
    pub fn path_not_empty(path: &Path, key: &'static str) -> ValidationResult {
        Self::not_empty(&path.to_string_lossy(), key)
    }

    /// 不分大小寫比對選項
    pub fn one_of(value: &str, allowed: &[&str], key: &'static str) -> ValidationResult {
        if allowed
            .iter()
            .any(|option| option.eq_ignore_ascii_case(value.trim()))
        {
            return Ok(());
        }
        Err(ValidationError::NotAllowed {
            key,
            value: value.to_string(),
            allowed: allowed.join(", "),
        })
    }

    /// 數值需落在 `range` 內（兩端皆含）
    pub fn in_range<T>(value: T, range: RangeInclusive<T>, key: &'static str) -> ValidationResult
    where
        T: PartialOrd + Display,
    {
        if range.contains(&value) {
            return Ok(());
        }
        Err(ValidationError::OutOfRange {
            key,
            value: value.to_string(),
            min: range.start().to_string(),
            max: range.end().to_string(),
        })
    }

    pub fn finite(value: f64, key: &'static str) -> ValidationResult {
        if value.is_finite() {
            Ok(())
        } else {
            Err(ValidationError::NotFinite { key, value })
        }
    }
}
