//! 分析計算錯誤定義

use thiserror::Error;

/// 單一指標計算時的錯誤
///
/// 這類錯誤只會以 `CALCULATION_ERROR` 狀態嵌入結果，不會向上傳遞。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalculationError {
    #[error("{field} 不是有限數值: {value}")]
    NonFiniteOperand { field: &'static str, value: f64 },

    #[error("計算結果不是有限數值: {0}")]
    NonFiniteResult(String),

    #[error("類型不一致: current={current}, previous={previous}")]
    TypeMismatch {
        current: &'static str,
        previous: &'static str,
    },

    #[error("除數為零")]
    DivisionByZero,
}

/// 分析結果類型
pub type CalculationResult<T> = Result<T, CalculationError>;
