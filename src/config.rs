/// 配置管理模組
///
/// 本模組負責加載與驗證系統配置，支持開發與生產兩種環境。
/// 載入後的配置以參數傳入各元件的建構函數，不使用全域實例。
pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{ConfigLoader, Environment};
pub use types::*;
pub use validation::{ValidationError, ValidationResult, ValidationUtils, Validator};
