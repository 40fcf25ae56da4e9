pub mod change;
pub mod derived;
pub mod error;
pub mod statistics;
pub mod status;

pub use change::{compare_values, compute_changes, ChangeRecord, ChangeStatus, TextChange};
pub use derived::{calculate_derived, RiskLevel, DERIVED_PREFIX};
pub use error::{CalculationError, CalculationResult};
pub use statistics::{summarize, ColumnStatistics, HistorySummary};
pub use status::{
    analyze_market_status, direction_for_category, significant_changes, BondTrend,
    CategoryChanges, MarketDirection, MarketStatus, SignificantChange,
    DEFAULT_SIGNIFICANT_THRESHOLD,
};
