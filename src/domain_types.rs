pub mod catalogue;
pub mod category;
pub mod snapshot;
pub mod types;
pub mod value;

pub use catalogue::{MetricCatalogue, MetricDefinition};
pub use category::Category;
pub use snapshot::Snapshot;
pub use types::{ComparisonMode, Direction};
pub use value::{MetricValue, MetricValues};
