pub mod atomic_file;
pub mod csv_store;
pub mod dataset;
pub mod error;
pub mod row;
pub mod table;

pub use csv_store::{CsvTimeSeriesStore, TimeSeriesStore};
pub use dataset::Dataset;
pub use error::{StorageError, StorageResult};
pub use row::{HistoryQuery, NewRow, StoredRow};
pub use table::TimeSeriesTable;
