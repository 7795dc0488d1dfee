//! Summary statistics over student exchange records.
//!
//! The library is the load → filter → aggregate pipeline. A dataset is loaded
//! once with [`initialize`] and then queried any number of times with
//! [`evaluate`]; the handle is immutable and can be shared between threads.

pub mod data;

use std::path::Path;
use std::sync::Arc;

pub use data::filter::Query;
pub use data::loader::LoadError;
pub use data::model::{Dataset, Record, Semester};
pub use data::stats::{FrequencyDistribution, QueryResult};

/// Shared, read-only handle to a loaded dataset.
pub type DatasetHandle = Arc<Dataset>;

/// Load and clean the source table at `path`.
pub fn initialize(path: impl AsRef<Path>) -> Result<DatasetHandle, LoadError> {
    data::loader::load_file(path.as_ref()).map(Arc::new)
}

/// Statistics for the records of `department` in `year_min..=year_max`.
pub fn evaluate(handle: &Dataset, year_min: i32, year_max: i32, department: &str) -> QueryResult {
    handle.evaluate(&Query::new(year_min, year_max, department))
}
