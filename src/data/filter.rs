use serde::Serialize;

use super::model::Record;

// ---------------------------------------------------------------------------
// Query: which records the user is looking at
// ---------------------------------------------------------------------------

/// A year range (inclusive on both ends) plus a single department.
///
/// An inverted range (`year_min > year_max`) is a valid query that matches
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Query {
    pub year_min: i32,
    pub year_max: i32,
    pub department: String,
}

impl Query {
    pub fn new(year_min: i32, year_max: i32, department: impl Into<String>) -> Self {
        Query {
            year_min,
            year_max,
            department: department.into(),
        }
    }

    /// A record passes when its year is inside the range *and* its department
    /// is exactly the selected one (case-sensitive, no normalisation).
    pub fn matches(&self, record: &Record) -> bool {
        (self.year_min..=self.year_max).contains(&record.year)
            && record.department == self.department
    }
}

/// Iterate over the records that pass `query`.
pub fn filtered<'a>(
    records: &'a [Record],
    query: &'a Query,
) -> impl Iterator<Item = &'a Record> + 'a {
    records.iter().filter(move |rec| query.matches(rec))
}
