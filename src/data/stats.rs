use std::collections::BTreeMap;

use serde::Serialize;

use super::filter::{filtered, Query};
use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// FrequencyDistribution – value → count over the matched records
// ---------------------------------------------------------------------------

/// Occurrence counts per category value.
///
/// Only values that actually occur are present; there are no zero entries.
/// The map is ordered internally so iteration is deterministic, but callers
/// choose a display order through [`by_count_desc`](Self::by_count_desc) or
/// [`by_key_asc`](Self::by_key_asc).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FrequencyDistribution<K: Ord> {
    counts: BTreeMap<K, usize>,
}

impl<K: Ord> Default for FrequencyDistribution<K> {
    fn default() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }
}

impl<K: Ord> FromIterator<K> for FrequencyDistribution<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut dist = Self::default();
        for value in iter {
            dist.add(value);
        }
        dist
    }
}

impl<K: Ord> FrequencyDistribution<K> {
    pub fn add(&mut self, value: K) {
        *self.counts.entry(value).or_insert(0) += 1;
    }

    /// Count for `value`, 0 when absent.
    pub fn get(&self, value: &K) -> usize {
        self.counts.get(value).copied().unwrap_or(0)
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.counts.iter().map(|(k, &n)| (k, n))
    }

    /// Entries by ascending key (used for the per-year chart).
    pub fn by_key_asc(&self) -> Vec<(&K, usize)> {
        self.iter().collect()
    }

    /// Entries by descending count, ties broken by ascending key.
    pub fn by_count_desc(&self) -> Vec<(&K, usize)> {
        let mut entries = self.by_key_asc();
        // Stable sort keeps the key order among equal counts.
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

// ---------------------------------------------------------------------------
// QueryResult
// ---------------------------------------------------------------------------

/// Everything the viewer shows for one query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    /// Number of matched records.
    pub total: usize,
    /// Share of one-semester exchanges, rounded half-to-even, in `0..=100`.
    pub one_semester_pct: u32,
    pub distinct_countries: usize,
    pub distinct_institutions: usize,
    pub by_year: FrequencyDistribution<i32>,
    pub by_country: FrequencyDistribution<String>,
    pub by_institution: FrequencyDistribution<String>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// `100 * part / whole` rounded half-to-even, 0 when `whole` is 0.
///
/// Integer arithmetic only, so `1/8` (12.5) reliably gives 12 and `3/8`
/// (37.5) gives 38.
pub fn percent_half_even(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let scaled = 100 * part;
    let quotient = scaled / whole;
    let twice_remainder = 2 * (scaled % whole);
    let rounded = match twice_remainder.cmp(&whole) {
        std::cmp::Ordering::Less => quotient,
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal => quotient + quotient % 2,
    };
    rounded as u32
}

/// Filter `records` by `query` and aggregate the survivors.
///
/// Pure: no state is read or written besides the arguments, so the result
/// can be cached per query.
pub fn evaluate(records: &[Record], query: &Query) -> QueryResult {
    let mut result = QueryResult::default();
    let mut one_semester = 0;

    for rec in filtered(records, query) {
        result.total += 1;
        if rec.semester.is_one_semester() {
            one_semester += 1;
        }
        result.by_year.add(rec.year);
        result.by_country.add(rec.country.clone());
        result.by_institution.add(rec.institution.clone());
    }

    result.one_semester_pct = percent_half_even(one_semester, result.total);
    result.distinct_countries = result.by_country.len();
    result.distinct_institutions = result.by_institution.len();

    log::debug!(
        "Query {}..={} {:?}: {} records",
        query.year_min,
        query.year_max,
        query.department,
        result.total
    );
    result
}

impl Dataset {
    /// Run `query` against this dataset's records.
    pub fn evaluate(&self, query: &Query) -> QueryResult {
        evaluate(self.records(), query)
    }
}
