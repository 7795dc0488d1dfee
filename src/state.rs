use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;

use exchange_stats::{DatasetHandle, Query, QueryResult};

/// What File → Export writes: the selection and its statistics.
#[derive(Serialize)]
struct Export<'a> {
    source: Option<&'a Path>,
    query: &'a Query,
    result: &'a QueryResult,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a file loads successfully).
    pub dataset: Option<DatasetHandle>,

    /// Where `dataset` came from.
    pub source_path: Option<PathBuf>,

    /// Current selection; `None` while no dataset is loaded.
    pub query: Option<Query>,

    /// Last evaluated query and its result.
    cached: Option<(Query, QueryResult)>,

    /// Department to select after a load when present.
    pub preferred_department: String,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl AppState {
    pub fn new(preferred_department: impl Into<String>) -> Self {
        Self {
            dataset: None,
            source_path: None,
            query: None,
            cached: None,
            preferred_department: preferred_department.into(),
            status_message: None,
            loading: false,
        }
    }

    /// Load a file, replacing the current dataset on success. On failure the
    /// previous dataset stays and the error goes to the status line.
    pub fn load_path(&mut self, path: &Path) {
        self.loading = true;
        match exchange_stats::initialize(path) {
            Ok(dataset) => self.set_dataset(dataset, path.to_path_buf()),
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
                self.loading = false;
            }
        }
    }

    /// Ingest a newly loaded dataset: full year range, default department.
    pub fn set_dataset(&mut self, dataset: DatasetHandle, path: PathBuf) {
        self.query = match (
            dataset.year_bounds(),
            dataset.default_department(Some(self.preferred_department.as_str())),
        ) {
            (Some((lo, hi)), Some(dept)) => Some(Query::new(lo, hi, dept)),
            _ => None,
        };
        self.cached = None;
        self.dataset = Some(dataset);
        self.source_path = Some(path);
        self.status_message = None;
        self.loading = false;
        self.refresh();
    }

    /// Move the lower bound; the upper bound follows so the range stays ordered.
    pub fn set_year_min(&mut self, year: i32) {
        if let Some(q) = &mut self.query {
            q.year_min = year;
            q.year_max = q.year_max.max(year);
        }
        self.refresh();
    }

    /// Move the upper bound; the lower bound follows so the range stays ordered.
    pub fn set_year_max(&mut self, year: i32) {
        if let Some(q) = &mut self.query {
            q.year_max = year;
            q.year_min = q.year_min.min(year);
        }
        self.refresh();
    }

    pub fn set_department(&mut self, department: &str) {
        if let Some(q) = &mut self.query {
            q.department = department.to_string();
        }
        self.refresh();
    }

    /// Reset the year range to everything the dataset covers.
    pub fn reset_range(&mut self) {
        let bounds = self.dataset.as_ref().and_then(|ds| ds.year_bounds());
        if let (Some(q), Some((lo, hi))) = (&mut self.query, bounds) {
            q.year_min = lo;
            q.year_max = hi;
        }
        self.refresh();
    }

    /// Re-evaluate when the query differs from the cached one.
    pub fn refresh(&mut self) {
        let (Some(ds), Some(query)) = (&self.dataset, &self.query) else {
            self.cached = None;
            return;
        };
        if matches!(&self.cached, Some((q, _)) if q == query) {
            return;
        }
        let result = ds.evaluate(query);
        self.cached = Some((query.clone(), result));
    }

    /// Result for the current query.
    pub fn result(&self) -> Option<&QueryResult> {
        self.cached.as_ref().map(|(_, r)| r)
    }

    /// Write the current query and its result as pretty JSON.
    pub fn export_json(&self, path: &Path) -> Result<()> {
        let Some((query, result)) = &self.cached else {
            bail!("nothing to export, no dataset loaded");
        };
        let export = Export {
            source: self.source_path.as_deref(),
            query,
            result,
        };
        let json = serde_json::to_string_pretty(&export).context("serialising statistics")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported statistics to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use exchange_stats::{Dataset, Record, Semester};

    use super::*;

    fn rec(year: i32, dept: &str, semester: Semester) -> Record {
        Record {
            year,
            semester,
            faculty: "社會科學院".into(),
            department: dept.into(),
            country: "日本".into(),
            institution: "京都大學".into(),
        }
    }

    fn state() -> AppState {
        let ds = Dataset::from_records(vec![
            rec(105, "政治學系", Semester::One),
            rec(106, "經濟學系", Semester::One),
            rec(107, "經濟學系", Semester::FullYear),
            rec(108, "經濟學系", Semester::One),
        ]);
        let mut state = AppState::new("經濟學系");
        state.set_dataset(Arc::new(ds), PathBuf::from("test.csv"));
        state
    }

    #[test]
    fn load_selects_full_range_and_preferred_department() {
        let state = state();
        assert_eq!(state.query, Some(Query::new(105, 108, "經濟學系")));
        assert_eq!(state.result().map(|r| r.total), Some(3));
    }

    #[test]
    fn range_stays_ordered() {
        let mut state = state();
        state.set_year_min(108);
        state.set_year_max(106);
        let q = state.query.clone().unwrap();
        assert_eq!((q.year_min, q.year_max), (106, 106));
        assert_eq!(state.result().map(|r| r.total), Some(1));

        state.reset_range();
        assert_eq!(state.result().map(|r| r.total), Some(3));
    }

    #[test]
    fn department_change_reevaluates() {
        let mut state = state();
        state.set_department("政治學系");
        let r = state.result().unwrap();
        assert_eq!(r.total, 1);
        assert_eq!(r.one_semester_pct, 100);

        state.set_department("不存在");
        assert!(state.result().unwrap().is_empty());
    }

    #[test]
    fn export_writes_query_and_result() {
        let state = state();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        state.export_json(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["query"]["department"], "經濟學系");
        assert_eq!(json["result"]["total"], 3);
        assert_eq!(json["result"]["one_semester_pct"], 67);
        assert_eq!(json["result"]["by_year"]["107"], 1);

        let empty = AppState::new("經濟學系");
        assert!(empty.export_json(&path).is_err());
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut state = state();
        state.load_path(Path::new("/definitely/missing.csv"));
        assert!(state.status_message.is_some());
        assert!(state.dataset.is_some());
        assert!(!state.loading);
    }
}
