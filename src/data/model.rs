use std::collections::{HashMap, HashSet};
use std::fmt;

// ---------------------------------------------------------------------------
// Semester – how long the exchange lasted
// ---------------------------------------------------------------------------

/// Length of an exchange, parsed from the source's semester label.
///
/// Unknown labels are kept verbatim in [`Semester::Other`] so that no row is
/// lost because of an unexpected spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Semester {
    One,
    Two,
    FullYear,
    Other(String),
}

impl Semester {
    /// Parse a semester label (upstream Chinese labels or English ones).
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        match label {
            "一學期" => return Semester::One,
            "二學期" | "兩學期" => return Semester::Two,
            "全學年" | "一學年" => return Semester::FullYear,
            _ => {}
        }
        match label.to_ascii_lowercase().as_str() {
            "one semester" => Semester::One,
            "two semesters" => Semester::Two,
            "full year" => Semester::FullYear,
            _ => Semester::Other(label.to_string()),
        }
    }

    pub fn is_one_semester(&self) -> bool {
        matches!(self, Semester::One)
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Semester::One => write!(f, "one semester"),
            Semester::Two => write!(f, "two semesters"),
            Semester::FullYear => write!(f, "full year"),
            Semester::Other(label) => write!(f, "{label}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the cleaned table
// ---------------------------------------------------------------------------

/// A single exchange participation (one accepted row of the source table).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Academic year with the school-year suffix stripped (e.g. `107`).
    pub year: i32,
    pub semester: Semester,
    pub faculty: String,
    pub department: String,
    pub country: String,
    pub institution: String,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table plus control metadata
// ---------------------------------------------------------------------------

/// The cleaned, read-only record table with pre-computed lookup lists.
///
/// Built once per load and shared behind an `Arc`; nothing mutates it
/// afterwards.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
    /// Distinct years, newest first.
    years: Vec<i32>,
    /// Distinct departments in order of first appearance.
    departments: Vec<String>,
    /// Distinct faculties in order of first appearance.
    faculties: Vec<String>,
    /// `(faculty, departments)` with both levels in first-appearance order.
    departments_by_faculty: Vec<(String, Vec<String>)>,
    /// Source rows dropped for a missing field.
    rejected_rows: usize,
}

impl Dataset {
    /// Build the lookup lists from the accepted records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut years: Vec<i32> = records.iter().map(|r| r.year).collect();
        years.sort_unstable_by(|a, b| b.cmp(a));
        years.dedup();

        let mut departments = Vec::new();
        let mut faculties = Vec::new();
        let mut departments_by_faculty: Vec<(String, Vec<String>)> = Vec::new();
        {
            let mut seen_depts: HashSet<&str> = HashSet::new();
            let mut faculty_slot: HashMap<&str, usize> = HashMap::new();
            for rec in &records {
                let slot = *faculty_slot.entry(rec.faculty.as_str()).or_insert_with(|| {
                    faculties.push(rec.faculty.clone());
                    departments_by_faculty.push((rec.faculty.clone(), Vec::new()));
                    departments_by_faculty.len() - 1
                });
                if seen_depts.insert(rec.department.as_str()) {
                    departments.push(rec.department.clone());
                    departments_by_faculty[slot].1.push(rec.department.clone());
                }
            }
        }
        // A faculty whose departments all appeared under another one first.
        departments_by_faculty.retain(|(_, depts)| !depts.is_empty());

        Dataset {
            records,
            years,
            departments,
            faculties,
            departments_by_faculty,
            rejected_rows: 0,
        }
    }

    /// Record how many source rows the loader dropped.
    pub fn with_rejected_rows(mut self, rejected_rows: usize) -> Self {
        self.rejected_rows = rejected_rows;
        self
    }

    pub fn rejected_rows(&self) -> usize {
        self.rejected_rows
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Distinct years sorted descending.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn departments(&self) -> &[String] {
        &self.departments
    }

    pub fn faculties(&self) -> &[String] {
        &self.faculties
    }

    /// Departments grouped under the faculty they were first seen with,
    /// faculties in the same order as [`faculties`](Self::faculties).
    pub fn departments_by_faculty(&self) -> &[(String, Vec<String>)] {
        &self.departments_by_faculty
    }

    /// `(oldest, newest)` year, or `None` for an empty dataset.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        Some((*self.years.last()?, *self.years.first()?))
    }

    /// Pick the department a selector should start on: `preferred` when the
    /// dataset has it, otherwise the first department seen.
    pub fn default_department(&self, preferred: Option<&str>) -> Option<&str> {
        if let Some(p) = preferred {
            if let Some(d) = self.departments.iter().find(|d| d.as_str() == p) {
                return Some(d.as_str());
            }
            log::warn!("Preferred department {p:?} not in dataset, using first available");
        }
        self.departments.first().map(String::as_str)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(year: i32, faculty: &str, dept: &str) -> Record {
        Record {
            year,
            semester: Semester::One,
            faculty: faculty.into(),
            department: dept.into(),
            country: "Japan".into(),
            institution: "Kyoto University".into(),
        }
    }

    #[test]
    fn semester_labels() {
        assert_eq!(Semester::from_label("一學期"), Semester::One);
        assert_eq!(Semester::from_label("  One Semester "), Semester::One);
        assert_eq!(Semester::from_label("二學期"), Semester::Two);
        assert_eq!(Semester::from_label("full year"), Semester::FullYear);
        assert_eq!(
            Semester::from_label("summer"),
            Semester::Other("summer".into())
        );
        assert!(!Semester::from_label("summer").is_one_semester());
    }

    #[test]
    fn lookup_lists_are_distinct() {
        let ds = Dataset::from_records(vec![
            rec(106, "社會科學院", "經濟學系"),
            rec(108, "文學院", "歷史學系"),
            rec(106, "社會科學院", "經濟學系"),
            rec(107, "社會科學院", "政治學系"),
        ]);
        assert_eq!(ds.years(), &[108, 107, 106]);
        assert_eq!(ds.departments(), &["經濟學系", "歷史學系", "政治學系"]);
        assert_eq!(ds.faculties(), &["社會科學院", "文學院"]);
        let grouped: Vec<(&str, Vec<&str>)> = ds
            .departments_by_faculty()
            .iter()
            .map(|(f, d)| (f.as_str(), d.iter().map(String::as_str).collect()))
            .collect();
        assert_eq!(
            grouped,
            vec![("社會科學院", vec!["經濟學系", "政治學系"]), ("文學院", vec!["歷史學系"])]
        );
        assert_eq!(ds.year_bounds(), Some((106, 108)));
        assert_eq!(ds.len(), 4);
    }

    #[test]
    fn faculty_groups_follow_first_appearance() {
        // 文學院 sorts first by code point but appears last.
        let ds = Dataset::from_records(vec![
            rec(106, "社會科學院", "經濟學系"),
            rec(106, "管理學院", "財務金融學系"),
            rec(106, "工學院", "經濟學系"),
            rec(106, "文學院", "歷史學系"),
        ]);
        let order: Vec<&str> = ds
            .departments_by_faculty()
            .iter()
            .map(|(f, _)| f.as_str())
            .collect();
        // 工學院 contributed no new department, so it has no group.
        assert_eq!(order, vec!["社會科學院", "管理學院", "文學院"]);
        assert_eq!(ds.faculties(), &["社會科學院", "管理學院", "工學院", "文學院"]);
        assert_eq!(ds.rejected_rows(), 0);
    }

    #[test]
    fn default_department_falls_back_to_first() {
        let ds = Dataset::from_records(vec![rec(106, "F", "A"), rec(106, "F", "B")]);
        assert_eq!(ds.default_department(Some("B")), Some("B"));
        assert_eq!(ds.default_department(Some("Z")), Some("A"));
        assert_eq!(ds.default_department(None), Some("A"));

        let empty = Dataset::from_records(Vec::new());
        assert_eq!(empty.default_department(None), None);
        assert_eq!(empty.year_bounds(), None);
    }
}
