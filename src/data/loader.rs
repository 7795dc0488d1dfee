use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Dataset, Record, Semester};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Everything that can go wrong while loading a source table.
///
/// A load either produces a complete cleaned [`Dataset`] or one of these;
/// there is no partial fallback.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("Invalid JSON layout: {0}")]
    InvalidJson(String),

    #[error("Missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("Column '{column}' has type {data_type}, expected a string column")]
    UnsupportedColumnType { column: String, data_type: String },

    #[error("Row {row}: malformed academic year {value:?}")]
    MalformedYear { row: usize, value: String },

    #[error("No complete records after cleaning ({rejected} rows rejected)")]
    Empty { rejected: usize },
}

// ---------------------------------------------------------------------------
// Source schema
// ---------------------------------------------------------------------------

/// The six source columns, in upstream order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Year,
    Semester,
    Faculty,
    Department,
    Country,
    Institution,
}

const COLUMNS: [Column; 6] = [
    Column::Year,
    Column::Semester,
    Column::Faculty,
    Column::Department,
    Column::Country,
    Column::Institution,
];

impl Column {
    /// Accepted header names: the upstream header first, then English aliases.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Year => &["學年", "year", "academic_year"],
            Column::Semester => &["學期", "semester"],
            Column::Faculty => &["學院", "faculty"],
            Column::Department => &["學系", "department"],
            Column::Country => &["國家", "country"],
            Column::Institution => &["學校", "institution", "school"],
        }
    }

    fn name(self) -> &'static str {
        self.aliases()[1]
    }
}

/// Header text as compared against [`Column::aliases`].
fn normalize_header(h: &str) -> String {
    h.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Map each [`Column`] to its index among `headers`.
fn locate_columns<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<[usize; 6], LoadError> {
    let headers: Vec<String> = headers.into_iter().map(normalize_header).collect();

    let mut indices = [0usize; 6];
    for (slot, column) in indices.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| column.aliases().contains(&h.as_str()))
            .ok_or(LoadError::MissingColumn(column.name()))?;
    }
    Ok(indices)
}

/// Strip the two-character school-year suffix (`107學年` → `107`).
///
/// Both suffix characters must be non-digits so that a bare number such as
/// `2018` is reported instead of silently becoming `20`.
pub fn parse_year(raw: &str) -> Option<i32> {
    let mut tail = raw.char_indices().rev();
    let (_, last) = tail.next()?;
    let (cut, second_last) = tail.next()?;
    if last.is_ascii_digit() || second_last.is_ascii_digit() {
        return None;
    }
    raw[..cut].parse().ok()
}

// ---------------------------------------------------------------------------
// Row cleaning (shared by all formats)
// ---------------------------------------------------------------------------

/// Accumulates accepted records and counts rejected rows.
#[derive(Default)]
struct Cleaner {
    records: Vec<Record>,
    rejected: usize,
}

impl Cleaner {
    /// Accept or reject one row. `row` is 1-based, header excluded.
    ///
    /// Missing or blank fields reject the row; a malformed year fails the load.
    fn push(&mut self, row: usize, fields: [Option<&str>; 6]) -> Result<(), LoadError> {
        let fields = fields.map(|f| f.map(str::trim).filter(|f| !f.is_empty()));
        let [Some(year), Some(semester), Some(faculty), Some(department), Some(country), Some(institution)] =
            fields
        else {
            log::debug!("Row {row}: incomplete, dropped");
            self.rejected += 1;
            return Ok(());
        };

        let year = parse_year(year).ok_or_else(|| LoadError::MalformedYear {
            row,
            value: year.to_string(),
        })?;

        self.records.push(Record {
            year,
            semester: Semester::from_label(semester),
            faculty: faculty.to_string(),
            department: department.to_string(),
            country: country.to_string(),
            institution: institution.to_string(),
        });
        Ok(())
    }

    fn finish(self, path: &Path) -> Result<Dataset, LoadError> {
        if self.records.is_empty() {
            return Err(LoadError::Empty {
                rejected: self.rejected,
            });
        }
        log::info!(
            "Loaded {} records from {} ({} incomplete rows dropped)",
            self.records.len(),
            path.display(),
            self.rejected
        );
        Ok(Dataset::from_records(self.records).with_rejected_rows(self.rejected))
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and clean an exchange table.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one record per line (upstream format)
/// * `.json`    – `[{ "學年": "107學年", "學期": "一學期", ... }, ...]`
/// * `.parquet` – string columns named like the CSV headers
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Short rows are tolerated by the reader (`flexible`) and then dropped by
/// the cleaner, like any other incomplete row.
fn load_csv(path: &Path) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)?;
    let columns = locate_columns(reader.headers()?.iter())?;

    let mut cleaner = Cleaner::default();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        cleaner.push(i + 1, columns.map(|idx| record.get(idx)))?;
    }
    cleaner.finish(path)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
/// `null` and missing keys count as empty fields, so such rows are dropped;
/// numbers are read as text. A column no row has at all is a schema error.
fn load_json(path: &Path) -> Result<Dataset, LoadError> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let rows = root
        .as_array()
        .ok_or_else(|| LoadError::InvalidJson("expected a top-level array".into()))?;

    let mut cleaner = Cleaner::default();
    let mut seen = [false; 6];
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .ok_or_else(|| LoadError::InvalidJson(format!("row {} is not an object", i + 1)))?;

        let fields = COLUMNS.map(|column| json_field(obj, column));
        for (flag, field) in seen.iter_mut().zip(&fields) {
            *flag |= field.is_some();
        }

        let cells: [Option<String>; 6] = fields.map(|f| f.and_then(json_cell));
        cleaner.push(i + 1, cells.each_ref().map(|c| c.as_deref()))?;
    }

    if !rows.is_empty() {
        if let Some((_, column)) = seen.iter().zip(COLUMNS).find(|(flag, _)| !**flag) {
            return Err(LoadError::MissingColumn(column.name()));
        }
    }
    cleaner.finish(path)
}

/// The value stored under any alias of `column`, if the object has one.
fn json_field(obj: &serde_json::Map<String, JsonValue>, column: Column) -> Option<&JsonValue> {
    obj.iter()
        .find(|(key, _)| column.aliases().contains(&normalize_header(key).as_str()))
        .map(|(_, value)| value)
}

fn json_cell(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file whose six columns are Utf8 / LargeUtf8.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset, LoadError> {
    let file = std::fs::File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut cleaner = Cleaner::default();
    let mut row_offset = 0;

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();
        let columns = locate_columns(schema.fields().iter().map(|f| f.name().as_str()))?;

        for &idx in &columns {
            match batch.column(idx).data_type() {
                DataType::Utf8 | DataType::LargeUtf8 => {}
                other => {
                    return Err(LoadError::UnsupportedColumnType {
                        column: schema.field(idx).name().clone(),
                        data_type: format!("{other:?}"),
                    })
                }
            }
        }

        for row in 0..batch.num_rows() {
            let cells = columns.map(|idx| string_cell(batch.column(idx), row));
            cleaner.push(row_offset + row + 1, cells)?;
        }
        row_offset += batch.num_rows();
    }
    cleaner.finish(path)
}

/// Read one cell of a string column; nulls become `None`.
fn string_cell(col: &ArrayRef, row: usize) -> Option<&str> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => Some(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => Some(col.as_string::<i64>().value(row)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const HEADER: &str = "學年,學期,學院,學系,國家,學校\n";

    fn write_file(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn year_suffix_is_stripped() {
        assert_eq!(parse_year("107學年"), Some(107));
        assert_eq!(parse_year("2018AY"), Some(2018));
        assert_eq!(parse_year("2018"), None);
        assert_eq!(parse_year("學年"), None);
        assert_eq!(parse_year("abc學年"), None);
        assert_eq!(parse_year("7"), None);
    }

    #[test]
    fn csv_drops_incomplete_rows() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "{HEADER}\
             107學年,一學期,社會科學院,經濟學系,日本,京都大學\n\
             107學年,,社會科學院,經濟學系,日本,京都大學\n\
             107學年,   ,社會科學院,經濟學系,日本,京都大學\n\
             108學年,全學年,社會科學院,經濟學系,美國\n\
             106學年,二學期,文學院, 歷史學系 ,法國,巴黎大學\n"
        );
        let path = write_file(&dir, "exchange.csv", &body);

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rejected_rows(), 3);
        assert_eq!(ds.years(), &[107, 106]);
        // Kept cells are stored trimmed.
        assert_eq!(ds.departments(), &["經濟學系", "歷史學系"]);
        assert_eq!(ds.records()[1].semester, Semester::Two);
    }

    #[test]
    fn whitespace_only_cell_rejects_the_row() {
        let mut cleaner = Cleaner::default();
        cleaner
            .push(1, [Some("107學年"), Some("   "), Some("A"), Some("B"), Some("C"), Some("D")])
            .unwrap();
        cleaner
            .push(2, [Some("107學年"), Some("一學期"), Some("A"), Some("B"), Some("C"), Some("\t")])
            .unwrap();
        assert!(cleaner.records.is_empty());
        assert_eq!(cleaner.rejected, 2);
    }

    #[test]
    fn csv_accepts_english_headers_in_any_order() {
        let dir = tempfile::tempdir().unwrap();
        let body = "Department,Year,Semester,Faculty,Country,School\n\
                    Economics,2018AY,one semester,Social Sciences,USA,X\n";
        let path = write_file(&dir, "exchange.csv", body);

        let ds = load_file(&path).unwrap();
        let rec = &ds.records()[0];
        assert_eq!(rec.year, 2018);
        assert_eq!(rec.department, "Economics");
        assert_eq!(rec.institution, "X");
    }

    #[test]
    fn malformed_year_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!("{HEADER}107學年,一學期,A,B,C,D\n2018,一學期,A,B,C,D\n");
        let path = write_file(&dir, "exchange.csv", &body);

        match load_file(&path) {
            Err(LoadError::MalformedYear { row, value }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "2018");
            }
            other => panic!("expected MalformedYear, got {other:?}"),
        }
    }

    #[test]
    fn missing_column_and_empty_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "a.csv", "學年,學期,學院,學系,國家\n107學年,一學期,A,B,C\n");
        assert!(matches!(
            load_file(&path),
            Err(LoadError::MissingColumn("institution"))
        ));

        let path = write_file(&dir, "b.csv", &format!("{HEADER},一學期,A,B,C,D\n"));
        assert!(matches!(
            load_file(&path),
            Err(LoadError::Empty { rejected: 1 })
        ));
    }

    #[test]
    fn unsupported_extension_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "data.xlsx", "");
        assert!(matches!(
            load_file(&path),
            Err(LoadError::UnsupportedExtension(ext)) if ext == "xlsx"
        ));
        assert!(matches!(
            load_file(&dir.path().join("nope.csv")),
            Err(LoadError::Csv(_))
        ));
    }

    #[test]
    fn json_rows_with_nulls_or_missing_keys_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let body = r#"[
            {"學年": "107學年", "學期": "一學期", "學院": "A", "學系": "B", "國家": "C", "學校": "D"},
            {"學年": "108學年", "學期": null, "學院": "A", "學系": "B", "國家": "C", "學校": "D"},
            {"學年": "109學年", "學期": "全學年", "學院": "A", "學系": "B", "國家": "C"}
        ]"#;
        let path = write_file(&dir, "exchange.json", body);

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.rejected_rows(), 2);
        assert_eq!(ds.years(), &[107]);
    }

    #[test]
    fn json_column_absent_from_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let body = r#"[
            {"year": "107學年", "semester": "一學期", "faculty": "A", "department": "B", "country": "C"},
            {"year": "108學年", "semester": "一學期", "faculty": "A", "department": "B", "country": "C"}
        ]"#;
        let path = write_file(&dir, "exchange.json", body);
        assert!(matches!(
            load_file(&path),
            Err(LoadError::MissingColumn("institution"))
        ));
    }

    #[test]
    fn parquet_string_columns() {
        use std::sync::Arc;

        use arrow::array::StringArray;
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exchange.parquet");

        let names = ["學年", "學期", "學院", "學系", "國家", "學校"];
        let schema = Arc::new(Schema::new(
            names
                .iter()
                .map(|n| Field::new(*n, DataType::Utf8, true))
                .collect::<Vec<_>>(),
        ));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec![Some("107學年"), Some("108學年")])),
            Arc::new(StringArray::from(vec![Some("一學期"), None])),
            Arc::new(StringArray::from(vec![Some("A"), Some("A")])),
            Arc::new(StringArray::from(vec![Some("B"), Some("B")])),
            Arc::new(StringArray::from(vec![Some("C"), Some("C")])),
            Arc::new(StringArray::from(vec![Some("D"), Some("D")])),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].year, 107);
        assert!(ds.records()[0].semester.is_one_semester());
    }
}
