//! Writes a deterministic sample exchange table as CSV and Parquet.
//!
//! ```text
//! cargo run --bin generate_sample -- [output_dir]
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const HEADERS: [&str; 6] = ["學年", "學期", "學院", "學系", "國家", "學校"];

const DEPARTMENTS: &[(&str, &str)] = &[
    ("社會科學院", "經濟學系"),
    ("社會科學院", "政治學系"),
    ("文學院", "外國語文學系"),
    ("文學院", "歷史學系"),
    ("工學院", "機械工程學系"),
    ("管理學院", "財務金融學系"),
];

const DESTINATIONS: &[(&str, &str)] = &[
    ("日本", "京都大學"),
    ("日本", "東京大學"),
    ("美國", "加州大學洛杉磯分校"),
    ("美國", "伊利諾大學香檳分校"),
    ("德國", "慕尼黑大學"),
    ("法國", "巴黎政治學院"),
    ("南韓", "首爾大學"),
    ("荷蘭", "阿姆斯特丹大學"),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

fn generate_rows(rng: &mut SimpleRng) -> Vec<[String; 6]> {
    let mut rows = Vec::new();
    for year in 100..=108 {
        let per_year = 20 + rng.below(15);
        for _ in 0..per_year {
            let (faculty, department) = rng.pick(DEPARTMENTS);
            let (country, school) = rng.pick(DESTINATIONS);
            let semester = match rng.below(10) {
                0..=5 => "一學期",
                6..=8 => "二學期",
                _ => "全學年",
            };
            rows.push([
                format!("{year}學年"),
                semester.to_string(),
                faculty.to_string(),
                department.to_string(),
                country.to_string(),
                school.to_string(),
            ]);
        }
    }
    // A few incomplete rows, which the loader drops.
    for i in [3usize, 17, 42] {
        if let Some(row) = rows.get_mut(i) {
            row[i % 6].clear();
        }
    }
    rows
}

fn write_csv(path: &Path, rows: &[[String; 6]]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record(HEADERS).context("writing CSV header")?;
    for row in rows {
        writer.write_record(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[[String; 6]]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(
        HEADERS
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));

    // Empty cells become nulls, like pandas' NaN.
    let columns: Vec<ArrayRef> = (0..HEADERS.len())
        .map(|c| {
            let values: StringArray = rows
                .iter()
                .map(|row| Some(row[c].as_str()).filter(|v| !v.is_empty()))
                .collect();
            Arc::new(values) as ArrayRef
        })
        .collect();

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating Parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating Parquet writer")?;
    writer.write(&batch).context("writing Parquet batch")?;
    writer.close().context("closing Parquet writer")?;
    Ok(batch)
}

fn main() -> Result<()> {
    let out_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| ".".to_string()));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng);

    let csv_path = out_dir.join("sample_exchange.csv");
    write_csv(&csv_path, &rows)?;

    let parquet_path = out_dir.join("sample_exchange.parquet");
    let batch = write_parquet(&parquet_path, &rows)?;

    arrow::util::pretty::print_batches(&[batch.slice(0, batch.num_rows().min(5))])
        .context("printing preview")?;
    println!(
        "Wrote {} rows to {} and {}",
        rows.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
