//! Summary statistics over the converter's per-article table files.
//!
//! Tables arrive as Feather (Arrow IPC) files, one per article, with
//! `.parquet` accepted as an equivalent. The columns are whatever the
//! converter produced; only a handful of well-known names are given meaning
//! here, and all of them are optional.

pub mod report;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, Float64Array, Int64Array, LargeStringArray, StringArray, TimestampMicrosecondArray,
    TimestampMillisecondArray, TimestampNanosecondArray, TimestampSecondArray,
};
use arrow::datatypes::{DataType, SchemaRef, TimeUnit};
use arrow::ipc::reader::FileReader;
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDateTime, Utc};
use glob::glob;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const USERNAME_COLUMN: &str = "username";
pub const TEXT_LENGTH_COLUMN: &str = "text_length";
pub const TEXT_COLUMN: &str = "text";

#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub null_count: usize,
}

/// Descriptive statistics for one article table. Optional fields are `None`
/// when the backing column is absent or the table has no rows.
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub article: String,
    pub path: PathBuf,
    pub rows: usize,
    pub columns: Vec<ColumnInfo>,
    pub first_edit: Option<DateTime<Utc>>,
    pub last_edit: Option<DateTime<Utc>>,
    pub unique_contributors: Option<usize>,
    pub avg_text_length: Option<f64>,
    pub text_bytes: Option<u64>,
}

/// Resolve `<output_dir>/<article>.feather` (then `.parquet`) and summarize it.
pub fn summarize_article(output_dir: &Path, article: &str) -> Result<TableSummary> {
    for ext in ["feather", "parquet"] {
        let candidate = output_dir.join(format!("{article}.{ext}"));
        if candidate.exists() {
            return summarize_file(&candidate);
        }
    }
    bail!(
        "no table file for `{}` under {}",
        article,
        output_dir.display()
    )
}

/// All table files under `output_dir`, sorted by path.
pub fn discover_tables(output_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for ext in ["feather", "parquet"] {
        let pattern = format!("{}/*.{}", output_dir.display(), ext);
        for entry in glob(&pattern).with_context(|| format!("globbing {pattern}"))? {
            found.push(entry?);
        }
    }
    found.sort();
    Ok(found)
}

/// Load one table file and compute its summary statistics.
pub fn summarize_file(path: &Path) -> Result<TableSummary> {
    let article = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("<table>")
        .to_string();
    let (schema, batches) = read_batches(path)?;

    let column_idx = |name: &str| schema.column_with_name(name).map(|(idx, _)| idx);
    let timestamp_idx = column_idx(TIMESTAMP_COLUMN);
    let username_idx = column_idx(USERNAME_COLUMN);
    let text_len_idx = column_idx(TEXT_LENGTH_COLUMN);
    let text_idx = column_idx(TEXT_COLUMN);

    let mut rows = 0usize;
    let mut null_counts = vec![0usize; schema.fields().len()];
    let mut first_edit = None;
    let mut last_edit = None;
    let mut contributors: Option<HashSet<String>> = username_idx.map(|_| HashSet::new());
    let mut text_len_sum = 0f64;
    let mut text_len_count = 0usize;
    let mut text_bytes = 0u64;

    for batch in &batches {
        rows += batch.num_rows();
        for (i, col) in batch.columns().iter().enumerate() {
            null_counts[i] += col.null_count();
        }
        if let Some(idx) = timestamp_idx {
            scan_timestamps(batch.column(idx).as_ref(), &mut first_edit, &mut last_edit);
        }
        if let (Some(idx), Some(set)) = (username_idx, contributors.as_mut()) {
            collect_strings(batch.column(idx).as_ref(), set);
        }
        if let Some(idx) = text_len_idx {
            sum_numeric(
                batch.column(idx).as_ref(),
                &mut text_len_sum,
                &mut text_len_count,
            );
        }
        if let Some(idx) = text_idx {
            text_bytes += utf8_bytes(batch.column(idx).as_ref());
        }
    }

    let columns = schema
        .fields()
        .iter()
        .zip(null_counts)
        .map(|(field, nulls)| ColumnInfo {
            name: field.name().clone(),
            data_type: field.data_type().to_string(),
            null_count: nulls,
        })
        .collect();

    Ok(TableSummary {
        article,
        path: path.to_path_buf(),
        rows,
        columns,
        first_edit,
        last_edit,
        unique_contributors: contributors.map(|set| set.len()),
        avg_text_length: (text_len_count > 0).then(|| text_len_sum / text_len_count as f64),
        text_bytes: text_idx.map(|_| text_bytes),
    })
}

fn read_batches(path: &Path) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let file =
        File::open(path).with_context(|| format!("opening table file {}", path.display()))?;
    match ext.as_str() {
        "feather" | "arrow" | "ipc" => {
            let reader = FileReader::try_new(file, None)
                .with_context(|| format!("reading Feather file {}", path.display()))?;
            let schema = reader.schema();
            let batches = reader
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("decoding record batches from {}", path.display()))?;
            Ok((schema, batches))
        }
        "parquet" => {
            let builder = ParquetRecordBatchReaderBuilder::try_new(file)
                .with_context(|| format!("reading Parquet file {}", path.display()))?;
            let schema = builder.schema().clone();
            let reader = builder
                .build()
                .with_context(|| format!("opening Parquet reader for {}", path.display()))?;
            let batches = reader
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("decoding record batches from {}", path.display()))?;
            Ok((schema, batches))
        }
        other => bail!(
            "unsupported table format `{}` for {}",
            other,
            path.display()
        ),
    }
}

fn fold_edit(
    first: &mut Option<DateTime<Utc>>,
    last: &mut Option<DateTime<Utc>>,
    dt: DateTime<Utc>,
) {
    match first {
        Some(cur) if *cur <= dt => {}
        _ => *first = Some(dt),
    }
    match last {
        Some(cur) if *cur >= dt => {}
        _ => *last = Some(dt),
    }
}

/// Track min/max over a timestamp column of any unit; string columns are
/// parsed leniently (RFC 3339 first, then `%Y-%m-%d %H:%M:%S`).
fn scan_timestamps(
    array: &dyn Array,
    first: &mut Option<DateTime<Utc>>,
    last: &mut Option<DateTime<Utc>>,
) {
    match array.data_type() {
        DataType::Timestamp(TimeUnit::Second, _) => {
            if let Some(arr) = array.as_any().downcast_ref::<TimestampSecondArray>() {
                for v in arr.iter().flatten() {
                    if let Some(dt) = DateTime::from_timestamp(v, 0) {
                        fold_edit(first, last, dt);
                    }
                }
            }
        }
        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            if let Some(arr) = array.as_any().downcast_ref::<TimestampMillisecondArray>() {
                for v in arr.iter().flatten() {
                    if let Some(dt) = DateTime::from_timestamp_millis(v) {
                        fold_edit(first, last, dt);
                    }
                }
            }
        }
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            if let Some(arr) = array.as_any().downcast_ref::<TimestampMicrosecondArray>() {
                for v in arr.iter().flatten() {
                    if let Some(dt) = DateTime::from_timestamp_micros(v) {
                        fold_edit(first, last, dt);
                    }
                }
            }
        }
        DataType::Timestamp(TimeUnit::Nanosecond, _) => {
            if let Some(arr) = array.as_any().downcast_ref::<TimestampNanosecondArray>() {
                for v in arr.iter().flatten() {
                    fold_edit(first, last, DateTime::from_timestamp_nanos(v));
                }
            }
        }
        DataType::Utf8 => {
            if let Some(arr) = array.as_any().downcast_ref::<StringArray>() {
                for s in arr.iter().flatten() {
                    if let Some(dt) = parse_timestamp(s) {
                        fold_edit(first, last, dt);
                    }
                }
            }
        }
        DataType::LargeUtf8 => {
            if let Some(arr) = array.as_any().downcast_ref::<LargeStringArray>() {
                for s in arr.iter().flatten() {
                    if let Some(dt) = parse_timestamp(s) {
                        fold_edit(first, last, dt);
                    }
                }
            }
        }
        _ => {}
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn collect_strings(array: &dyn Array, out: &mut HashSet<String>) {
    if let Some(arr) = array.as_any().downcast_ref::<StringArray>() {
        out.extend(arr.iter().flatten().map(str::to_string));
    } else if let Some(arr) = array.as_any().downcast_ref::<LargeStringArray>() {
        out.extend(arr.iter().flatten().map(str::to_string));
    }
}

fn sum_numeric(array: &dyn Array, sum: &mut f64, count: &mut usize) {
    if let Some(arr) = array.as_any().downcast_ref::<Int64Array>() {
        for v in arr.iter().flatten() {
            *sum += v as f64;
            *count += 1;
        }
    } else if let Some(arr) = array.as_any().downcast_ref::<Float64Array>() {
        for v in arr.iter().flatten() {
            *sum += v;
            *count += 1;
        }
    }
}

fn utf8_bytes(array: &dyn Array) -> u64 {
    if let Some(arr) = array.as_any().downcast_ref::<StringArray>() {
        arr.iter().flatten().map(|s| s.len() as u64).sum()
    } else if let Some(arr) = array.as_any().downcast_ref::<LargeStringArray>() {
        arr.iter().flatten().map(|s| s.len() as u64).sum()
    } else {
        0
    }
}
