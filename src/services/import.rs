//! Bulk upload of catalog courses and assignments from CSV, Excel (XLSX/XLS) or JSON.
//!
//! Every format is first flattened into header -> value rows. Each row is
//! then read leniently and upserted on its own; a bad row is reported and
//! skipped without aborting the rest of the batch.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Reader};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::assignment::{CreateAssignment, Priority};
use crate::models::course::{CourseLevel, CreateCourse};
use crate::models::lenient::{value_as_f64, value_as_i32};
use crate::services::{assignment, catalog};

/// One uploaded record keyed by column header.
pub type Row = HashMap<String, Value>;

/// Upload file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    /// `.xlsx` or legacy `.xls`; calamine picks the reader from the bytes.
    Excel,
    Json,
}

impl ImportFormat {
    /// Detect format from filename extension.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".csv") {
            Some(Self::Csv)
        } else if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
            Some(Self::Excel)
        } else if lower.ends_with(".json") {
            Some(Self::Json)
        } else {
            None
        }
    }
}

/// Outcome of a bulk upload.
#[derive(Debug, Serialize, Default)]
pub struct ImportResult {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub errors: Vec<ImportError>,
}

/// A rejected row. `row` is 1-based within the uploaded records.
#[derive(Debug, Serialize)]
pub struct ImportError {
    pub row: usize,
    pub message: String,
}

/// Flatten an upload into header -> value rows.
pub fn parse_rows(data: &[u8], format: ImportFormat) -> Result<Vec<Row>, AppError> {
    match format {
        ImportFormat::Csv => parse_csv_rows(data),
        ImportFormat::Excel => parse_excel_rows(data),
        ImportFormat::Json => parse_json_rows(data),
    }
}

fn parse_csv_rows(data: &[u8]) -> Result<Vec<Row>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::Validation(format!("Invalid CSV headers: {e}")))?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| AppError::Validation(format!("CSV parse error: {e}")))?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), Value::String(v.to_string())))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn parse_excel_rows(data: &[u8]) -> Result<Vec<Row>, AppError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data))
        .map_err(|e| AppError::Validation(format!("Invalid spreadsheet: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AppError::Validation("Spreadsheet has no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| AppError::Validation(format!("Failed to read sheet '{sheet_name}': {e}")))?;

    let mut row_iter = range.rows();
    let headers: Vec<String> = row_iter
        .next()
        .ok_or_else(|| AppError::Validation("Spreadsheet sheet is empty".to_string()))?
        .iter()
        .map(|cell| normalize_header(&cell.to_string()))
        .collect();

    let rows = row_iter
        .map(|cells| {
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| {
                    let value = cells.get(i).map(|c| c.to_string()).unwrap_or_default();
                    (h.clone(), Value::String(value.trim().to_string()))
                })
                .collect()
        })
        .collect();
    Ok(rows)
}

/// A JSON upload is an array of objects.
fn parse_json_rows(data: &[u8]) -> Result<Vec<Row>, AppError> {
    let items: Vec<Value> = serde_json::from_slice(data)
        .map_err(|e| AppError::Validation(format!("Invalid JSON upload: {e}")))?;

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(map
                .into_iter()
                .map(|(k, v)| (normalize_header(&k), v))
                .collect()),
            _ => Err(AppError::Validation(format!(
                "Record {} is not an object",
                i + 1
            ))),
        })
        .collect()
}

/// `Total Lessons`, `totalLessons` and `total_lessons` all read the same.
fn normalize_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);
    let mut prev_lower = false;
    for ch in raw.trim().chars() {
        if ch.is_ascii_uppercase() && prev_lower {
            out.push('_');
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
            prev_lower = false;
        }
    }
    out.trim_end_matches('_').to_string()
}

/// First non-blank text value among the given column names.
fn text(row: &Row, columns: &[&str]) -> Option<String> {
    columns.iter().find_map(|c| match row.get(*c) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn number<'a>(row: &'a Row, columns: &[&str]) -> Option<&'a Value> {
    columns
        .iter()
        .filter_map(|c| row.get(*c))
        .find(|v| !v.is_null() && v.as_str().map_or(true, |s| !s.trim().is_empty()))
}

fn optional_id(row: &Row) -> Option<i32> {
    number(row, &["id"]).map(value_as_i32).filter(|id| *id > 0)
}

/// Attachments come as a JSON array or a `;`/`,` separated cell.
fn list(row: &Row, column: &str) -> Vec<String> {
    match row.get(column) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s
            .split([';', ','])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// RFC 3339 timestamps, `YYYY-MM-DD HH:MM[:SS]`, or a bare date (end of day UTC).
fn parse_due(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(23, 59, 0))
        .map(|naive| naive.and_utc())
}

fn course_from_row(row: &Row) -> Result<CreateCourse, String> {
    let title = text(row, &["title", "name"]).ok_or("missing title")?;
    let teacher_name =
        text(row, &["teacher_name", "teacher", "instructor"]).ok_or("missing teacher_name")?;
    let category = text(row, &["category"]).ok_or("missing category")?;

    Ok(CreateCourse {
        id: optional_id(row),
        title,
        description: text(row, &["description"]).unwrap_or_default(),
        teacher_name,
        teacher_id: None,
        category: category.to_lowercase(),
        level: text(row, &["level"])
            .map(|l| CourseLevel::parse_lenient(&l))
            .unwrap_or_default(),
        duration: text(row, &["duration"]).unwrap_or_default(),
        total_lessons: number(row, &["total_lessons", "lessons"])
            .map(value_as_i32)
            .unwrap_or(0)
            .max(0),
        thumbnail: text(row, &["thumbnail", "image"]).unwrap_or_default(),
        video_url: text(row, &["video_url", "video"]),
    })
}

fn assignment_from_row(row: &Row) -> Result<CreateAssignment, String> {
    let title = text(row, &["title"]).ok_or("missing title")?;
    let course = text(row, &["course", "course_title"]).ok_or("missing course")?;
    let due_raw = text(row, &["due_at", "due_date", "due"]).ok_or("missing due date")?;
    let due_at = parse_due(&due_raw).ok_or_else(|| format!("unreadable due date '{due_raw}'"))?;

    Ok(CreateAssignment {
        id: optional_id(row),
        course_id: number(row, &["course_id"])
            .map(value_as_i32)
            .filter(|id| *id > 0),
        title,
        course,
        teacher_name: text(row, &["teacher_name", "teacher", "instructor"]).unwrap_or_default(),
        description: text(row, &["description"]).unwrap_or_default(),
        due_at,
        max_score: number(row, &["max_score", "points"])
            .map(value_as_f64)
            .unwrap_or(100.0),
        priority: text(row, &["priority"])
            .map(|p| Priority::parse_lenient(&p))
            .unwrap_or_default(),
        category: text(row, &["category", "type"]).unwrap_or_default(),
        attachments: list(row, "attachments"),
        estimated_time: text(row, &["estimated_time"]).unwrap_or_default(),
    })
}

/// Upsert courses from parsed rows. Rows without an id get a fresh one.
pub async fn import_courses(pool: &PgPool, rows: &[Row]) -> Result<ImportResult, AppError> {
    let mut result = ImportResult {
        total: rows.len(),
        ..ImportResult::default()
    };

    for (i, row) in rows.iter().enumerate() {
        let input = match course_from_row(row) {
            Ok(input) => input,
            Err(message) => {
                result.errors.push(ImportError { row: i + 1, message });
                continue;
            }
        };

        let outcome = match input.id {
            Some(id) => catalog::upsert(pool, id, &input).await,
            None => catalog::create(pool, &input).await.map(|_| true),
        };
        record(&mut result, i, outcome);
    }

    tracing::info!(
        total = result.total,
        created = result.created,
        updated = result.updated,
        errors = result.errors.len(),
        "Course import finished"
    );
    Ok(result)
}

/// Upsert assignments from parsed rows.
pub async fn import_assignments(pool: &PgPool, rows: &[Row]) -> Result<ImportResult, AppError> {
    let mut result = ImportResult {
        total: rows.len(),
        ..ImportResult::default()
    };

    for (i, row) in rows.iter().enumerate() {
        let input = match assignment_from_row(row) {
            Ok(input) => input,
            Err(message) => {
                result.errors.push(ImportError { row: i + 1, message });
                continue;
            }
        };

        let outcome = match input.id {
            Some(id) => assignment::upsert(pool, id, &input).await,
            None => assignment::create(pool, &input).await.map(|_| true),
        };
        record(&mut result, i, outcome);
    }

    tracing::info!(
        total = result.total,
        created = result.created,
        updated = result.updated,
        errors = result.errors.len(),
        "Assignment import finished"
    );
    Ok(result)
}

fn record(result: &mut ImportResult, index: usize, outcome: Result<bool, AppError>) {
    match outcome {
        Ok(true) => result.created += 1,
        Ok(false) => result.updated += 1,
        Err(AppError::Database(e)) => {
            tracing::warn!(row = index + 1, error = %e, "Import row failed");
            result.errors.push(ImportError {
                row: index + 1,
                message: "database rejected the row".to_string(),
            });
        }
        Err(e) => result.errors.push(ImportError {
            row: index + 1,
            message: e.to_string(),
        }),
    }
}
