//! CSV ingest of a student record.
//!
//! The input is the single-sheet layout of the grading spreadsheet:
//!
//! | Parameter        | Subject Name | Theory Marks | Practical Marks | Theory Credits | Practical Credits | Value |
//! |------------------|--------------|--------------|-----------------|----------------|-------------------|-------|
//! | Attendance Bonus |              |              |                 |                |                   | 7     |
//! | Subject 1        | Mathematics  | 32           | 33              | 3              | 1                 |       |
//!
//! - header names are matched case-insensitively (a UTF-8 BOM is ignored)
//! - rows whose `Parameter` contains "subject" define subjects
//! - exactly one `Attendance Bonus` row carries the budget in `Value`
//! - an empty cell means the component is absent
//!
//! Missing columns and unreadable files are format errors (exit code 2). Bad
//! values are `GradingError::InvalidInput` naming the subject and column.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::debug;

use crate::domain::{ComponentKind, ComponentValues, StudentRecord};
use crate::error::{AppError, EXIT_IO, GradingError};

pub const COL_PARAMETER: &str = "parameter";
pub const COL_SUBJECT: &str = "subject name";
pub const COL_THEORY_MARKS: &str = "theory marks";
pub const COL_PRACTICAL_MARKS: &str = "practical marks";
pub const COL_THEORY_CREDITS: &str = "theory credits";
pub const COL_PRACTICAL_CREDITS: &str = "practical credits";
pub const COL_VALUE: &str = "value";

const REQUIRED_COLUMNS: [&str; 7] = [
    COL_PARAMETER,
    COL_SUBJECT,
    COL_THEORY_MARKS,
    COL_PRACTICAL_MARKS,
    COL_THEORY_CREDITS,
    COL_PRACTICAL_CREDITS,
    COL_VALUE,
];

/// `Parameter` of the row carrying the attendance bonus budget.
pub const ATTENDANCE_PARAMETER: &str = "Attendance Bonus";

/// Spreadsheet formats that must be saved as CSV first.
const SPREADSHEET_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

/// Load and validate a student record from a CSV file.
pub fn load_record(path: &Path) -> Result<StudentRecord, AppError> {
    ensure_csv_path(path)?;
    let file = File::open(path)
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to open input CSV '{}': {e}", path.display())))?;
    parse_record(file)
}

/// Reject workbook paths up front instead of failing on their binary content.
pub fn ensure_csv_path(path: &Path) -> Result<(), AppError> {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return Ok(());
    };
    if SPREADSHEET_EXTENSIONS.iter().any(|s| ext.eq_ignore_ascii_case(s)) {
        return Err(AppError::new(
            EXIT_IO,
            format!(
                "Unsupported format '.{ext}' for '{}': save the workbook as CSV (one row per subject)",
                path.display()
            ),
        ));
    }
    Ok(())
}

/// Parse a student record from any CSV source.
pub fn parse_record<R: Read>(source: R) -> Result<StudentRecord, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut marks = Vec::new();
    let mut credits = Vec::new();
    let mut budget: Option<f64> = None;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header; CSV lines are 1-based.
        let line = idx + 2;
        let row = result.map_err(|e| AppError::new(EXIT_IO, format!("CSV parse error on line {line}: {e}")))?;

        let Some(parameter) = get_cell(&row, &header_map, COL_PARAMETER) else {
            continue;
        };

        if parameter.eq_ignore_ascii_case(ATTENDANCE_PARAMETER) {
            if budget.is_some() {
                return Err(GradingError::record(format!("second '{ATTENDANCE_PARAMETER}' row on line {line}")).into());
            }
            let value = get_cell(&row, &header_map, COL_VALUE).ok_or_else(|| {
                GradingError::record(format!("'{ATTENDANCE_PARAMETER}' row on line {line} has no value"))
            })?;
            budget = Some(parse_number(value, None, COL_VALUE)?);
        } else if parameter.to_ascii_lowercase().contains("subject") {
            let name = get_cell(&row, &header_map, COL_SUBJECT)
                .ok_or_else(|| GradingError::record(format!("subject row on line {line} has no subject name")))?
                .to_string();
            marks.push((name.clone(), read_pair(&row, &header_map, &name, COL_THEORY_MARKS, COL_PRACTICAL_MARKS)?));
            credits.push((name.clone(), read_pair(&row, &header_map, &name, COL_THEORY_CREDITS, COL_PRACTICAL_CREDITS)?));
        } else {
            debug!(line, parameter, "ignoring row");
        }
    }

    let budget =
        budget.ok_or_else(|| GradingError::record(format!("missing '{ATTENDANCE_PARAMETER}' row")))?;

    debug!(subjects = marks.len(), budget, "parsed input");
    Ok(StudentRecord::from_sheets(&marks, &credits, budget)?)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !header_map.contains_key(*c))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::new(
            EXIT_IO,
            format!("Missing required column(s): {}", missing.join(", ")),
        ))
    }
}

fn get_cell<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn read_pair(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    subject: &str,
    theory_col: &str,
    practical_col: &str,
) -> Result<ComponentValues, GradingError> {
    let mut values = ComponentValues::default();
    for (kind, col) in [(ComponentKind::Theory, theory_col), (ComponentKind::Practical, practical_col)] {
        if let Some(cell) = get_cell(record, header_map, col) {
            values.set(kind, parse_number(cell, Some((subject, kind)), col)?);
        }
    }
    Ok(values)
}

fn parse_number(cell: &str, at: Option<(&str, ComponentKind)>, column: &str) -> Result<f64, GradingError> {
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => {
            let constraint = format!("column '{column}' is not a number: '{cell}'");
            Err(match at {
                Some((subject, kind)) => GradingError::component(subject, kind, constraint),
                None => GradingError::record(constraint),
            })
        }
    }
}
