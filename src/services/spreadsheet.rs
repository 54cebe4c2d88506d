//! Spreadsheet import and CSV export for test cases.
//!
//! Import accepts xlsx/xls (via calamine) and csv. The first row is the
//! header; columns are matched by lowercased name so `Name` and `NAME` both
//! work. The `steps` column holds a JSON array of step objects. CSV export
//! writes exactly the importer's format so an exported file round-trips.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::{step, test_case};
use crate::error::{AppError, AppResult};
use crate::models::{Priority, StepInput, TestStatus};

/// Columns the importer understands, in export order.
const COLUMNS: [&str; 9] = [
    "name",
    "description",
    "precondition",
    "postcondition",
    "status",
    "priority",
    "category",
    "tags",
    "steps",
];

/// One parsed spreadsheet row, ready for insertion.
#[derive(Debug, Clone)]
pub struct ImportedCase {
    pub name: String,
    pub description: String,
    pub precondition: String,
    pub postcondition: String,
    pub status: TestStatus,
    pub priority: Priority,
    pub category: String,
    pub tags: String,
    pub steps: Vec<StepInput>,
}

/// Step shape inside a `steps` cell. Extra keys (including explicit order
/// values) are ignored; imported steps are ordered by array position.
#[derive(Debug, Deserialize)]
struct ImportStep {
    #[serde(default)]
    description: String,
    #[serde(default)]
    expected_result: String,
}

#[derive(Serialize)]
struct ExportStep<'a> {
    description: &'a str,
    expected_result: &'a str,
}

/// Parse an uploaded spreadsheet into cases. The format is picked from the
/// filename extension.
pub fn parse_import(data: &[u8], filename: &str) -> AppResult<Vec<ImportedCase>> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase());

    match extension.as_deref() {
        Some("xlsx") | Some("xls") => parse_workbook(data),
        Some("csv") => parse_csv(data),
        _ => Err(AppError::InvalidInput("Unsupported file format".to_string())),
    }
}

fn parse_workbook(data: &[u8]) -> AppResult<Vec<ImportedCase>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data))
        .map_err(|e| AppError::InvalidInput(format!("Failed to parse spreadsheet: {}", e)))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => {
            range.map_err(|e| AppError::InvalidInput(format!("Failed to read sheet: {}", e)))?
        }
        None => return Ok(Vec::new()),
    };

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let columns = header_map(&header.iter().map(cell_to_string).collect::<Vec<_>>());

    let mut cases = Vec::new();
    for row in rows {
        let cells: Vec<String> = row.iter().map(cell_to_string).collect();
        if let Some(case) = row_to_case(&cells, &columns) {
            cases.push(case);
        }
    }
    Ok(cases)
}

fn parse_csv(data: &[u8]) -> AppResult<Vec<ImportedCase>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);
    let mut records = reader.records();

    let Some(header) = records.next() else {
        return Ok(Vec::new());
    };
    let header = header.map_err(|e| AppError::InvalidInput(format!("Failed to parse CSV: {}", e)))?;
    let columns = header_map(&header.iter().map(str::to_string).collect::<Vec<_>>());

    let mut cases = Vec::new();
    for record in records {
        let record =
            record.map_err(|e| AppError::InvalidInput(format!("Failed to parse CSV: {}", e)))?;
        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        if let Some(case) = row_to_case(&cells, &columns) {
            cases.push(case);
        }
    }
    Ok(cases)
}

/// Map lowercased header names to their column index. The first occurrence
/// of a duplicated header wins.
fn header_map(cells: &[String]) -> HashMap<String, usize> {
    let mut columns = HashMap::new();
    for (index, cell) in cells.iter().enumerate() {
        let key = cell.trim().to_lowercase();
        if !key.is_empty() {
            columns.entry(key).or_insert(index);
        }
    }
    columns
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // whole floats come back from xlsx for plain numbers
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Int(i) => i.to_string(),
        other => other.to_string(),
    }
}

fn row_to_case(cells: &[String], columns: &HashMap<String, usize>) -> Option<ImportedCase> {
    if cells.iter().all(|c| c.trim().is_empty()) {
        return None;
    }

    let get = |name: &str| -> String {
        columns
            .get(name)
            .and_then(|&index| cells.get(index))
            .cloned()
            .unwrap_or_default()
    };

    Some(ImportedCase {
        name: get("name"),
        description: get("description"),
        precondition: get("precondition"),
        postcondition: get("postcondition"),
        status: TestStatus::parse(get("status").trim()).unwrap_or_default(),
        priority: Priority::parse(get("priority").trim()).unwrap_or_default(),
        category: get("category"),
        tags: get("tags"),
        steps: parse_steps_cell(&get("steps")),
    })
}

/// Parse a `steps` cell. A malformed cell costs that row its steps, never
/// the whole import.
fn parse_steps_cell(raw: &str) -> Vec<StepInput> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Vec<ImportStep>>(trimmed) {
        Ok(steps) => steps
            .into_iter()
            .map(|s| StepInput {
                description: s.description,
                expected_result: s.expected_result,
                actual_result: None,
                order: None,
            })
            .collect(),
        Err(e) => {
            debug!("dropping malformed steps cell: {}", e);
            Vec::new()
        }
    }
}

/// Write cases out as CSV in the importer's column layout.
pub fn export_csv(cases: &[(test_case::Model, Vec<step::Model>)]) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(COLUMNS)
        .map_err(|e| AppError::FileSystem(format!("Failed to write CSV: {}", e)))?;

    for (case, steps) in cases {
        let export_steps: Vec<ExportStep<'_>> = steps
            .iter()
            .map(|s| ExportStep {
                description: &s.description,
                expected_result: &s.expected_result,
            })
            .collect();
        let steps_json = serde_json::to_string(&export_steps)
            .map_err(|e| AppError::FileSystem(format!("Failed to encode steps: {}", e)))?;

        writer
            .write_record([
                case.name.as_str(),
                case.description.as_str(),
                case.precondition.as_str(),
                case.postcondition.as_str(),
                case.status.as_str(),
                case.priority.as_str(),
                case.category.as_str(),
                case.tags.as_str(),
                steps_json.as_str(),
            ])
            .map_err(|e| AppError::FileSystem(format!("Failed to write CSV: {}", e)))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::FileSystem(format!("Failed to finish CSV: {}", e)))
}
