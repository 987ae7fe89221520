use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{Days, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{DashboardError, Result};
use crate::loader::DataContext;
use crate::models::{
    SaleRecord, CATEGORY_COL, DATE_COL, PRODUCT_COL, PROFIT_COL, QUANTITY_COL, REGION_COL,
    REQUIRED_COLUMNS, REVENUE_COL,
};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%d/%m/%Y %H:%M:%S"];

/// Loads the sales sheet at `path` into a [`DataContext`].
///
/// Reads `sheet` when given, otherwise the first worksheet. Fails with a load
/// error when the workbook cannot be opened, the header lacks any required
/// column, or a cell cannot be converted.
pub fn load_sales(path: impl AsRef<Path>, sheet: Option<&str>) -> Result<DataContext> {
    let path = path.as_ref();
    let path_str = path.display().to_string();

    let mut workbook = open_workbook_auto(path).map_err(|e| DashboardError::WorkbookOpen {
        path: path_str.clone(),
        message: e.to_string(),
    })?;

    let sheet_names = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|candidate| candidate.as_str() == name)
            .cloned()
            .ok_or_else(|| DashboardError::WorksheetNotFound {
                path: path_str.clone(),
                sheet: name.to_string(),
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| DashboardError::NoWorksheets(path_str.clone()))?,
    };

    info!("Reading worksheet '{}' from {}", sheet_name, path_str);

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| DashboardError::WorkbookOpen {
            path: path_str.clone(),
            message: e.to_string(),
        })?;

    let records = parse_sales_range(&range)?;
    info!("Parsed {} sales records from {}", records.len(), path_str);

    DataContext::from_records(&records)
}

/// Converts a worksheet range whose first row is the header into records.
pub fn parse_sales_range(range: &Range<Data>) -> Result<Vec<SaleRecord>> {
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let mut rows = range.rows();

    let header = match rows.next() {
        Some(header) => header,
        None => {
            return Err(DashboardError::MissingColumns(
                REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            ));
        }
    };

    let positions = header_positions(header)?;
    let mut records = Vec::new();
    let mut skipped = 0;

    for (offset, row) in rows.enumerate() {
        // 1-based sheet row, header included
        let row_number = first_row + offset + 2;

        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            skipped += 1;
            continue;
        }

        let cell = |column: &str| cell_at(row, &positions, column);

        records.push(SaleRecord {
            date: cell_to_date(cell(DATE_COL), row_number, DATE_COL)?,
            region: cell_to_text(cell(REGION_COL), row_number, REGION_COL)?,
            product: cell_to_text(cell(PRODUCT_COL), row_number, PRODUCT_COL)?,
            category: cell_to_text(cell(CATEGORY_COL), row_number, CATEGORY_COL)?,
            quantity: cell_to_number(cell(QUANTITY_COL), row_number, QUANTITY_COL)?,
            revenue: cell_to_number(cell(REVENUE_COL), row_number, REVENUE_COL)?,
            profit: cell_to_number(cell(PROFIT_COL), row_number, PROFIT_COL)?,
        });
    }

    if skipped > 0 {
        warn!("Skipped {} empty rows", skipped);
    }

    Ok(records)
}

fn header_positions(header: &[Data]) -> Result<HashMap<&'static str, usize>> {
    let mut positions = HashMap::new();

    for (idx, cell) in header.iter().enumerate() {
        if let Data::String(name) = cell {
            if let Some(required) = REQUIRED_COLUMNS.iter().find(|c| **c == name.as_str()) {
                positions.entry(*required).or_insert(idx);
            }
        }
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !positions.contains_key(*c))
        .map(|c| c.to_string())
        .collect();

    if missing.is_empty() {
        Ok(positions)
    } else {
        Err(DashboardError::MissingColumns(missing))
    }
}

static EMPTY_CELL: Data = Data::Empty;

fn cell_at<'a>(row: &'a [Data], positions: &HashMap<&'static str, usize>, column: &str) -> &'a Data {
    positions
        .get(column)
        .and_then(|&idx| row.get(idx))
        .unwrap_or(&EMPTY_CELL)
}

fn invalid(row: usize, column: &str, message: impl Into<String>) -> DashboardError {
    DashboardError::InvalidCell {
        row,
        column: column.to_string(),
        message: message.into(),
    }
}

fn cell_to_text(cell: &Data, row: usize, column: &str) -> Result<String> {
    let text = match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{:.0}", f),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Empty => return Err(invalid(row, column, "empty value")),
        other => return Err(invalid(row, column, format!("unexpected value {:?}", other))),
    };

    if text.is_empty() {
        return Err(invalid(row, column, "empty value"));
    }

    Ok(text)
}

// Blank numeric cells count as zero, matching how sums skip missing values.
fn cell_to_number(cell: &Data, row: usize, column: &str) -> Result<f64> {
    match cell {
        Data::Float(f) => Ok(*f),
        Data::Int(i) => Ok(*i as f64),
        Data::Empty => Ok(0.0),
        Data::String(s) if s.trim().is_empty() => Ok(0.0),
        Data::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid(row, column, format!("'{}' is not a number", s))),
        other => Err(invalid(row, column, format!("unexpected value {:?}", other))),
    }
}

fn cell_to_date(cell: &Data, row: usize, column: &str) -> Result<NaiveDate> {
    let parsed = match cell {
        Data::DateTime(dt) => serial_to_date(dt.as_f64()),
        Data::Float(f) => serial_to_date(*f),
        Data::Int(i) => serial_to_date(*i as f64),
        Data::DateTimeIso(s) | Data::String(s) => parse_date_text(s),
        Data::Empty => return Err(invalid(row, column, "empty date")),
        _ => None,
    };

    parsed.ok_or_else(|| invalid(row, column, format!("cannot parse date from {:?}", cell)))
}

/// Spreadsheet serial day numbers count from 1899-12-30.
pub(crate) fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.floor() as u64))
}

pub(crate) fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}
