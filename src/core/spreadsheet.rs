//! Spreadsheet row normalizer
//!
//! Uploaded tables arrive as base64 text. Workbooks (`.xlsx`) are read with
//! calamine, anything else is treated as UTF-8 CSV. Only the first sheet is
//! used and its first row is the header.

use crate::core::models::{Customer, CustomerType, DEFAULT_LICENSE, DEFAULT_REGION, DEFAULT_SIZE};
use crate::core::trace::CalculationTrace;
use crate::utils::business::parse_digits;
use crate::utils::error::{EstimatorError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use calamine::{Data, Reader, Xlsx};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::io::Cursor;
use tracing::{debug, warn};

const ZIP_MAGIC: &[u8] = b"PK";

/// A loosely typed cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl CellValue {
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    /// Text rendering (`1234.0` -> `"1234"`)
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    /// Empty text, zero and `false` count as blank
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Number(n) => *n == 0.0 || n.is_nan(),
            Self::Bool(b) => !b,
            Self::Text(s) => s.is_empty(),
        }
    }

    /// Infer a CSV field's type
    fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            if let Ok(n) = trimmed.parse::<f64>() {
                if n.is_finite() {
                    return Self::Number(n);
                }
            }
        }
        Self::Text(raw.to_string())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// One data row keyed by header, in header order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row {
    cells: Vec<(String, CellValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    /// Cell text, empty when the column is absent
    pub fn text(&self, column: &str) -> String {
        self.get(column).map(CellValue::as_text).unwrap_or_default()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_named(column).is_some()
    }

    /// Header matching `column`, exactly or else ignoring case and
    /// surrounding whitespace
    pub fn column_named(&self, column: &str) -> Option<&str> {
        let wanted = column.trim();
        self.columns()
            .find(|c| *c == wanted)
            .or_else(|| self.columns().find(|c| c.trim().eq_ignore_ascii_case(wanted)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(c, v)| (c.as_str(), v))
    }
}

/// Decode a base64 payload, tolerating a `data:...;base64,` prefix
pub fn decode_payload(payload: &str) -> Result<Vec<u8>> {
    let trimmed = payload.trim();
    let encoded = if trimmed.starts_with("data:") {
        trimmed
            .split_once("base64,")
            .map(|(_, rest)| rest)
            .ok_or_else(|| EstimatorError::parsing("Data URL is not base64 encoded"))?
    } else {
        trimmed
    };
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| EstimatorError::parsing(format!("Invalid base64 spreadsheet payload: {}", e)))
}

/// Parse the first sheet of an uploaded table into rows
pub fn parse_rows(payload: &str) -> Result<Vec<Row>> {
    let bytes = decode_payload(payload)?;
    let rows = if bytes.starts_with(ZIP_MAGIC) {
        parse_xlsx(bytes)?
    } else {
        parse_csv(&bytes)?
    };

    if let Some(first) = rows.first() {
        debug!(
            rows = rows.len(),
            columns = ?first.columns().collect::<Vec<_>>(),
            "Parsed spreadsheet"
        );
    }
    Ok(rows)
}

fn parse_xlsx(bytes: Vec<u8>) -> Result<Vec<Row>> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| EstimatorError::parsing(format!("Failed to open workbook: {}", e)))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| EstimatorError::parsing("Workbook contains no sheets"))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| EstimatorError::parsing(format!("Failed to read sheet '{}': {}", sheet, e)))?;

    let mut lines = range.rows();
    let Some(header) = lines.next() else {
        return Ok(Vec::new());
    };
    let header: Vec<String> = header.iter().map(|cell| cell_value(cell).as_text()).collect();

    Ok(lines
        .map(|line| {
            let mut row = Row::new();
            for (i, column) in header.iter().enumerate() {
                if column.is_empty() {
                    continue;
                }
                let value = line.get(i).map(cell_value).unwrap_or_else(CellValue::empty);
                row.insert(column.clone(), value);
            }
            row
        })
        .collect())
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Text(excel_serial_to_date(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::empty(),
    }
}

/// Render an Excel serial day number as `M/D/YYYY`
fn excel_serial_to_date(serial: f64) -> String {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|epoch| epoch.checked_add_signed(Duration::days(serial.floor() as i64)))
        .map(|date| date.format("%-m/%-d/%Y").to_string())
        .unwrap_or_else(|| serial.to_string())
}

fn parse_csv(bytes: &[u8]) -> Result<Vec<Row>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| EstimatorError::parsing(format!("Spreadsheet is neither xlsx nor UTF-8 text: {}", e)))?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.trim_start_matches('\u{feff}').as_bytes());

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| EstimatorError::parsing(format!("Failed to read CSV header: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| EstimatorError::parsing(format!("Failed to read CSV row: {}", e)))?;
        let mut row = Row::new();
        for (i, column) in header.iter().enumerate() {
            if column.is_empty() {
                continue;
            }
            let value = record.get(i).map(CellValue::infer).unwrap_or_else(CellValue::empty);
            row.insert(column.clone(), value);
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Lower-case a header and drop spaces and underscores (`Customer Name` -> `customername`)
fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// First non-blank value among synonymous normalized columns
fn first_present<'a>(row: &'a [(String, &'a CellValue)], keys: &[&str]) -> Option<&'a CellValue> {
    keys.iter().find_map(|key| {
        row.iter()
            .find(|(k, v)| k == key && !v.is_blank())
            .map(|(_, v)| *v)
    })
}

/// Parse the uploaded customer list. A malformed payload yields an empty list
/// and a trace entry rather than an error.
pub fn parse_customer_list(payload: &str, trace: &mut CalculationTrace) -> Vec<Customer> {
    trace.push("Step 0: Parsing customer list data");
    match parse_rows(payload) {
        Ok(rows) => customers_from_rows(&rows, trace),
        Err(e) => {
            warn!("Failed to parse customer list: {}", e);
            trace.push(format!(
                "  - Error parsing customer list: {}. Proceeding with empty customer list.",
                e
            ));
            Vec::new()
        }
    }
}

/// Build customers from customer-list rows, applying column synonyms and defaults
pub fn customers_from_rows(rows: &[Row], trace: &mut CalculationTrace) -> Vec<Customer> {
    trace.push(format!("  - Found {} rows in customer list.", rows.len()));
    if let Some(first) = rows.first() {
        trace.push(format!(
            "  - Columns in customer list: {}",
            first.columns().collect::<Vec<_>>().join(", ")
        ));
    }

    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let normalized: Vec<(String, &CellValue)> =
                row.iter().map(|(k, v)| (normalize_key(k), v)).collect();

            let name = first_present(&normalized, &["name", "customername"])
                .map(CellValue::as_text)
                .unwrap_or_else(|| format!("Customer {}", index + 1));
            let region = first_present(&normalized, &["region", "awsregion"])
                .map(CellValue::as_text)
                .unwrap_or_else(|| DEFAULT_REGION.to_string());

            let mut licenses: Vec<String> = match first_present(&normalized, &["licenses", "licensetypes"]) {
                Some(CellValue::Text(raw)) => raw
                    .split(',')
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect(),
                _ => Vec::new(),
            };
            if licenses.is_empty() {
                licenses.push(DEFAULT_LICENSE.to_string());
                trace.push(format!(
                    "  - Warning: Customer '{}' has no licenses specified, defaulting to '{}'.",
                    name, DEFAULT_LICENSE
                ));
            }

            let customer_type = first_present(&normalized, &["type", "customertype"])
                .map(|v| CustomerType::from(v.as_text().as_str()))
                .unwrap_or_default();

            let beds = first_present(&normalized, &["beds", "numberofbeds"])
                .and_then(|v| parse_digits(&v.as_text()))
                .unwrap_or(0);

            let product_count = match first_present(&normalized, &["productcount", "numberofproducts"])
                .and_then(|v| parse_digits(&v.as_text()))
            {
                Some(count) => count,
                None if customer_type == CustomerType::ReferenceLab => {
                    let fallback = licenses.len() as u32 * 5;
                    trace.push(format!(
                        "  - Warning: Product count for Reference Lab '{}' not found or invalid, defaulting to {}.",
                        name, fallback
                    ));
                    fallback
                }
                None => 0,
            };

            let size = first_present(&normalized, &["size", "customersize"])
                .map(CellValue::as_text)
                .unwrap_or_else(|| DEFAULT_SIZE.to_string());

            Customer {
                name,
                region,
                licenses,
                customer_type,
                beds,
                product_count,
                size,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(text: &str) -> String {
        STANDARD.encode(text.as_bytes())
    }

    #[test]
    fn test_decode_strips_data_url_prefix() {
        let payload = format!("data:text/csv;base64,{}", encode("a,b\n1,2\n"));
        assert_eq!(decode_payload(&payload).unwrap(), b"a,b\n1,2\n");
    }

    #[test]
    fn test_invalid_base64_is_parsing_error() {
        let result = parse_rows("%%% not base64 %%%");
        assert!(matches!(result, Err(EstimatorError::Parsing(_))));
    }

    #[test]
    fn test_csv_rows_keep_header_order_and_types() {
        let rows = parse_rows(&encode("Region,1/1/2024,Note\nUS East (Ohio),1200.5,\n")).unwrap();
        assert_eq!(rows.len(), 1);
        let columns: Vec<_> = rows[0].columns().collect();
        assert_eq!(columns, ["Region", "1/1/2024", "Note"]);
        assert_eq!(rows[0].get("1/1/2024"), Some(&CellValue::Number(1200.5)));
        assert_eq!(rows[0].get("Note"), Some(&CellValue::empty()));
    }

    #[test]
    fn test_short_csv_rows_are_padded() {
        let rows = parse_rows(&encode("Product,Cost,AWS\nPCR Machine,100\n")).unwrap();
        assert_eq!(rows[0].text("AWS"), "");
        assert_eq!(rows[0].text("Cost"), "100");
    }

    #[test]
    fn test_column_named_prefers_exact_then_ignores_case() {
        let rows = parse_rows(&encode("product name,Cost,cost\nDNA Sequencer,100,7\n")).unwrap();
        assert_eq!(rows[0].column_named("Product Name"), Some("product name"));
        assert_eq!(rows[0].column_named("cost"), Some("cost"));
        assert_eq!(rows[0].column_named("COST"), Some("Cost"));
        assert!(rows[0].has_column(" PRODUCT NAME "));
        assert_eq!(rows[0].column_named("AWS"), None);
    }

    #[test]
    fn test_header_only_yields_no_rows() {
        let rows = parse_rows(&encode("Product,Cost\n")).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_cell_blankness() {
        assert!(CellValue::empty().is_blank());
        assert!(CellValue::Number(0.0).is_blank());
        assert!(!CellValue::Number(3.0).is_blank());
        assert!(!CellValue::from("x").is_blank());
    }

    #[test]
    fn test_excel_serial_dates() {
        assert_eq!(excel_serial_to_date(45292.0), "1/1/2024");
        assert_eq!(excel_serial_to_date(45657.5), "12/31/2024");
    }

    #[test]
    fn test_customer_synonyms_and_defaults() {
        let rows = vec![
            Row::new()
                .with("Customer Name", "North Clinic")
                .with("AWS_Region", "US East (Ohio)")
                .with("License Types", "Core Lab, Pathology Lab")
                .with("Customer Type", "Hospital")
                .with("Number of Beds", "250 beds"),
            Row::new().with("Name", "").with("Type", "Reference Lab"),
        ];
        let mut trace = CalculationTrace::new();
        let customers = customers_from_rows(&rows, &mut trace);

        assert_eq!(customers[0].name, "North Clinic");
        assert_eq!(customers[0].region, "US East (Ohio)");
        assert_eq!(customers[0].licenses, ["Core Lab", "Pathology Lab"]);
        assert_eq!(customers[0].customer_type, CustomerType::Hospital);
        assert_eq!(customers[0].beds, 250);
        assert_eq!(customers[0].size, "Medium");

        assert_eq!(customers[1].name, "Customer 2");
        assert_eq!(customers[1].region, DEFAULT_REGION);
        assert_eq!(customers[1].licenses, [DEFAULT_LICENSE]);
        assert_eq!(customers[1].product_count, 5);
        assert!(trace.mentions("has no licenses specified"));
        assert!(trace.mentions("Product count for Reference Lab 'Customer 2'"));
    }

    #[test]
    fn test_bad_customer_list_is_traced_not_fatal() {
        let mut trace = CalculationTrace::new();
        let customers = parse_customer_list("***", &mut trace);
        assert!(customers.is_empty());
        assert!(trace.mentions("Proceeding with empty customer list"));
    }
}
