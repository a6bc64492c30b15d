//! Asset-history CSV ingest.
//!
//! Turns a CSV of asset service records into a `LifetimeSample`:
//!
//! ```text
//! asset_identifier,in_service_date,retirement_date
//! TX-001,2001-04-12,2019-08-30
//! TX-002,2005-01-01,
//! ```
//!
//! - lifetime = (retirement - in service) in days / 365.25, in years
//! - a blank retirement date means the asset is still in service; the row is
//!   skipped (this ingest has no censoring model)
//! - unparsable dates and non-positive lifetimes are skipped with a row error
//!
//! Header names are matched case-insensitively, with a UTF-8 BOM tolerated.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{LifetimeSample, SampleSummary};
use crate::error::AppError;

pub const DAYS_PER_YEAR: f64 = 365.25;

const REQUIRED_COLUMNS: [&str; 3] = ["asset_identifier", "in_service_date", "retirement_date"];

/// One asset with a completed service life.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetLifetime {
    pub asset_identifier: String,
    pub in_service_date: NaiveDate,
    pub retirement_date: NaiveDate,
    /// Years in service.
    pub lifetime: f64,
}

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// Ingest output: usable lifetimes + row diagnostics.
#[derive(Debug, Clone)]
pub struct IngestedAssets {
    pub assets: Vec<AssetLifetime>,
    pub row_errors: Vec<RowError>,
    /// Rows with no retirement date.
    pub in_service: usize,
    pub rows_read: usize,
}

impl IngestedAssets {
    pub fn sample(&self) -> LifetimeSample {
        LifetimeSample::new(self.assets.iter().map(|a| a.lifetime).collect())
    }

    pub fn summary(&self) -> Option<SampleSummary> {
        self.sample().summary()
    }
}

/// Load an asset CSV from disk.
pub fn load_asset_lifetimes(path: &Path) -> Result<IngestedAssets, AppError> {
    let mut file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let mut text = String::new();
    file.read_to_string(&mut text)
        .map_err(|e| AppError::new(2, format!("Failed to read CSV '{}': {e}", path.display())))?;
    parse_asset_csv(&text)
}

/// Parse asset CSV text.
pub fn parse_asset_csv(text: &str) -> Result<IngestedAssets, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !header_map.contains_key(*c))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::new(
            2,
            format!(
                "CSV must contain columns: asset_identifier, in_service_date, and retirement_date (missing: {}).",
                missing.join(", ")
            ),
        ));
    }

    let mut assets = Vec::new();
    let mut row_errors = Vec::new();
    let mut in_service = 0usize;
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(RowOutcome::Retired(asset)) => assets.push(asset),
            Ok(RowOutcome::InService) => in_service += 1,
            Err((id, message)) => row_errors.push(RowError { line, id, message }),
        }
    }

    for err in &row_errors {
        warn!(line = err.line, id = ?err.id, "skipping row: {}", err.message);
    }
    debug!(rows_read, used = assets.len(), in_service, skipped = row_errors.len(), "asset csv ingested");

    if assets.is_empty() {
        return Err(AppError::new(
            3,
            "No valid lifetime data found. Ensure retirement dates are after in-service dates.",
        ));
    }

    Ok(IngestedAssets {
        assets,
        row_errors,
        in_service,
        rows_read,
    })
}

enum RowOutcome {
    Retired(AssetLifetime),
    InService,
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<RowOutcome, (Option<String>, String)> {
    let id = get_field(record, header_map, "asset_identifier").map(str::to_string);

    let start_raw = get_field(record, header_map, "in_service_date")
        .ok_or_else(|| (id.clone(), "Missing `in_service_date`.".to_string()))?;
    let in_service_date = parse_date(start_raw).map_err(|e| (id.clone(), e))?;

    let Some(end_raw) = get_field(record, header_map, "retirement_date") else {
        return Ok(RowOutcome::InService);
    };
    let retirement_date = parse_date(end_raw).map_err(|e| (id.clone(), e))?;

    let days = (retirement_date - in_service_date).num_days();
    let lifetime = days as f64 / DAYS_PER_YEAR;
    if lifetime <= 0.0 {
        return Err((
            id,
            format!("Retirement date {retirement_date} is not after in-service date {in_service_date}."),
        ));
    }

    Ok(RowOutcome::Retired(AssetLifetime {
        asset_identifier: id.unwrap_or_default(),
        in_service_date,
        retirement_date,
        lifetime,
    }))
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

/// Non-empty trimmed field, `None` when absent or blank.
fn get_field<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = *header_map.get(name)?;
    let v = record.get(idx)?.trim();
    if v.is_empty() { None } else { Some(v) }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, DD/MM/YYYY, DD-MM-YYYY."
    ))
}
