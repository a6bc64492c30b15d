//! Export sampled curves to CSV.
//!
//! The table goes to the requested path with a `Time` column followed by the
//! requested curve columns. The originating parameters are not table columns;
//! they are written to a `<stem>_parameters.csv` sidecar next to it.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::{ExportTable, WeibullParameters};
use crate::error::AppError;

/// Write the table and its parameters sidecar. Returns the sidecar path.
pub fn write_export_csv(path: &Path, table: &ExportTable) -> Result<PathBuf, AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_table(file, table)?;

    let sidecar = parameters_path(path);
    let file = File::create(&sidecar).map_err(|e| {
        AppError::new(2, format!("Failed to create parameters CSV '{}': {e}", sidecar.display()))
    })?;
    write_parameters(file, table.parameters)?;

    info!(rows = table.rows.len(), path = %path.display(), "wrote export table");
    Ok(sidecar)
}

/// `curve.csv` -> `curve_parameters.csv`, in the same directory.
pub fn parameters_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "weibull_curve".to_string());
    path.with_file_name(format!("{stem}_parameters.csv"))
}

/// Serialize the table rows.
pub fn write_table<W: Write>(out: W, table: &ExportTable) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec!["Time"];
    header.extend(table.columns.iter().map(|c| c.column_name()));
    writer
        .write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(header.len());
        record.push(row.time.to_string());
        for &c in &table.columns {
            record.push(row.value(c).map(|v| v.to_string()).unwrap_or_default());
        }
        writer
            .write_record(&record)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))
}

/// Serialize the `Parameter,Value` sidecar.
pub fn write_parameters<W: Write>(out: W, params: WeibullParameters) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    let rows = [
        ["Parameter".to_string(), "Value".to_string()],
        ["Shape (k)".to_string(), params.shape.to_string()],
        ["Scale (λ)".to_string(), params.scale.to_string()],
    ];
    for row in &rows {
        writer
            .write_record(row)
            .map_err(|e| AppError::new(2, format!("Failed to write parameters CSV: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush parameters CSV: {e}")))
}
