//! # Curve Comparison Export
//!
//! Aligns a measured curve with its theoretical reference for charting, and
//! writes the I-V comparison as CSV.

use chrono::NaiveDate;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::{Curve, TheoreticalCurve};
use crate::domain::power::power_curve;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One chart point: a measured sample and the reference value mapped onto it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub voltage: f64,
    pub measured: f64,
    pub theoretical: f64,
}

/// Map reference samples onto the measured voltage grid.
///
/// Each reference sample lands on the first measured row whose voltage is at
/// least its own; later samples overwrite earlier ones on the same row. Rows
/// no reference sample reaches keep a theoretical value of 0.
pub fn align_to_measured(
    measured_voltage: &[f64],
    measured_values: &[f64],
    reference_voltage: &[f64],
    reference_values: &[f64],
) -> Vec<ComparisonRow> {
    let mut rows: Vec<ComparisonRow> = measured_voltage
        .iter()
        .enumerate()
        .map(|(i, &voltage)| ComparisonRow {
            voltage,
            measured: measured_values.get(i).copied().unwrap_or(0.0),
            theoretical: 0.0,
        })
        .collect();

    for (&v, &value) in reference_voltage.iter().zip(reference_values) {
        if let Some(row) = rows.iter_mut().find(|row| row.voltage >= v) {
            row.theoretical = value;
        }
    }

    rows
}

/// Measured vs theoretical current on the measured voltage grid
pub fn iv_comparison(measured: &Curve, theoretical: &TheoreticalCurve) -> Vec<ComparisonRow> {
    align_to_measured(
        measured.voltage(),
        measured.current(),
        theoretical.curve.voltage(),
        theoretical.curve.current(),
    )
}

/// Measured vs theoretical power on the measured voltage grid
pub fn pv_comparison(measured: &Curve, theoretical: &TheoreticalCurve) -> Vec<ComparisonRow> {
    let measured_power = power_curve(measured.voltage(), measured.current());
    align_to_measured(
        measured.voltage(),
        &measured_power,
        theoretical.curve.voltage(),
        &theoretical.power,
    )
}

pub fn write_iv_csv<W: Write>(writer: W, rows: &[ComparisonRow]) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["Voltage", "Measured Current", "Theoretical Current"])?;
    for row in rows {
        csv.write_record([
            row.voltage.to_string(),
            row.measured.to_string(),
            row.theoretical.to_string(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("iv-curve-data-{}.csv", date.format("%Y-%m-%d"))
}

/// Write the comparison into `directory`, creating it if needed
pub fn write_iv_csv_file(
    directory: &Path,
    date: NaiveDate,
    rows: &[ComparisonRow],
) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(directory)?;
    let path = directory.join(export_file_name(date));
    write_iv_csv(File::create(&path)?, rows)?;
    Ok(path)
}
