use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use fund_model_core::report::FundModelReport;

/// Write one CSV per output sheet into `dir`, returning the paths written.
pub fn write_sheets(
    dir: &Path,
    report: &FundModelReport,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create '{}': {}", dir.display(), e))?;

    Ok(vec![
        write_sheet(dir, "fund_overview", std::slice::from_ref(&report.fund_overview))?,
        write_sheet(dir, "portfolio_returns", &report.portfolio_returns.rows)?,
        write_sheet(dir, "cash_flows", &report.cash_flows.rows)?,
        write_sheet(dir, "lp_returns", std::slice::from_ref(&report.lp_returns))?,
        write_sheet(dir, "sensitivity", &report.sensitivity_analysis.rows)?,
    ])
}

fn write_sheet<T: Serialize>(
    dir: &Path,
    name: &str,
    rows: &[T],
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = dir.join(format!("{name}.csv"));
    let mut wtr = csv::Writer::from_path(&path)
        .map_err(|e| format!("Failed to open '{}': {}", path.display(), e))?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    tracing::debug!(sheet = name, rows = rows.len(), "sheet written");
    Ok(path)
}
