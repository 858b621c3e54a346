//! Flat CSV export: one row per company and fiscal year.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::models::{Metric, RatioDataset};
use crate::series::build_series;

const LEADING_COLUMNS: [&str; 4] = ["Ticker", "Company Name", "Years Collected", "Year"];

pub fn header() -> Vec<&'static str> {
    LEADING_COLUMNS
        .into_iter()
        .chain(Metric::ALL.iter().map(|m| m.label()))
        .collect()
}

/// Write every company's reports, years ascending. Stored values are written
/// as-is (ratios stay fractions); missing ones are left empty. Returns the
/// number of data rows.
pub fn write_csv<W: Write>(dataset: &RatioDataset, out: W) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(header())?;

    let mut rows = 0usize;
    for (code, record) in dataset.records() {
        let Some(company) = build_series(record) else {
            debug!("{}: no annual reports, nothing to export", code);
            continue;
        };
        let name = company.name.as_deref().unwrap_or_default();
        let years = company.total_years_collected.to_string();

        for point in company.series.points() {
            let mut row = vec![
                code.to_string(),
                name.to_string(),
                years.clone(),
                point.year.clone(),
            ];
            row.extend(
                Metric::ALL
                    .iter()
                    .map(|m| point.metric(*m).map(|v| v.to_string()).unwrap_or_default()),
            );
            writer.write_record(&row)?;
            rows += 1;
        }
    }

    writer.flush()?;
    Ok(rows)
}

pub fn export_to_path(dataset: &RatioDataset, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create dir {:?}", parent))?;
    }
    let file = std::fs::File::create(path).with_context(|| format!("create {:?}", path))?;
    let rows = write_csv(dataset, file).with_context(|| format!("write {:?}", path))?;
    info!("Exported {} rows to {:?}", rows, path);
    Ok(rows)
}
