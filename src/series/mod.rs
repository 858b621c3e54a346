//! Builds a chronologically ordered series out of one company's
//! `annual_reports` map.

use std::cmp::Ordering;

use tracing::debug;

use crate::models::{CompanyRecord, Metric, MetricsRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct YearPoint {
    pub year: String,
    pub metrics: MetricsRecord,
}

impl YearPoint {
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.metrics.metric(metric)
    }
}

/// Year points sorted ascending by year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    points: Vec<YearPoint>,
}

impl Series {
    pub fn from_points(mut points: Vec<YearPoint>) -> Self {
        points.sort_by(|a, b| compare_years(&a.year, &b.year));
        Self { points }
    }

    pub fn points(&self) -> &[YearPoint] {
        &self.points
    }

    pub fn years(&self) -> Vec<String> {
        self.points.iter().map(|p| p.year.clone()).collect()
    }

    pub fn latest(&self) -> Option<&YearPoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Numeric year order; labels that are not integers sort after all numeric
/// ones, lexically among themselves.
pub fn compare_years(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Everything the dashboard needs about one selected company.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanySeries {
    pub name: Option<String>,
    pub total_years_collected: u32,
    pub series: Series,
}

/// `None` when the record has no `annual_reports`: there is nothing to draw.
/// Years whose report is not a metrics object are skipped.
pub fn build_series(record: &CompanyRecord) -> Option<CompanySeries> {
    let reports = record.annual_reports.as_ref()?;

    let points: Vec<YearPoint> = reports
        .iter()
        .filter_map(|(year, report)| match report.metrics() {
            Some(metrics) => Some(YearPoint {
                year: year.clone(),
                metrics: metrics.clone(),
            }),
            None => {
                debug!("{}: report is not a metrics object, skipped", year);
                None
            }
        })
        .collect();

    Some(CompanySeries {
        name: record.company_name.clone(),
        total_years_collected: record.total_years_collected.unwrap_or(0),
        series: Series::from_points(points),
    })
}
