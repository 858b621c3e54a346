//! Metric projection: turns stored ratio values into plotted values and
//! display strings, and derives value-axis domains from them.

use crate::models::Metric;
use crate::series::{Series, YearPoint};
use crate::utils::{fmt_fixed2, fmt_grouped};

/// Above this magnitude absolute values are shown as grouped integers.
const GROUPING_THRESHOLD: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitMode {
    /// Stored as a fraction, shown ×100 with a `%` suffix.
    RatioAsPercent,
    /// Shown as stored.
    Absolute,
}

impl UnitMode {
    /// Value in plot space.
    pub fn scale(self, raw: f64) -> f64 {
        match self {
            UnitMode::RatioAsPercent => raw * 100.0,
            UnitMode::Absolute => raw,
        }
    }

    /// Display string for a raw stored value.
    pub fn format(self, raw: f64) -> String {
        match self {
            UnitMode::RatioAsPercent => format!("{}%", fmt_fixed2(raw * 100.0)),
            UnitMode::Absolute if raw.abs() > GROUPING_THRESHOLD => fmt_grouped(raw),
            UnitMode::Absolute => fmt_fixed2(raw),
        }
    }
}

impl Metric {
    pub fn unit(self) -> UnitMode {
        match self {
            Metric::Roa
            | Metric::Roe
            | Metric::DebtToAssets
            | Metric::AssetGrowth
            | Metric::ProfitGrowth
            | Metric::LongTermDebtRatio => UnitMode::RatioAsPercent,
            Metric::CurrentRatio
            | Metric::Eps
            | Metric::Pe
            | Metric::Pb
            | Metric::Beta
            | Metric::YearEndClose => UnitMode::Absolute,
        }
    }
}

/// A single projected value.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub year: String,
    /// Value in plot space (percent-scaled for ratio metrics).
    pub value: f64,
    pub display: String,
}

/// Project one point; `None` when the metric is null for that year.
pub fn project(point: &YearPoint, key: &str, mode: UnitMode) -> Option<Projection> {
    let raw = point.metrics.get(key)?;
    Some(Projection {
        year: point.year.clone(),
        value: mode.scale(raw),
        display: mode.format(raw),
    })
}

/// All non-null points of a metric, in series order.
pub fn project_valid(series: &Series, key: &str, mode: UnitMode) -> Vec<Projection> {
    series
        .points()
        .iter()
        .filter_map(|p| project(p, key, mode))
        .collect()
}

/// Latest point of the series for a KPI card. A null latest value is shown
/// (and drawn) as zero; `None` only when the series is empty.
pub fn project_latest(series: &Series, key: &str, mode: UnitMode) -> Option<Projection> {
    let latest = series.latest()?;
    let raw = latest.metrics.get(key).unwrap_or(0.0);
    Some(Projection {
        year: latest.year.clone(),
        value: mode.scale(raw),
        display: mode.format(raw),
    })
}

// ── Domains ───────────────────────────────────────────────────────────────────

/// Closed numeric interval of the value axis. Never zero-width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    /// Build a domain, widening a degenerate (empty or inverted) range to a
    /// unit span above `min`.
    pub fn new(min: f64, max: f64) -> Self {
        let min = if min.is_finite() { min } else { 0.0 };
        let max = if max.is_finite() && max > min { max } else { min + 1.0 };
        Self { min, max }
    }

    /// `[min - pad, max + pad]` over the given values; `[-pad, pad]` when empty.
    pub fn padded(values: impl IntoIterator<Item = f64>, pad: f64) -> Self {
        match min_max(values) {
            Some((lo, hi)) => Self::new(lo - pad, hi + pad),
            None => Self::new(-pad, pad),
        }
    }

    /// `[0, max × headroom]`. When there is no positive maximum, `fallback`
    /// stands in for it.
    pub fn zero_based(values: impl IntoIterator<Item = f64>, headroom: f64, fallback: f64) -> Self {
        let top = match min_max(values) {
            Some((_, hi)) if hi > 0.0 => hi,
            _ => fallback,
        };
        Self::new(0.0, top * headroom)
    }

    /// `[min(0, lo), hi]`, for metrics that can go negative.
    pub fn with_zero_floor(values: impl IntoIterator<Item = f64>) -> Self {
        match min_max(values) {
            Some((lo, hi)) => Self::new(lo.min(0.0), hi),
            None => Self::new(0.0, 1.0),
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

fn min_max(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
