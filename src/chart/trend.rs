use crate::models::Metric;
use crate::projector::{Domain, UnitMode, project_valid};
use crate::series::Series;

use super::{CategoryScale, ChartSpec, LegendEntry, TickFormat, ValueAxis};

/// Fixed pad (percentage points) above and below the observed range.
const DOMAIN_PAD: f64 = 5.0;
const DOT_RADIUS: f64 = 4.0;

/// Several percent-scaled ratios on one shared year axis, one line each.
pub fn trend_lines(title: &str, series: &Series, metrics: &[Metric]) -> ChartSpec {
    let mode = UnitMode::RatioAsPercent;
    let projected: Vec<_> = metrics
        .iter()
        .map(|m| project_valid(series, m.key(), mode))
        .collect();

    let domain = Domain::padded(
        projected.iter().flatten().map(|p| p.value),
        DOMAIN_PAD,
    );

    let mut spec = ChartSpec::new(
        title,
        series.years(),
        CategoryScale::Point { padding: 0.0 },
        ValueAxis::new(domain, TickFormat::Plain),
    );

    for (idx, (metric, points)) in metrics.iter().zip(projected).enumerate() {
        spec.push_line_series(
            idx,
            points
                .into_iter()
                .map(|p| (p.year, p.value, p.display))
                .collect(),
            DOT_RADIUS,
            Some(metric.key()),
        );
        spec.legend.push(LegendEntry {
            series: idx,
            name: metric.label().to_string(),
        });
    }

    spec
}
