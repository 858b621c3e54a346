use crate::models::Metric;
use crate::projector::{Domain, UnitMode, project_valid};
use crate::series::Series;
use crate::utils::fmt_grouped;

use super::{CategoryScale, ChartSpec, Label, LegendEntry, Mark, TickFormat, Tooltip, ValueAxis};

const HEADROOM: f64 = 1.1;
/// Stand-in maximum when no year has a positive value.
const FALLBACK_MAX: f64 = 1000.0;

/// Absolute magnitudes (EPS and the like) as plain bars, one per known year.
pub fn simple_bar(title: &str, series: &Series, metric: Metric, display_name: &str) -> ChartSpec {
    let points = project_valid(series, metric.key(), UnitMode::Absolute);
    let domain = Domain::zero_based(points.iter().map(|p| p.value), HEADROOM, FALLBACK_MAX);

    let mut spec = ChartSpec::new(
        title,
        points.iter().map(|p| p.year.clone()).collect(),
        CategoryScale::Band { padding: 0.4 },
        ValueAxis::new(domain, TickFormat::Si),
    );

    for p in points {
        let text = fmt_grouped(p.value);
        spec.marks.push(Mark::Bar {
            series: 0,
            category: p.year.clone(),
            base: 0.0,
            top: p.value,
        });
        spec.tooltips.push(Tooltip {
            series: 0,
            category: p.year.clone(),
            text: format!("{}: {}", p.year, text),
        });
        spec.labels.push(Label::above(0, &p.year, p.value, text));
    }

    spec.legend.push(LegendEntry {
        series: 0,
        name: display_name.to_string(),
    });
    spec
}
