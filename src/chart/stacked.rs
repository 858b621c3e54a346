use crate::models::Metric;
use crate::projector::Domain;
use crate::series::Series;

use super::{CategoryScale, ChartSpec, Label, LegendEntry, Mark, TickFormat, Tooltip, ValueAxis};

/// Segments at or below this share (percentage points) get no inline label.
const LABEL_THRESHOLD: f64 = 5.0;

/// 100% stacked bar splitting each year into `ratio` and `1 - ratio`.
/// Series 0 is the ratio part, series 1 the remainder stacked on top.
/// Years without a ratio are left off the axis entirely.
pub fn stacked_composition(
    title: &str,
    series: &Series,
    ratio: Metric,
    parts: [&str; 2],
) -> ChartSpec {
    let rows: Vec<(String, f64, f64)> = series
        .points()
        .iter()
        .filter_map(|p| {
            let r = p.metric(ratio)?;
            Some((p.year.clone(), r * 100.0, (1.0 - r) * 100.0))
        })
        .collect();

    let mut spec = ChartSpec::new(
        title,
        rows.iter().map(|(year, _, _)| year.clone()).collect(),
        CategoryScale::Band { padding: 0.2 },
        ValueAxis::new(Domain::new(0.0, 100.0), TickFormat::Plain),
    );

    for (year, lower, upper) in &rows {
        let segments = [(0.0, *lower), (*lower, lower + upper)];
        for (idx, (base, top)) in segments.into_iter().enumerate() {
            let value = top - base;
            let text = format!("{:.1}%", value);
            spec.marks.push(Mark::Bar {
                series: idx,
                category: year.clone(),
                base,
                top,
            });
            spec.tooltips.push(Tooltip {
                series: idx,
                category: year.clone(),
                text: text.clone(),
            });
            if value > LABEL_THRESHOLD {
                spec.labels.push(Label::middle(idx, year, base, top, text));
            }
        }
    }

    spec.legend = parts
        .iter()
        .enumerate()
        .map(|(series, name)| LegendEntry {
            series,
            name: name.to_string(),
        })
        .collect();
    spec
}
