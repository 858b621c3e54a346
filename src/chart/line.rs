use crate::models::Metric;
use crate::projector::{Domain, UnitMode, project_valid};
use crate::series::Series;

use super::{CategoryScale, ChartSpec, LegendEntry, TickFormat, ValueAxis};

const HEADROOM: f64 = 1.2;
const DOT_RADIUS: f64 = 6.0;

/// One metric as dots joined by a thin line. Every year gets an axis tick so
/// missing years show up as gaps.
pub fn single_line(
    title: &str,
    series: &Series,
    metric: Metric,
    mode: UnitMode,
    display_name: &str,
) -> ChartSpec {
    let points = project_valid(series, metric.key(), mode);
    let domain = Domain::zero_based(points.iter().map(|p| p.value), HEADROOM, 1.0);

    let mut spec = ChartSpec::new(
        title,
        series.years(),
        CategoryScale::Point { padding: 0.5 },
        ValueAxis::new(domain, TickFormat::Plain),
    );
    spec.push_line_series(
        0,
        points
            .into_iter()
            .map(|p| (p.year, p.value, p.display))
            .collect(),
        DOT_RADIUS,
        None,
    );
    spec.legend.push(LegendEntry {
        series: 0,
        name: display_name.to_string(),
    });
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RatioDataset;
    use crate::series::build_series;

    fn series(body: &str) -> Series {
        let ds = RatioDataset::from_json(body).unwrap();
        build_series(ds.company("X").unwrap()).unwrap().series
    }

    #[test]
    fn test_gaps_keep_their_axis_tick() {
        let s = series(
            r#"{"X": {"annual_reports": {
                "2019": {"TySuatThanhToanHienHanh": 1.5},
                "2020": {"TySuatThanhToanHienHanh": null},
                "2021": {"TySuatThanhToanHienHanh": 2.0}
            }}}"#,
        );
        let spec = single_line("Liquidity", &s, Metric::CurrentRatio, UnitMode::Absolute, "Current ratio");
        assert_eq!(spec.categories, vec!["2019", "2020", "2021"]);
        let years: Vec<String> = spec.line_points(0).into_iter().map(|(y, _)| y).collect();
        assert_eq!(years, vec!["2019", "2021"]);
        assert!((spec.domain().max - 2.4).abs() < 1e-9);
        assert_eq!(spec.domain().min, 0.0);
        let texts: Vec<&str> = spec.labels_for(0).iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["1.50", "2.00"]);
        assert_eq!(spec.legend[0].name, "Current ratio");
    }

    #[test]
    fn test_percent_mode() {
        let s = series(r#"{"X": {"annual_reports": {"2021": {"TyLeNoDaiHan": 0.25}}}}"#);
        let spec = single_line(
            "Long-term debt",
            &s,
            Metric::LongTermDebtRatio,
            UnitMode::RatioAsPercent,
            "Long-term debt ratio",
        );
        assert!((spec.domain().max - 30.0).abs() < 1e-9);
        assert_eq!(spec.labels[0].text, "25.00%");
    }

    #[test]
    fn test_all_null_falls_back_to_unit_domain() {
        let s = series(r#"{"X": {"annual_reports": {"2021": {"PE": null}, "2022": {"PE": 0}}}}"#);
        let spec = single_line("P/E", &s, Metric::Pe, UnitMode::Absolute, "P/E");
        assert!((spec.domain().max - 1.2).abs() < 1e-9);
        assert_eq!(spec.line_points(0).len(), 1);
    }
}
