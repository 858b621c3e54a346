use crate::models::Metric;
use crate::projector::{Domain, UnitMode};
use crate::series::Series;

use super::{CategoryScale, ChartSpec, LegendEntry, Mark, TickFormat, ValueAxis};

const DOT_RADIUS: f64 = 4.0;

/// Two growth rates drawn against a dashed zero line. A year is plotted only
/// when both rates are known for it.
pub fn growth_with_baseline(title: &str, series: &Series, metrics: [Metric; 2]) -> ChartSpec {
    let mode = UnitMode::RatioAsPercent;
    let paired: Vec<(&str, [f64; 2])> = series
        .points()
        .iter()
        .filter_map(|p| {
            let a = p.metric(metrics[0])?;
            let b = p.metric(metrics[1])?;
            Some((p.year.as_str(), [a, b]))
        })
        .collect();

    let domain = Domain::with_zero_floor(
        paired
            .iter()
            .flat_map(|(_, raw)| raw.iter().map(|v| mode.scale(*v))),
    );

    let mut spec = ChartSpec::new(
        title,
        series.years(),
        CategoryScale::Point { padding: 0.0 },
        ValueAxis::new(domain, TickFormat::Plain),
    );
    spec.marks.push(Mark::Rule {
        value: 0.0,
        dashed: true,
    });

    for (idx, metric) in metrics.iter().enumerate() {
        let points = paired
            .iter()
            .map(|(year, raw)| (year.to_string(), mode.scale(raw[idx]), mode.format(raw[idx])))
            .collect();
        spec.push_line_series(idx, points, DOT_RADIUS, Some(metric.key()));
        spec.legend.push(LegendEntry {
            series: idx,
            name: metric.label().to_string(),
        });
    }

    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RatioDataset;
    use crate::series::build_series;

    const KEYS: [Metric; 2] = [Metric::ProfitGrowth, Metric::AssetGrowth];

    fn spec_for(body: &str) -> ChartSpec {
        let ds = RatioDataset::from_json(body).unwrap();
        let s = build_series(ds.company("X").unwrap()).unwrap().series;
        growth_with_baseline("Growth", &s, KEYS)
    }

    #[test]
    fn test_paired_availability() {
        let spec = spec_for(
            r#"{"X": {"annual_reports": {
                "2019": {"TangTruongLoiNhuan": 0.10, "TangTruongTaiSan": 0.05},
                "2020": {"TangTruongLoiNhuan": null, "TangTruongTaiSan": 0.07},
                "2021": {"TangTruongLoiNhuan": -0.20, "TangTruongTaiSan": 0.02},
                "2022": {"TangTruongLoiNhuan": 0.15}
            }}}"#,
        );
        assert_eq!(spec.categories, vec!["2019", "2020", "2021", "2022"]);
        for series in 0..2 {
            let years: Vec<String> = spec.line_points(series).into_iter().map(|(y, _)| y).collect();
            assert_eq!(years, vec!["2019", "2021"]);
        }
    }

    #[test]
    fn test_negative_aware_domain_and_zero_rule() {
        let spec = spec_for(
            r#"{"X": {"annual_reports": {
                "2019": {"TangTruongLoiNhuan": 0.10, "TangTruongTaiSan": 0.05},
                "2021": {"TangTruongLoiNhuan": -0.20, "TangTruongTaiSan": 0.30}
            }}}"#,
        );
        assert!((spec.domain().min + 20.0).abs() < 1e-9);
        assert!((spec.domain().max - 30.0).abs() < 1e-9);
        assert!(spec.marks.contains(&Mark::Rule { value: 0.0, dashed: true }));
        assert_eq!(spec.tooltips_for(0)[1].text, "TangTruongLoiNhuan: -20.00%");
    }

    #[test]
    fn test_all_positive_floor_is_zero() {
        let spec = spec_for(
            r#"{"X": {"annual_reports": {
                "2019": {"TangTruongLoiNhuan": 0.10, "TangTruongTaiSan": 0.05}
            }}}"#,
        );
        assert_eq!(spec.domain().min, 0.0);
        assert!((spec.domain().max - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_pairs_gives_unit_domain() {
        let spec = spec_for(r#"{"X": {"annual_reports": {"2019": {"TangTruongTaiSan": 0.05}}}}"#);
        assert_eq!(spec.domain(), Domain { min: 0.0, max: 1.0 });
        assert!(spec.line_points(0).is_empty());
    }
}
