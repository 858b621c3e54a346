use crate::models::Metric;
use crate::projector::{Domain, UnitMode, project_latest, project_valid};
use crate::series::Series;

use super::{CategoryScale, ChartSpec, Mark, Tooltip, ValueAxis};

const HEADROOM: f64 = 1.2;

/// Latest-value card: a single bar for the most recent year, scaled against
/// the whole history, with the formatted value as a headline.
pub fn kpi_card(title: &str, series: &Series, metric: Metric, mode: UnitMode) -> ChartSpec {
    let history = project_valid(series, metric.key(), mode);
    let domain = Domain::zero_based(history.iter().map(|p| p.value), HEADROOM, 1.0);
    let latest = project_latest(series, metric.key(), mode);

    let categories = latest.iter().map(|p| p.year.clone()).collect();
    let mut spec = ChartSpec::new(
        title,
        categories,
        CategoryScale::Band { padding: 0.3 },
        ValueAxis::hidden(domain),
    );

    match latest {
        Some(p) => {
            spec.marks.push(Mark::Bar {
                series: 0,
                category: p.year.clone(),
                base: 0.0,
                top: p.value,
            });
            spec.tooltips.push(Tooltip {
                series: 0,
                category: p.year.clone(),
                text: format!("Year {}: {}", p.year, p.display),
            });
            spec.headline = Some(p.display);
        }
        None => spec.headline = Some(mode.format(0.0)),
    }

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
    fn test_single_latest_bar_scaled_by_history() {
        let s = series(
            r#"{"X": {"annual_reports": {
                "2020": {"ROE": 0.25},
                "2021": {"ROE": 0.10},
                "2019": {"ROE": null}
            }}}"#,
        );
        let spec = kpi_card("ROE", &s, Metric::Roe, UnitMode::RatioAsPercent);
        assert_eq!(spec.categories, vec!["2021"]);
        assert!((spec.domain().max - 30.0).abs() < 1e-9);
        let bars = spec.bars(0);
        assert_eq!(bars.len(), 1);
        assert!((bars[0].2 - 10.0).abs() < 1e-9);
        assert_eq!(spec.headline.as_deref(), Some("10.00%"));
        assert_eq!(spec.tooltips[0].text, "Year 2021: 10.00%");
        assert!(!spec.value_axis.visible);
    }

    #[test]
    fn test_null_latest_shows_zero() {
        let s = series(r#"{"X": {"annual_reports": {"2020": {"PE": 8.5}, "2021": {"PE": null}}}}"#);
        let spec = kpi_card("P/E", &s, Metric::Pe, UnitMode::Absolute);
        assert_eq!(spec.headline.as_deref(), Some("0.00"));
        assert_eq!(spec.bars(0)[0].2, 0.0);
        assert!((spec.domain().max - 10.2).abs() < 1e-9);
    }

    #[test]
    fn test_large_absolute_value_is_grouped() {
        let s = series(r#"{"X": {"annual_reports": {"2021": {"EPS": 3456.7}}}}"#);
        let spec = kpi_card("EPS", &s, Metric::Eps, UnitMode::Absolute);
        assert_eq!(spec.headline.as_deref(), Some("3,457"));
    }

    #[test]
    fn test_empty_series_draws_no_bar() {
        let spec = kpi_card("ROA", &Series::default(), Metric::Roa, UnitMode::RatioAsPercent);
        assert!(spec.categories.is_empty());
        assert!(spec.bars(0).is_empty());
        assert_eq!(spec.domain().max, 1.2);
    }

    #[test]
    fn test_domain_covers_every_historical_value() {
        let s = series(
            r#"{"X": {"annual_reports": {
                "2017": {"PB": 1.1}, "2018": {"PB": 4.2}, "2019": {"PB": 0.0},
                "2020": {"PB": 2.9}, "2021": {"PB": 3.3}
            }}}"#,
        );
        let spec = kpi_card("P/B", &s, Metric::Pb, UnitMode::Absolute);
        for p in s.points() {
            let v = p.metric(Metric::Pb).unwrap();
            assert!(spec.domain().max >= v);
        }
        assert!(spec.domain().max >= spec.bars(0)[0].2);
    }
}
