//! Dashboard controller: fetches the dataset once, then redraws every
//! attached region whenever a company is selected.
//!
//! ## Pages
//!
//! *Overview*: KPI cards for ROA, ROE, current ratio and debt ratio, the
//!   ROA/ROE trend, liquidity, capital structure and growth charts.
//!
//! *Valuation*: KPI cards for P/E, P/B and long-term debt, plus one chart per
//!   valuation metric.
//!
//! The controller never knows what a surface draws on; it is handed a
//! `Region → surface` map and writes each region it finds there.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use tracing::{debug, error, info, warn};

use crate::chart::{
    ChartSpec, growth_with_baseline, kpi_card, simple_bar, single_line, stacked_composition,
    trend_lines,
};
use crate::models::{Metric, RatioDataset};
use crate::render::DrawingSurface;
use crate::series::{CompanySeries, build_series};
use crate::source::RatioSource;

/// Stacked capital-structure legend, ratio part first.
const CAPITAL_PARTS: [&str; 2] = ["Liabilities", "Owner's equity"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Overview,
    Valuation,
}

/// Which pages a render covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelection {
    One(Page),
    All,
}

impl PageSelection {
    pub fn includes(self, page: Page) -> bool {
        match self {
            PageSelection::One(p) => p == page,
            PageSelection::All => true,
        }
    }
}

impl FromStr for PageSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overview" => Ok(PageSelection::One(Page::Overview)),
            "valuation" => Ok(PageSelection::One(Page::Valuation)),
            "all" => Ok(PageSelection::All),
            other => Err(format!("unknown page {:?} (overview, valuation, all)", other)),
        }
    }
}

/// Kind of content a region holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Kpi,
    Chart,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    KpiRoa,
    KpiRoe,
    KpiCurrentRatio,
    KpiDebt,
    RoaRoe,
    Liquidity,
    Assets,
    Growth,
    KpiPe,
    KpiPb,
    KpiLongTermDebt,
    Pe,
    Pb,
    Eps,
    LongTermDebt,
    YearsCollected,
}

impl Region {
    pub const ALL: [Region; 16] = [
        Region::KpiRoa,
        Region::KpiRoe,
        Region::KpiCurrentRatio,
        Region::KpiDebt,
        Region::RoaRoe,
        Region::Liquidity,
        Region::Assets,
        Region::Growth,
        Region::KpiPe,
        Region::KpiPb,
        Region::KpiLongTermDebt,
        Region::Pe,
        Region::Pb,
        Region::Eps,
        Region::LongTermDebt,
        Region::YearsCollected,
    ];

    /// File stem of the region's output.
    pub fn slug(self) -> &'static str {
        match self {
            Region::KpiRoa => "kpi-roa",
            Region::KpiRoe => "kpi-roe",
            Region::KpiCurrentRatio => "kpi-current-ratio",
            Region::KpiDebt => "kpi-debt",
            Region::RoaRoe => "chart-roa-roe",
            Region::Liquidity => "chart-liquidity",
            Region::Assets => "chart-assets",
            Region::Growth => "chart-growth",
            Region::KpiPe => "kpi-pe",
            Region::KpiPb => "kpi-pb",
            Region::KpiLongTermDebt => "kpi-long-term-debt",
            Region::Pe => "chart-pe",
            Region::Pb => "chart-pb",
            Region::Eps => "chart-eps",
            Region::LongTermDebt => "chart-long-term-debt",
            Region::YearsCollected => "years-collected",
        }
    }

    /// `None` for the years-collected text, which both pages show.
    pub fn page(self) -> Option<Page> {
        match self {
            Region::KpiRoa
            | Region::KpiRoe
            | Region::KpiCurrentRatio
            | Region::KpiDebt
            | Region::RoaRoe
            | Region::Liquidity
            | Region::Assets
            | Region::Growth => Some(Page::Overview),
            Region::KpiPe
            | Region::KpiPb
            | Region::KpiLongTermDebt
            | Region::Pe
            | Region::Pb
            | Region::Eps
            | Region::LongTermDebt => Some(Page::Valuation),
            Region::YearsCollected => None,
        }
    }

    pub fn kind(self) -> RegionKind {
        match self {
            Region::KpiRoa
            | Region::KpiRoe
            | Region::KpiCurrentRatio
            | Region::KpiDebt
            | Region::KpiPe
            | Region::KpiPb
            | Region::KpiLongTermDebt => RegionKind::Kpi,
            Region::YearsCollected => RegionKind::Text,
            _ => RegionKind::Chart,
        }
    }

    /// Regions shown for a page selection, in display order.
    pub fn for_pages(pages: PageSelection) -> Vec<Region> {
        Region::ALL
            .into_iter()
            .filter(|r| r.page().is_none_or(|p| pages.includes(p)))
            .collect()
    }

    /// Chart for this region, or `None` for text regions.
    pub fn produce(self, company: &CompanySeries) -> Option<ChartSpec> {
        let s = &company.series;
        let kpi = |m: Metric| kpi_card(m.label(), s, m, m.unit());
        let line = |title: &str, m: Metric| single_line(title, s, m, m.unit(), m.label());

        Some(match self {
            Region::KpiRoa => kpi(Metric::Roa),
            Region::KpiRoe => kpi(Metric::Roe),
            Region::KpiCurrentRatio => kpi(Metric::CurrentRatio),
            Region::KpiDebt => kpi(Metric::DebtToAssets),
            Region::RoaRoe => trend_lines("ROA & ROE", s, &[Metric::Roa, Metric::Roe]),
            Region::Liquidity => line("Liquidity", Metric::CurrentRatio),
            Region::Assets => {
                stacked_composition("Capital structure", s, Metric::DebtToAssets, CAPITAL_PARTS)
            }
            Region::Growth => growth_with_baseline(
                "Growth",
                s,
                [Metric::ProfitGrowth, Metric::AssetGrowth],
            ),
            Region::KpiPe => kpi(Metric::Pe),
            Region::KpiPb => kpi(Metric::Pb),
            Region::KpiLongTermDebt => kpi(Metric::LongTermDebtRatio),
            Region::Pe => line("Price / Earnings", Metric::Pe),
            Region::Pb => line("Price / Book", Metric::Pb),
            Region::Eps => simple_bar("Earnings per share", s, Metric::Eps, Metric::Eps.label()),
            Region::LongTermDebt => line("Long-term debt", Metric::LongTermDebtRatio),
            Region::YearsCollected => return None,
        })
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

// ── Controller ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectStats {
    pub drawn: usize,
    pub failed: usize,
}

pub struct Dashboard<S> {
    dataset: Option<RatioDataset>,
    regions: IndexMap<Region, S>,
    selected: Option<String>,
}

impl<S: DrawingSurface> Dashboard<S> {
    pub fn new(regions: impl IntoIterator<Item = (Region, S)>) -> Self {
        Self {
            dataset: None,
            regions: regions.into_iter().collect(),
            selected: None,
        }
    }

    /// Fetch the dataset once and select `preferred` (or the first company).
    /// Returns `false` and stays empty if the fetch fails.
    pub async fn init(&mut self, source: &dyn RatioSource, preferred: Option<&str>) -> bool {
        let dataset = match source.fetch_dataset().await {
            Ok(ds) => ds,
            Err(e) => {
                error!("Could not load financial ratios: {}", e);
                return false;
            }
        };

        let initial = preferred
            .filter(|code| {
                let known = dataset.contains(code);
                if !known {
                    warn!("Company {} not in dataset, using the first one", code);
                }
                known
            })
            .or(dataset.first_code())
            .map(str::to_string);
        self.dataset = Some(dataset);

        if let Some(code) = initial {
            self.select(&code);
        }
        true
    }

    /// Redraw every region for `code`. Unknown codes and companies without
    /// annual reports leave the current drawing untouched.
    pub fn select(&mut self, code: &str) -> Option<SelectStats> {
        let dataset = self.dataset.as_ref()?;
        let Some(record) = dataset.company(code) else {
            debug!("{}: no usable record, selection ignored", code);
            return None;
        };
        let Some(company) = build_series(record) else {
            debug!("{}: no annual reports, selection ignored", code);
            return None;
        };

        let mut stats = SelectStats::default();
        for (region, surface) in self.regions.iter_mut() {
            let result = match region.produce(&company) {
                Some(spec) => surface.draw(&spec),
                None => surface.write_text(&company.total_years_collected.to_string()),
            };
            match result {
                Ok(()) => stats.drawn += 1,
                Err(e) => {
                    warn!("{}: {:#}", region, e);
                    stats.failed += 1;
                }
            }
        }

        info!(
            "Selected {} ({} years): {} regions drawn",
            code,
            company.series.len(),
            stats.drawn
        );
        self.selected = Some(code.to_string());
        Some(stats)
    }

    pub fn dataset(&self) -> Option<&RatioDataset> {
        self.dataset.as_ref()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[cfg(test)]
    pub fn region(&self, region: Region) -> Option<&S> {
        self.regions.get(&region)
    }

    pub fn regions(&self) -> impl Iterator<Item = Region> + '_ {
        self.regions.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::MemorySurface;
    use crate::source::SourceError;
    use async_trait::async_trait;

    const DATA: &str = r#"{
        "ABC": {"tenCongTy": "ABC Corp", "TongSoNamThuThap": 3, "annual_reports": {
            "2021": {"ROA": 0.10, "ROE": 0.20, "HeSoNoTrenTongTaiSan": 0.3},
            "2022": {"ROA": 0.12, "ROE": null, "HeSoNoTrenTongTaiSan": null},
            "2020": {"ROA": 0.08, "ROE": 0.18, "HeSoNoTrenTongTaiSan": 0.4}
        }},
        "EMPTY": {"tenCongTy": "No reports", "TongSoNamThuThap": 0},
        "BROKEN": 42,
        "XYZ": {"annual_reports": {"2021": {"PE": 12.5, "EPS": 2100}}}
    }"#;

    struct Fixed(Option<&'static str>);

    #[async_trait]
    impl RatioSource for Fixed {
        async fn fetch_dataset(&self) -> Result<RatioDataset, SourceError> {
            match self.0 {
                Some(body) => Ok(RatioDataset::from_json(body)?),
                None => Err(SourceError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE)),
            }
        }
    }

    fn dashboard(pages: PageSelection) -> Dashboard<MemorySurface> {
        Dashboard::new(
            Region::for_pages(pages)
                .into_iter()
                .map(|r| (r, MemorySurface::default())),
        )
    }

    fn loaded(preferred: Option<&str>) -> Dashboard<MemorySurface> {
        let mut d = dashboard(PageSelection::All);
        assert!(tokio_test::block_on(d.init(&Fixed(Some(DATA)), preferred)));
        d
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!("Overview".parse::<PageSelection>(), Ok(PageSelection::One(Page::Overview)));
        assert_eq!("all".parse::<PageSelection>(), Ok(PageSelection::All));
        assert!("summary".parse::<PageSelection>().is_err());
    }

    #[test]
    fn test_regions_per_page() {
        let overview = Region::for_pages(PageSelection::One(Page::Overview));
        assert_eq!(overview.len(), 9);
        assert!(overview.contains(&Region::YearsCollected));
        assert!(!overview.contains(&Region::Eps));
        assert_eq!(Region::for_pages(PageSelection::All).len(), 16);
        assert_eq!(Region::KpiPb.kind(), RegionKind::Kpi);
    }

    #[test]
    fn test_init_selects_first_company() {
        let d = loaded(None);
        assert_eq!(d.selected(), Some("ABC"));
        let years = d.region(Region::YearsCollected).unwrap();
        assert_eq!(years.text.as_deref(), Some("3"));

        let trend = d.region(Region::RoaRoe).unwrap().spec.as_ref().unwrap();
        assert_eq!(trend.categories, vec!["2020", "2021", "2022"]);
        let roe: Vec<String> = trend.line_points(1).into_iter().map(|(y, _)| y).collect();
        assert_eq!(roe, vec!["2020", "2021"]);
    }

    #[test]
    fn test_capital_structure_region() {
        let d = loaded(None);
        let spec = d.region(Region::Assets).unwrap().spec.as_ref().unwrap();
        assert_eq!(spec.categories, vec!["2020", "2021"]);
        let texts: Vec<&str> = spec.labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["40.0%", "60.0%", "30.0%", "70.0%"]);
    }

    #[test]
    fn test_init_honours_preferred_company() {
        let d = loaded(Some("XYZ"));
        assert_eq!(d.selected(), Some("XYZ"));
        let years = d.region(Region::YearsCollected).unwrap();
        assert_eq!(years.text.as_deref(), Some("0"));
        let kpi = d.region(Region::KpiPe).unwrap().spec.as_ref().unwrap();
        assert_eq!(kpi.headline.as_deref(), Some("12.50"));

        let d = loaded(Some("NOPE"));
        assert_eq!(d.selected(), Some("ABC"));
    }

    #[test]
    fn test_invalid_selection_keeps_previous_drawing() {
        let mut d = loaded(None);
        let before: Vec<MemorySurface> = d.regions.values().cloned().collect();

        assert!(d.select("EMPTY").is_none());
        assert!(d.select("BROKEN").is_none());
        assert!(d.select("MISSING").is_none());

        let after: Vec<MemorySurface> = d.regions.values().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(d.selected(), Some("ABC"));
    }

    #[test]
    fn test_select_redraws_every_region() {
        let mut d = loaded(None);
        let stats = d.select("XYZ").unwrap();
        assert_eq!(stats, SelectStats { drawn: 16, failed: 0 });
        assert!(d.regions.values().all(|s| s.draws == 2));
    }

    #[test]
    fn test_failed_fetch_leaves_dashboard_empty() {
        let mut d = dashboard(PageSelection::All);
        assert!(!tokio_test::block_on(d.init(&Fixed(None), None)));
        assert!(d.dataset().is_none());
        assert!(d.select("ABC").is_none());
        assert!(d.regions.values().all(|s| s.draws == 0));
    }

    #[test]
    fn test_only_attached_regions_are_drawn() {
        let mut d = Dashboard::new([(Region::Eps, MemorySurface::default())]);
        assert!(tokio_test::block_on(d.init(&Fixed(Some(DATA)), Some("XYZ"))));
        assert_eq!(d.regions().collect::<Vec<_>>(), vec![Region::Eps]);
        let spec = d.region(Region::Eps).unwrap().spec.as_ref().unwrap();
        assert_eq!(spec.labels[0].text, "2,100");
    }
}
