//! Declarative chart specifications.
//!
//! Every producer in this module is a pure function from a [`Series`] to a
//! [`ChartSpec`]. A spec holds data-space geometry only: categories, value
//! domain, marks, labels, tooltips and legend. Turning it into pixels is the
//! drawing surface's job (see `render`), using the scales in [`scale`].
//!
//! [`Series`]: crate::series::Series

pub mod bar;
pub mod growth;
pub mod kpi;
pub mod line;
pub mod scale;
pub mod stacked;
pub mod trend;

pub use bar::simple_bar;
pub use growth::growth_with_baseline;
pub use kpi::kpi_card;
pub use line::single_line;
pub use stacked::stacked_composition;
pub use trend::trend_lines;

use crate::projector::Domain;
use crate::utils::fmt_si;

/// Number of ticks value axes aim for.
const TICK_COUNT: usize = 5;

// ── Axes ──────────────────────────────────────────────────────────────────────

/// How categories (years) are laid out along the x axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CategoryScale {
    /// Evenly spaced positions, no width (line charts).
    Point { padding: f64 },
    /// Evenly spaced bands with a width (bar charts).
    Band { padding: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFormat {
    /// Decimals follow the tick step.
    Plain,
    /// Two significant digits with SI prefix ("2.5k").
    Si,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueAxis {
    pub domain: Domain,
    pub ticks: Vec<f64>,
    pub format: TickFormat,
    pub visible: bool,
}

impl ValueAxis {
    pub fn new(domain: Domain, format: TickFormat) -> Self {
        Self {
            domain,
            ticks: scale::nice_ticks(domain, TICK_COUNT),
            format,
            visible: true,
        }
    }

    pub fn hidden(domain: Domain) -> Self {
        Self {
            domain,
            ticks: Vec::new(),
            format: TickFormat::Plain,
            visible: false,
        }
    }

    pub fn tick_labels(&self) -> Vec<String> {
        match self.format {
            TickFormat::Si => self.ticks.iter().map(|t| fmt_si(*t)).collect(),
            TickFormat::Plain => {
                let decimals = scale::tick_decimals(self.domain, TICK_COUNT);
                self.ticks
                    .iter()
                    .map(|t| format!("{:.*}", decimals, t))
                    .collect()
            }
        }
    }
}

// ── Marks ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    /// Polyline through `(category, value)` points, in order.
    Line {
        series: usize,
        points: Vec<(String, f64)>,
    },
    Dot {
        series: usize,
        category: String,
        value: f64,
        radius: f64,
    },
    /// Vertical bar spanning `base..top` in value space.
    Bar {
        series: usize,
        category: String,
        base: f64,
        top: f64,
    },
    /// Horizontal line across the whole plot at `value`.
    Rule { value: f64, dashed: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabelAnchor {
    /// Just above the value.
    Above,
    /// Centered between `base` and `value` (inside a bar segment).
    Middle { base: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub series: usize,
    pub category: String,
    pub value: f64,
    pub text: String,
    pub anchor: LabelAnchor,
}

impl Label {
    pub fn above(series: usize, category: &str, value: f64, text: String) -> Self {
        Self {
            series,
            category: category.to_string(),
            value,
            text,
            anchor: LabelAnchor::Above,
        }
    }

    /// Label centered in the segment `base..top`.
    pub fn middle(series: usize, category: &str, base: f64, top: f64, text: String) -> Self {
        Self {
            series,
            category: category.to_string(),
            value: top,
            text,
            anchor: LabelAnchor::Middle { base },
        }
    }

    /// Value-space anchor the label is drawn at.
    pub fn anchor_value(&self) -> f64 {
        match self.anchor {
            LabelAnchor::Above => self.value,
            LabelAnchor::Middle { base } => (base + self.value) / 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub series: usize,
    pub category: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub series: usize,
    pub name: String,
}

// ── Spec ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub categories: Vec<String>,
    pub category_scale: CategoryScale,
    pub value_axis: ValueAxis,
    pub marks: Vec<Mark>,
    pub labels: Vec<Label>,
    pub tooltips: Vec<Tooltip>,
    pub legend: Vec<LegendEntry>,
    /// Big centered number on KPI cards.
    pub headline: Option<String>,
}

impl ChartSpec {
    pub fn new(
        title: impl Into<String>,
        categories: Vec<String>,
        category_scale: CategoryScale,
        value_axis: ValueAxis,
    ) -> Self {
        Self {
            title: title.into(),
            categories,
            category_scale,
            value_axis,
            marks: Vec::new(),
            labels: Vec::new(),
            tooltips: Vec::new(),
            legend: Vec::new(),
            headline: None,
        }
    }

    pub fn domain(&self) -> Domain {
        self.value_axis.domain
    }

    pub fn category_index(&self, category: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == category)
    }

    /// Points of the polyline drawn for `series`.
    #[cfg(test)]
    pub fn line_points(&self, series: usize) -> Vec<(String, f64)> {
        self.marks
            .iter()
            .find_map(|m| match m {
                Mark::Line { series: s, points } if *s == series => Some(points.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// `(category, base, top)` of every bar in `series`.
    #[cfg(test)]
    pub fn bars(&self, series: usize) -> Vec<(String, f64, f64)> {
        self.marks
            .iter()
            .filter_map(|m| match m {
                Mark::Bar {
                    series: s,
                    category,
                    base,
                    top,
                } if *s == series => Some((category.clone(), *base, *top)),
                _ => None,
            })
            .collect()
    }

    #[cfg(test)]
    pub fn labels_for(&self, series: usize) -> Vec<&Label> {
        self.labels.iter().filter(|l| l.series == series).collect()
    }

    #[cfg(test)]
    pub fn tooltips_for(&self, series: usize) -> Vec<&Tooltip> {
        self.tooltips.iter().filter(|t| t.series == series).collect()
    }

    /// Polyline, dots, labels and tooltips for one line series.
    fn push_line_series(
        &mut self,
        series: usize,
        points: Vec<(String, f64, String)>,
        radius: f64,
        tooltip_prefix: Option<&str>,
    ) {
        self.marks.push(Mark::Line {
            series,
            points: points.iter().map(|(c, v, _)| (c.clone(), *v)).collect(),
        });
        for (category, value, text) in points {
            self.marks.push(Mark::Dot {
                series,
                category: category.clone(),
                value,
                radius,
            });
            let tooltip = match tooltip_prefix {
                Some(prefix) => format!("{}: {}", prefix, text),
                None => format!("{}: {}", category, text),
            };
            self.tooltips.push(Tooltip {
                series,
                category: category.clone(),
                text: tooltip,
            });
            self.labels.push(Label::above(series, &category, value, text));
        }
    }
}
