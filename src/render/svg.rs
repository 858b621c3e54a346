//! Generic SVG renderer for [`ChartSpec`].

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use tracing::debug;

use crate::chart::scale::{BandScale, LinearScale};
use crate::chart::{CategoryScale, ChartSpec, LabelAnchor, Mark};

use super::DrawingSurface;

const PALETTE: [&str; 4] = ["#0d47a1", "#4fc3f7", "#66bb6a", "#ef5350"];
const AXIS_COLOR: &str = "#666";
const LEGEND_SPACING: f64 = 140.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Outer size of a chart and the margin reserved for axes and legend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Frame {
    pub fn chart(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            margin: Margin {
                top: 30.0,
                right: 30.0,
                bottom: 30.0,
                left: 50.0,
            },
        }
    }

    /// KPI cards: no value axis, a strip at the bottom for the year.
    pub fn card(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            margin: Margin {
                top: 10.0,
                right: 10.0,
                bottom: 20.0,
                left: 10.0,
            },
        }
    }

    fn plot_width(&self) -> f64 {
        (self.width - self.margin.left - self.margin.right).max(1.0)
    }

    fn plot_height(&self) -> f64 {
        (self.height - self.margin.top - self.margin.bottom).max(1.0)
    }
}

fn color(series: usize) -> &'static str {
    PALETTE[series % PALETTE.len()]
}

/// Render a spec into a standalone SVG document.
pub fn render_svg(spec: &ChartSpec, frame: &Frame) -> String {
    let pw = frame.plot_width();
    let ph = frame.plot_height();
    let y = LinearScale::new(spec.domain(), (ph, 0.0));
    let n = spec.categories.len();
    let x = match spec.category_scale {
        CategoryScale::Point { padding } => BandScale::point(n, (0.0, pw), padding),
        CategoryScale::Band { padding } => BandScale::band(n, (0.0, pw), padding),
    };
    let clamp_y = |v: f64| y.map(v).clamp(0.0, ph);
    let center = |category: &str| spec.category_index(category).and_then(|i| x.center(i));
    let tooltip = |series: usize, category: &str| {
        spec.tooltips
            .iter()
            .find(|t| t.series == series && t.category == category)
            .map(|t| format!("<title>{}</title>", text(&t.text)))
            .unwrap_or_default()
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
        w = frame.width,
        h = frame.height
    );
    let _ = writeln!(out, "<title>{}</title>", text(&spec.title));
    let _ = writeln!(
        out,
        r#"<g transform="translate({},{})">"#,
        frame.margin.left, frame.margin.top
    );

    // Category axis
    let _ = writeln!(
        out,
        r#"<line x1="0" y1="{ph:.2}" x2="{pw:.2}" y2="{ph:.2}" stroke="{AXIS_COLOR}"/>"#
    );
    for (i, category) in spec.categories.iter().enumerate() {
        if let Some(cx) = x.center(i) {
            let _ = writeln!(
                out,
                r#"<text x="{cx:.2}" y="{:.2}" text-anchor="middle" font-size="11" fill="{AXIS_COLOR}">{}</text>"#,
                ph + 15.0,
                text(category)
            );
        }
    }

    // Value axis
    if spec.value_axis.visible {
        for (tick, label) in spec.value_axis.ticks.iter().zip(spec.value_axis.tick_labels()) {
            let ty = y.map(*tick);
            let _ = writeln!(
                out,
                r##"<line x1="0" y1="{ty:.2}" x2="{pw:.2}" y2="{ty:.2}" stroke="#eee"/><text x="-6" y="{ty:.2}" dy="0.32em" text-anchor="end" font-size="10" fill="{AXIS_COLOR}">{}</text>"##,
                text(&label)
            );
        }
    }

    for mark in &spec.marks {
        match mark {
            Mark::Line { series, points } => {
                let d: Vec<String> = points
                    .iter()
                    .filter_map(|(c, v)| center(c).map(|cx| format!("{cx:.2},{:.2}", y.map(*v))))
                    .collect();
                if d.len() > 1 {
                    let _ = writeln!(
                        out,
                        r#"<path d="M{}" fill="none" stroke="{}" stroke-width="2"/>"#,
                        d.join("L"),
                        color(*series)
                    );
                }
            }
            Mark::Dot {
                series,
                category,
                value,
                radius,
            } => {
                if let Some(cx) = center(category) {
                    let _ = writeln!(
                        out,
                        r#"<circle cx="{cx:.2}" cy="{:.2}" r="{radius}" fill="{}">{}</circle>"#,
                        y.map(*value),
                        color(*series),
                        tooltip(*series, category)
                    );
                }
            }
            Mark::Bar {
                series,
                category,
                base,
                top,
            } => {
                let Some(bx) = spec.category_index(category).and_then(|i| x.position(i)) else {
                    continue;
                };
                let (y0, y1) = (clamp_y(*base), clamp_y(*top));
                let _ = writeln!(
                    out,
                    r#"<rect x="{bx:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="2" fill="{}">{}</rect>"#,
                    y0.min(y1),
                    x.bandwidth(),
                    (y0 - y1).abs(),
                    color(*series),
                    tooltip(*series, category)
                );
            }
            Mark::Rule { value, dashed } => {
                let ry = y.map(*value);
                if (0.0..=ph).contains(&ry) {
                    let dash = if *dashed { r#" stroke-dasharray="4""# } else { "" };
                    let _ = writeln!(
                        out,
                        r##"<line x1="0" y1="{ry:.2}" x2="{pw:.2}" y2="{ry:.2}" stroke="#999"{dash}/>"##
                    );
                }
            }
        }
    }

    for label in &spec.labels {
        let Some(lx) = center(&label.category) else {
            continue;
        };
        let ly = y.map(label.anchor_value());
        let (ly, fill, dy) = match label.anchor {
            LabelAnchor::Above => (ly - 8.0, color(label.series), "0"),
            LabelAnchor::Middle { .. } => (ly, "white", "0.35em"),
        };
        let _ = writeln!(
            out,
            r#"<text x="{lx:.2}" y="{ly:.2}" dy="{dy}" text-anchor="middle" font-size="11" font-weight="bold" fill="{fill}">{}</text>"#,
            text(&label.text)
        );
    }

    // Legend, right-aligned above the plot
    let legend_x = pw - LEGEND_SPACING * spec.legend.len() as f64;
    for (i, entry) in spec.legend.iter().enumerate() {
        let lx = legend_x + LEGEND_SPACING * i as f64;
        let _ = writeln!(
            out,
            r##"<g transform="translate({lx:.2},-24)"><rect width="12" height="12" rx="2" fill="{}"/><text x="16" y="6" dy="0.32em" font-size="12" fill="#333" aria-label="{}">{}</text></g>"##,
            color(entry.series),
            attr(&entry.name),
            text(&entry.name)
        );
    }

    if let Some(headline) = &spec.headline {
        let _ = writeln!(
            out,
            r##"<text x="{:.2}" y="{:.2}" text-anchor="middle" dominant-baseline="middle" font-size="20" font-weight="bold" fill="#333">{}</text>"##,
            pw / 2.0,
            ph / 2.0,
            text(headline)
        );
    }

    out.push_str("</g>\n</svg>\n");
    out
}

// ── File-backed surface ───────────────────────────────────────────────────────

/// Writes `<name>.svg` (charts) or `<name>.txt` (text regions) in a directory,
/// replacing whatever was there.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    dir: PathBuf,
    name: String,
    frame: Frame,
}

impl SvgSurface {
    pub fn new(dir: &Path, name: impl Into<String>, frame: Frame) -> Self {
        Self {
            dir: dir.to_path_buf(),
            name: name.into(),
            frame,
        }
    }

    pub fn svg_path(&self) -> PathBuf {
        self.dir.join(format!("{}.svg", self.name))
    }

    pub fn text_path(&self) -> PathBuf {
        self.dir.join(format!("{}.txt", self.name))
    }
}

impl DrawingSurface for SvgSurface {
    fn draw(&mut self, spec: &ChartSpec) -> Result<()> {
        let path = self.svg_path();
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Could not create dir {:?}", self.dir))?;
        std::fs::write(&path, render_svg(spec, &self.frame))
            .with_context(|| format!("write {:?}", path))?;
        debug!("{}: wrote {:?}", self.name, path);
        Ok(())
    }

    fn write_text(&mut self, body: &str) -> Result<()> {
        let path = self.text_path();
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Could not create dir {:?}", self.dir))?;
        std::fs::write(&path, body).with_context(|| format!("write {:?}", path))?;
        Ok(())
    }
}
