//! Drawing surfaces. The dashboard only ever talks to [`DrawingSurface`];
//! the SVG implementation here is the one renderer for every chart kind.

pub mod svg;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::chart::ChartSpec;

pub use svg::{Frame, SvgSurface};

/// One named region of the dashboard.
pub trait DrawingSurface {
    /// Clear the region and draw `spec` in full.
    fn draw(&mut self, spec: &ChartSpec) -> Result<()>;

    /// Replace the region's text content.
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// Summary written next to the SVG files after a render.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub company: String,
    pub company_name: Option<String>,
    pub years_collected: u32,
    pub generated_at: DateTime<Utc>,
    pub regions: Vec<String>,
}

pub fn write_manifest(dir: &Path, manifest: &Manifest) -> Result<()> {
    let path = dir.join("manifest.json");
    let body = serde_json::to_string_pretty(manifest)?;
    std::fs::write(&path, body).with_context(|| format!("write {:?}", path))?;
    Ok(())
}
