mod chart;
mod config;
mod dashboard;
mod export;
mod models;
mod projector;
mod render;
mod series;
mod source;
mod utils;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::AppConfig;
use crate::dashboard::{Dashboard, PageSelection, Region, RegionKind};
use crate::models::{Metric, RatioDataset};
use crate::render::{Frame, Manifest, SvgSurface, write_manifest};
use crate::series::build_series;

#[derive(Parser)]
#[command(
    name = "ratio-dashboard",
    about = "Financial ratio dashboard renderer",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Read the dataset from a saved JSON response instead of the API
    #[arg(short, long, global = true, env = "RATIOS_INPUT")]
    input: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// List company codes with name and years collected
    Companies,

    /// Print one company's ratios by year
    Show {
        #[arg(short, long)]
        company: String,
    },

    /// Render dashboard regions as SVG files
    Render {
        /// Company code (default: configured company, else the first one)
        #[arg(short, long)]
        company: Option<String>,

        /// overview, valuation or all
        #[arg(short, long)]
        page: Option<PageSelection>,

        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Export all companies as a flat CSV
    Export {
        #[arg(short, long, default_value = "financial_ratios.csv")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "ratio_dashboard=info,warn",
        1 => "ratio_dashboard=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let mut config = AppConfig::load();
    if cli.input.is_some() {
        config.source.input_file = cli.input;
    }

    match cli.command {
        Command::Companies => {
            let dataset = load_dataset(&config).await?;
            println!("{} companies:", dataset.len());
            for code in dataset.codes() {
                match dataset.company(code) {
                    Some(r) => println!(
                        "  {:<8} {:<40} {} years",
                        code,
                        r.company_name.as_deref().unwrap_or("—"),
                        r.total_years_collected.unwrap_or(0)
                    ),
                    None => println!("  {:<8} (malformed record)", code),
                }
            }
        }

        Command::Show { company } => {
            let dataset = load_dataset(&config).await?;
            let record = dataset
                .company(&company)
                .with_context(|| format!("Company {} not found", company))?;
            let Some(cs) = build_series(record) else {
                bail!("{} has no annual reports", company);
            };

            println!("─────────────────────────────────");
            println!("  {} — {}", company, cs.name.as_deref().unwrap_or("—"));
            println!("  Years collected : {}", cs.total_years_collected);
            println!("─────────────────────────────────");
            print!("  {:<22}", "");
            for p in cs.series.points() {
                print!("{:>12}", p.year);
            }
            println!();
            for metric in Metric::ALL {
                print!("  {:<22}", metric.label());
                for p in cs.series.points() {
                    let cell = p
                        .metric(metric)
                        .map(|v| metric.unit().format(v))
                        .unwrap_or_else(|| "—".into());
                    print!("{:>12}", cell);
                }
                println!();
            }
        }

        Command::Render { company, page, out } => {
            let _t = utils::Timer::start("Render");
            let pages = match page {
                Some(p) => p,
                None => config
                    .dashboard
                    .page
                    .parse()
                    .map_err(anyhow::Error::msg)
                    .context("dashboard.page")?,
            };
            let out_dir = out.unwrap_or_else(|| config.render.out_dir.clone());
            let preferred = company.or_else(|| config.dashboard.default_company.clone());

            let regions = Region::for_pages(pages);
            let mut dashboard = Dashboard::new(regions.iter().map(|r| {
                let frame = match r.kind() {
                    RegionKind::Kpi => Frame::card(config.render.kpi_width, config.render.kpi_height),
                    _ => Frame::chart(config.render.chart_width, config.render.chart_height),
                };
                (*r, SvgSurface::new(&out_dir, r.slug(), frame))
            }));

            let source = source::from_config(&config.source).context("Failed to build data source")?;
            if !dashboard.init(source.as_ref(), preferred.as_deref()).await {
                bail!("No data loaded, nothing rendered");
            }
            if let Some(code) = preferred.as_deref().filter(|c| dashboard.selected() != Some(*c)) {
                if dashboard.dataset().is_some_and(|ds| ds.contains(code)) {
                    bail!("{} has no annual reports, nothing rendered", code);
                }
            }
            let Some(code) = dashboard.selected().map(str::to_string) else {
                bail!("Initial company has no annual reports, nothing rendered");
            };

            let record = dashboard.dataset().and_then(|ds| ds.company(&code));
            let manifest = Manifest {
                company: code.clone(),
                company_name: record.and_then(|r| r.company_name.clone()),
                years_collected: record.and_then(|r| r.total_years_collected).unwrap_or(0),
                generated_at: Utc::now(),
                regions: dashboard.regions().map(|r| r.slug().to_string()).collect(),
            };
            write_manifest(&out_dir, &manifest)?;
            info!("Rendered {} regions for {} into {:?}", regions.len(), code, out_dir);
        }

        Command::Export { out } => {
            let _t = utils::Timer::start("Export");
            let dataset = load_dataset(&config).await?;
            let rows = export::export_to_path(&dataset, &out)?;
            println!("{} rows written to {:?}", utils::fmt_number(rows as i64), out);
        }
    }

    Ok(())
}

async fn load_dataset(config: &AppConfig) -> Result<RatioDataset> {
    let source = source::from_config(&config.source).context("Failed to build data source")?;
    source
        .fetch_dataset()
        .await
        .context("Failed to load financial ratios")
}
