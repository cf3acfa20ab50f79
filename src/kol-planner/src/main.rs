//! KOL Planner: influencer budget allocation service and command line.
//!
//! `serve` runs the HTTP API; `plan` and `split` print one allocation as JSON.

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use kol_allocator::{find_template, Engine, SegmentPlanBuilder};
use kol_api::ApiServer;
use kol_core::config::AppConfig;
use kol_core::{
    CatalogParameters, Platform, SegmentedAllocationRequest, SingleAllocationRequest, StaffParams,
    Tier, TierSelection,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "kol-planner")]
#[command(about = "Greedy ROI budget allocation across influencer offers")]
#[command(version)]
struct Cli {
    /// Node identifier (overrides config)
    #[arg(long, global = true, env = "KOL_PLANNER__NODE_ID")]
    node_id: Option<String>,

    /// Catalog parameter file, TOML/YAML/JSON (overrides config)
    #[arg(long, global = true, env = "KOL_PLANNER__PLANNER__CATALOG_PATH")]
    catalog: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API and the metrics exporter
    Serve {
        /// HTTP port (overrides config)
        #[arg(long, env = "KOL_PLANNER__API__HTTP_PORT")]
        http_port: Option<u16>,
    },
    /// Allocate one budget and print the plan
    Plan {
        /// Total budget (defaults to config)
        #[arg(long)]
        budget: Option<f64>,

        /// max_reach, mass_seeding, or a comma-separated tier list
        #[arg(long, default_value = "max_reach")]
        strategy: TierSelection,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Split a budget across segments and print the plan
    Split {
        #[arg(long)]
        budget: Option<f64>,

        /// Named template (balanced, mass_seeding, awareness, micro_focus)
        #[arg(long, conflicts_with = "share")]
        template: Option<String>,

        /// Segment as label=pct:tier,tier; use pct "rest" for the complement
        #[arg(long, required_unless_present = "template")]
        share: Vec<String>,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Content units bought per account (defaults to config)
    #[arg(long)]
    content_per_offer: Option<u32>,

    /// Restrict to these platforms (repeatable)
    #[arg(long = "platform")]
    platforms: Vec<Platform>,

    #[arg(long)]
    hourly_rate: Option<f64>,

    #[arg(long)]
    setup_hours: Option<f64>,

    #[arg(long)]
    manage_hours: Option<f64>,

    /// Ignore staffing cost
    #[arg(long, default_value_t = false, conflicts_with_all = ["hourly_rate", "setup_hours", "manage_hours"])]
    no_staff: bool,
}

impl CommonArgs {
    fn platforms(&self) -> BTreeSet<Platform> {
        if self.platforms.is_empty() {
            Platform::all()
        } else {
            self.platforms.iter().copied().collect()
        }
    }

    fn content_units(&self, config: &AppConfig) -> anyhow::Result<u32> {
        let units = self
            .content_per_offer
            .unwrap_or(config.planner.default_content_units);
        if units > config.planner.max_content_units {
            return Err(anyhow!(
                "--content-per-offer must be at most {}",
                config.planner.max_content_units
            ));
        }
        Ok(units)
    }

    fn staff(&self, config: &AppConfig) -> Option<StaffParams> {
        if self.no_staff {
            return None;
        }
        let defaults = config.staff.params();
        Some(StaffParams {
            hourly_rate: self.hourly_rate.unwrap_or(defaults.hourly_rate),
            setup_hours_per_offer: self.setup_hours.unwrap_or(defaults.setup_hours_per_offer),
            manage_hours_per_content_unit: self
                .manage_hours
                .unwrap_or(defaults.manage_hours_per_content_unit),
        })
    }
}

/// Parse `label=pct:tier,tier` into the builder.
fn add_share(builder: SegmentPlanBuilder, raw: &str) -> anyhow::Result<SegmentPlanBuilder> {
    let (label, rest) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("share '{raw}' must look like label=pct:tier,tier"))?;
    let (pct, tiers) = rest
        .split_once(':')
        .ok_or_else(|| anyhow!("share '{raw}' is missing its tier list"))?;
    let tiers = tiers
        .split(',')
        .map(str::parse)
        .collect::<Result<Vec<Tier>, _>>()?;

    if pct.trim().eq_ignore_ascii_case("rest") {
        return Ok(builder.complement(label.trim(), tiers));
    }
    let pct: f64 = pct
        .trim()
        .parse()
        .with_context(|| format!("share '{raw}' has a non-numeric percentage"))?;
    Ok(builder.segment(label.trim(), pct, tiers))
}

fn build_engine(config: &AppConfig) -> anyhow::Result<Engine> {
    let params = match &config.planner.catalog_path {
        Some(path) => CatalogParameters::from_file(path)?,
        None => CatalogParameters::default(),
    };
    let engine =
        Engine::initialize(&params)?.with_full_time_hours(config.planner.full_time_hours_per_month);
    info!(offers = engine.catalog().len(), "Catalog ready");
    Ok(engine)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kol_planner=info,kol_allocator=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(path) = cli.catalog {
        config.planner.catalog_path = Some(path);
    }

    let engine = build_engine(&config)?;

    match cli.command {
        Command::Serve { http_port } => {
            if let Some(port) = http_port {
                config.api.http_port = port;
            }
            info!(
                node_id = %config.node_id,
                http_port = config.api.http_port,
                metrics_port = config.metrics.port,
                "KOL Planner starting up"
            );

            let api_server = ApiServer::new(config, Arc::new(engine));
            if let Err(e) = api_server.start_metrics().await {
                error!(error = %e, "Failed to start metrics exporter");
            }
            api_server.start_http().await?;
        }
        Command::Plan {
            budget,
            strategy,
            common,
        } => {
            let request = SingleAllocationRequest {
                budget: budget.unwrap_or(config.planner.default_budget),
                tiers: strategy,
                platforms: common.platforms(),
                content_units_per_offer: common.content_units(&config)?,
                staff: common.staff(&config),
            };
            let outcome = engine.allocate_single(&request)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Split {
            budget,
            template,
            share,
            common,
        } => {
            let builder = match template {
                Some(name) => SegmentPlanBuilder::from_template(find_template(&name)?),
                None => share
                    .iter()
                    .try_fold(SegmentPlanBuilder::new(), |b, raw| add_share(b, raw))?,
            };
            let request = SegmentedAllocationRequest {
                total_budget: budget.unwrap_or(config.planner.default_budget),
                segments: builder.build()?,
                platforms: common.platforms(),
                content_units_per_offer: common.content_units(&config)?,
                staff: common.staff(&config),
            };
            let outcome = engine.allocate_by_segments(&request)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }

    Ok(())
}
