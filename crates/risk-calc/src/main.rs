//! Risk Calculator
//!
//! Evaluates FAIR risk records from JSON files, for offline analysis and for
//! checking stored register values.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fair_engine::{InMemorySources, ParameterChangeDetector, RiskRecalculator};
use register_core::types::{Asset, Control, CostModuleAssignment, RiskRecord};
use register_core::EngineConfig;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "risk-calc")]
#[command(about = "FAIR inherent/residual risk calculator")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Engine configuration file (TOML/JSON/YAML); defaults to FAIR_* env vars
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full calculation for a risk, ignoring stored values
    Calculate {
        /// Risk bundle: {risk, assets?, controls?, costModules?}
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Apply the cache policy, recalculating only when required
    Recalculate {
        /// Risk bundle with the edited record
        #[arg(short, long)]
        input: PathBuf,
        /// Stored record before the edit
        #[arg(short, long)]
        original: Option<PathBuf>,
    },
    /// Report whether two record snapshots differ in tracked FAIR fields
    Diff {
        #[arg(short, long)]
        original: PathBuf,
        #[arg(short, long)]
        current: PathBuf,
    },
}

/// A risk record plus the collaborator data it references.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RiskBundle {
    risk: RiskRecord,
    #[serde(default)]
    assets: Vec<Asset>,
    #[serde(default)]
    controls: Vec<Control>,
    #[serde(default)]
    cost_modules: Vec<CostModuleAssignment>,
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "risk_calc=info,fair_engine=info".into());

    // Logs go to stderr so stdout stays machine-readable.
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn read_bundle(path: &Path) -> Result<RiskBundle> {
    let value = read_json(path)?;
    serde_json::from_value(value)
        .with_context(|| format!("{} is not a risk bundle", path.display()))
}

/// The `risk` object if the file is a bundle, otherwise the whole document.
fn record_value(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("risk") => {
            map.remove("risk").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        Some(p) => EngineConfig::from_file(p)
            .with_context(|| format!("Failed to load config from {}", p.display()))?,
        None => EngineConfig::from_env()?,
    };
    Ok(config)
}

async fn recalculator_for(bundle: &RiskBundle, config: EngineConfig) -> RiskRecalculator {
    let sources = InMemorySources::new();
    for asset in &bundle.assets {
        sources.insert_asset(asset.clone()).await;
    }
    sources
        .set_controls(bundle.risk.id, bundle.controls.clone())
        .await;
    sources
        .set_cost_modules(bundle.risk.id, bundle.cost_modules.clone())
        .await;

    let shared = Arc::new(sources);
    RiskRecalculator::new(config, shared.clone(), shared.clone(), shared)
}

async fn calculate(input: &Path, config: EngineConfig) -> Result<()> {
    let bundle = read_bundle(input)?;
    info!(risk_id = %bundle.risk.id, title = %bundle.risk.title, "Calculating risk");

    let recalculator = recalculator_for(&bundle, config).await;
    let calc_input = recalculator.assemble_input(&bundle.risk).await?;
    let result = recalculator.engine().calculate_risk(&calc_input);

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn recalculate(input: &Path, original: Option<&Path>, config: EngineConfig) -> Result<()> {
    let bundle = read_bundle(input)?;
    let original = original
        .map(|p| -> Result<RiskRecord> {
            Ok(RiskRecord::from_json(record_value(read_json(p)?))?)
        })
        .transpose()?;

    let recalculator = recalculator_for(&bundle, config).await;
    let outcome = recalculator
        .recalculate(original.as_ref(), &bundle.risk)
        .await?;

    info!(
        risk_id = %bundle.risk.id,
        decision = ?outcome.decision,
        persist = outcome.should_persist(),
        "Recalculation finished"
    );
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

/// Whether `current` differs from `original` under the configured tolerance.
fn tracked_change(original: &Value, current: &Value, config: &EngineConfig) -> bool {
    ParameterChangeDetector::new(config.change_epsilon).has_changed(original, current)
}

fn diff(original: &Path, current: &Path, config: EngineConfig) -> Result<()> {
    let original = record_value(read_json(original)?);
    let current = record_value(read_json(current)?);

    let changed = tracked_change(&original, &current, &config);
    info!(changed, epsilon = config.change_epsilon, "Compared record snapshots");
    println!("{}", serde_json::json!({ "changed": changed }));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    match cli.command {
        Commands::Calculate { input } => {
            let config = load_config(cli.config.as_deref())?;
            calculate(&input, config).await
        }
        Commands::Recalculate { input, original } => {
            let config = load_config(cli.config.as_deref())?;
            recalculate(&input, original.as_deref(), config).await
        }
        Commands::Diff { original, current } => {
            let config = load_config(cli.config.as_deref())?;
            diff(&original, &current, config)
        }
    }
}
