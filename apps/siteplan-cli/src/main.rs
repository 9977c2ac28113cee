use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use siteplan_contracts::{
    PlanningErrorBody, PlanningRequest, SiteOptionShard, SitePlanningResponse,
};
use siteplan_core::{
    apply_env_overrides, load_config, load_from_env, write_schema_file, CancellationFlag,
    PlannerConfig, ShardValidator, SitePlanner,
};
use tracing_subscriber::{fmt, EnvFilter};

/// Exit code when the planner rejects a request.
const EXIT_REJECTED: i32 = 2;

#[derive(Parser)]
#[command(name = "siteplan", version, about = "Governance-gated site planning")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan candidate sites for a request file and print the response (JSON)
    Plan(PlanArgs),
    /// Run only the shard admissibility checks on a request file
    Validate(ValidateArgs),
    /// Print or write the planner configuration JSON schema
    ConfigSchema(ConfigSchemaArgs),
}

#[derive(Args)]
struct PlanArgs {
    /// Planning request JSON file
    #[arg(long)]
    request: PathBuf,
    /// Planner TOML config; falls back to SITEPLAN_CONFIG and SITEPLAN_* overrides
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the minimum eco-impact score
    #[arg(long)]
    min_eco: Option<f64>,
    /// Override the minimum sprawl reduction percent
    #[arg(long)]
    min_sprawl: Option<f64>,
    /// Require candidates to lie within every corridor
    #[arg(long)]
    enforce_containment: bool,
    /// Print planning-layer site option shards instead of the response body
    #[arg(long)]
    emit_shards: bool,
    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct ValidateArgs {
    /// Planning request JSON file
    #[arg(long)]
    request: PathBuf,
}

#[derive(Args)]
struct ConfigSchemaArgs {
    /// Write the schema here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Plan(args) => cmd_plan(&args),
        Commands::Validate(args) => cmd_validate(&args),
        Commands::ConfigSchema(args) => cmd_config_schema(&args),
    };
    match outcome {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn read_request(path: &Path) -> Result<PlanningRequest> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading request {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing request {}", path.display()))
}

fn effective_config(args: &PlanArgs) -> Result<PlannerConfig> {
    let mut cfg = match &args.config {
        Some(path) => {
            let path = path
                .to_str()
                .with_context(|| format!("config path is not UTF-8: {}", path.display()))?;
            apply_env_overrides(load_config(path)?, |key| std::env::var(key).ok())?
        }
        None => load_from_env()?,
    };
    if let Some(min_eco) = args.min_eco {
        cfg.planning.min_eco_impact_score = min_eco;
    }
    if let Some(min_sprawl) = args.min_sprawl {
        cfg.planning.min_sprawl_reduction_percent = min_sprawl;
    }
    if args.enforce_containment {
        cfg.planning.enforce_corridor_containment = true;
    }
    // Flags bypass the env layer; re-check the merged result.
    apply_env_overrides(cfg, |_| None)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");
    Ok(())
}

fn cmd_plan(args: &PlanArgs) -> Result<i32> {
    let request = read_request(&args.request)?;
    let cfg = effective_config(args)?;
    tracing::debug!(?cfg, "effective planner config");
    let planner = SitePlanner::new(&cfg);
    let result = planner.plan(&request, &CancellationFlag::new())?;

    if let Some(body) = PlanningErrorBody::from_result(&result) {
        print_json(&body, args.pretty)?;
        return Ok(EXIT_REJECTED);
    }
    if args.emit_shards {
        let shards: Vec<SiteOptionShard> = result
            .options
            .iter()
            .map(|o| o.to_site_option_shard(&result.grammar_version_id))
            .collect();
        print_json(&shards, args.pretty)?;
    } else {
        print_json(&SitePlanningResponse::from_result(&result), args.pretty)?;
    }
    Ok(0)
}

fn cmd_validate(args: &ValidateArgs) -> Result<i32> {
    let request = read_request(&args.request)?;
    match ShardValidator::new().validate(&request.shards, &request.grammar_version_id) {
        Ok(()) => {
            println!(
                "admissible: {} shard(s) under {}",
                request.shards.len(),
                request.grammar_version_id
            );
            Ok(0)
        }
        Err(err) => {
            println!("rejected: {err}");
            Ok(EXIT_REJECTED)
        }
    }
}

fn cmd_config_schema(args: &ConfigSchemaArgs) -> Result<i32> {
    match &args.out {
        Some(path) => {
            let target = path
                .to_str()
                .with_context(|| format!("output path is not UTF-8: {}", path.display()))?;
            write_schema_file(target).with_context(|| format!("writing {}", path.display()))?;
            println!("wrote {}", path.display());
        }
        None => print_json(&siteplan_core::config_schema_json(), true)?,
    }
    Ok(0)
}
