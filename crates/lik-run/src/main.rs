use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args as ClapArgs, Parser, Subcommand};
use lik_core::RunConfig;
use lik_exp::{
    expand, registry_append, registry_query, run_sweep, ProcessLauncher, Query, Registry,
    SweepPlan,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lik-run", about = "Tempered-likelihood temperature sweep driver")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute a sweep: per temperature, launch one trainer per seed and
    /// wait for the whole group before the next temperature.
    Sweep(SweepArgs),
    /// Expand a plan into run specs without launching anything.
    Expand(ExpandArgs),
    /// Query the run registry.
    Registry(RegistryArgs),
}

#[derive(ClapArgs, Debug)]
struct SweepArgs {
    /// YAML sweep plan (program, likelihood_temps, seeds).
    #[arg(long)]
    plan: PathBuf,
    /// YAML run-configuration template forwarded to every trainer invocation.
    #[arg(long)]
    template: PathBuf,
    /// Output directory for the sweep report and copied inputs.
    #[arg(long)]
    out: PathBuf,
    /// Optional registry (CSV or SQLite by extension) to append outcomes to.
    #[arg(long)]
    registry: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct ExpandArgs {
    /// YAML sweep plan.
    #[arg(long)]
    plan: PathBuf,
    /// YAML run-configuration template.
    #[arg(long)]
    template: PathBuf,
    /// Write the expanded groups here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct RegistryArgs {
    /// Registry file to query.
    #[arg(long)]
    path: PathBuf,
    /// Restrict rows to one plan hash.
    #[arg(long)]
    plan_hash: Option<String>,
    /// Maximum number of rows to return.
    #[arg(long)]
    limit: Option<usize>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();
    match cli.command {
        Command::Sweep(args) => run_sweep_command(args),
        Command::Expand(args) => run_expand(args),
        Command::Registry(args) => run_registry(args),
    }
}

fn run_sweep_command(args: SweepArgs) -> Result<(), Box<dyn Error>> {
    let plan = load_plan(&args.plan)?;
    let template = load_template(&args.template)?;
    fs::create_dir_all(&args.out)?;

    let mut launcher = ProcessLauncher;
    let report = run_sweep(&plan, &template, &mut launcher)?;

    write_json(args.out.join("sweep_report.json"), &report)?;
    // Persist the inputs next to the report for reproducibility.
    fs::copy(&args.plan, args.out.join("plan.yaml")).ok();
    fs::copy(&args.template, args.out.join("template.yaml")).ok();

    if let Some(path) = &args.registry {
        let registry = Registry::from_path(path);
        registry_append(&registry, &report)?;
    }

    if report.failures() > 0 {
        warn!(
            failures = report.failures(),
            launches = report.launches(),
            "sweep finished with failed runs"
        );
    } else {
        info!(launches = report.launches(), "sweep finished");
    }
    Ok(())
}

fn run_expand(args: ExpandArgs) -> Result<(), Box<dyn Error>> {
    let plan = load_plan(&args.plan)?;
    let template = load_template(&args.template)?;
    let groups = expand(&plan, &template)?;
    match &args.out {
        Some(path) => write_json(path, &groups)?,
        None => println!("{}", serde_json::to_string_pretty(&groups)?),
    }
    Ok(())
}

fn run_registry(args: RegistryArgs) -> Result<(), Box<dyn Error>> {
    let registry = Registry::from_path(&args.path);
    let query = Query {
        plan_hash: args.plan_hash,
        limit: args.limit,
    };
    let table = registry_query(&registry, &query)?;
    println!("{}", table.columns.join(","));
    for row in &table.rows {
        println!("{}", row.join(","));
    }
    Ok(())
}

fn load_plan(path: &Path) -> Result<SweepPlan, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    let plan: SweepPlan = serde_yaml::from_str(&contents)?;
    plan.validate()?;
    Ok(plan)
}

fn load_template(path: &Path) -> Result<RunConfig, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    let template: RunConfig = serde_yaml::from_str(&contents)?;
    Ok(template)
}

fn write_json<P: AsRef<Path>, T: serde::Serialize>(
    path: P,
    value: &T,
) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
