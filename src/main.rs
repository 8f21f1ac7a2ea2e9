use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use clap::{Args, Parser, Subcommand};
use rcs::adapter::options::parse_param;
use rcs::config::{DEFAULT_CONFIG_FILE, parse_smoothing};
use rcs::core::{EnergyBreakdown, Scorer, Weights};
use rcs::format::OutputFormat;
use rcs::{AdapterOptions, AdapterRegistry, OnError, RcsConfig, RunOptions};
use serde::Serialize;

/// Rose Coherence Score benchmark
///
/// Scores how coherently an agent carries an intent through its stated
/// understanding into its action. The score is 1 - min(1, E), where E is a
/// weighted cyclic sum of KL divergences between the bag-of-words
/// distributions of intent, understanding and action.
///
/// QUICK START:
///
///   rcs run                                  # sample tasks, echo adapter
///   rcs run --tasks my_tasks.json --adapter local-llm
///   rcs score --intent "sort numbers" --understanding "sort them" --action "sorted"
///
/// External adapters are declared in rcs.toml under [adapters.<name>].
#[derive(Parser)]
#[command(name = "rcs")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(after_help = "See 'rcs <command> --help' for more information on a specific command.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a task file through an adapter and score every task
    ///
    /// Writes results/rcs_<adapter>_<timestamp>.json unless --no-save.
    Run(RunArgs),

    /// Score a single intent / understanding / action triple
    Score(ScoreArgs),

    /// List the adapters that can be selected with --adapter
    Adapters(AdaptersArgs),
}

#[derive(Args)]
struct ConfigArg {
    /// Config file [default: rcs.toml, if present]
    #[arg(long, env = "RCS_CONFIG")]
    config: Option<PathBuf>,
}

impl ConfigArg {
    fn load(&self) -> Result<RcsConfig> {
        let config = match &self.config {
            Some(path) => {
                if !path.exists() {
                    bail!(
                        "config file '{}' not found\n  To fix: check the path passed to --config.",
                        path.display()
                    );
                }
                RcsConfig::load(path)
            }
            None => RcsConfig::load(Path::new(DEFAULT_CONFIG_FILE)),
        };
        Ok(config.map_err(rcs::RcsError::from)?)
    }
}

#[derive(Args)]
struct RunArgs {
    /// Task file (JSON array) [default: from rcs.toml, else tasks/sample_tasks.json]
    #[arg(long)]
    tasks: Option<PathBuf>,

    /// Adapter to run [default: from rcs.toml, else echo]
    #[arg(long, visible_alias = "model")]
    adapter: Option<String>,

    #[command(flatten)]
    config: ConfigArg,

    /// Directory for result files [default: from rcs.toml, else results]
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Credential for the adapter (overrides RCS_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Backend model name for the adapter (overrides RCS_MODEL)
    #[arg(long)]
    adapter_model: Option<String>,

    /// Extra adapter parameter, repeatable
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// What to do when the adapter fails on a task [default: from rcs.toml, else abort]
    #[arg(long, value_enum)]
    on_error: Option<OnError>,

    /// Do not write a result file
    #[arg(long)]
    no_save: bool,

    /// Hide the progress bar
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

#[derive(Args)]
struct ScoreArgs {
    /// Intent text (I)
    #[arg(long)]
    intent: String,

    /// Understanding text (U)
    #[arg(long)]
    understanding: String,

    /// Action text (A)
    #[arg(long)]
    action: String,

    /// Weight of KL(I || U)
    #[arg(long, default_value_t = Weights::default().alpha, allow_negative_numbers = true)]
    alpha: f64,

    /// Weight of KL(U || A)
    #[arg(long, default_value_t = Weights::default().beta, allow_negative_numbers = true)]
    beta: f64,

    /// Weight of KL(A || I)
    #[arg(long, default_value_t = Weights::default().gamma, allow_negative_numbers = true)]
    gamma: f64,

    /// Laplace smoothing constant, must be positive
    #[arg(
        long,
        default_value_t = rcs::core::DEFAULT_SMOOTHING,
        value_parser = parse_smoothing,
        allow_negative_numbers = true
    )]
    smoothing: f64,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

#[derive(Args)]
struct AdaptersArgs {
    #[command(flatten)]
    config: ConfigArg,
}

fn main() -> Result<()> {
    rcs::telemetry::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Score(args) => score(&args),
        Commands::Adapters(args) => adapters(&args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let config = args.config.load()?;
    let tasks_path = args.tasks.unwrap_or_else(|| config.run.tasks.clone());
    let adapter_name = args.adapter.unwrap_or_else(|| config.run.adapter.clone());
    let results_dir = args
        .results_dir
        .unwrap_or_else(|| config.run.results_dir.clone());

    let registry = AdapterRegistry::with_config(&config);
    let mut adapter = registry.create(&adapter_name)?;

    let options = AdapterOptions {
        api_key: args.api_key,
        model: args.adapter_model,
        params: args.params.into_iter().collect::<BTreeMap<_, _>>(),
    }
    .resolve(|name| std::env::var(name).ok(), &config.adapter);
    tracing::debug!(adapter = %adapter_name, ?options, "configuring adapter");
    adapter.configure(&options)?;

    let tasks = rcs::load_tasks(&tasks_path)?;

    let run_options = RunOptions {
        on_error: args.on_error.unwrap_or(config.run.on_error),
        quiet: args.quiet,
        ..RunOptions::from_scoring(&config.scoring)
    };
    let report = rcs::run(&tasks, adapter.as_ref(), &run_options)?;

    let saved = if args.no_save {
        None
    } else {
        Some(report.write(&results_dir)?)
    };

    let out = args
        .format
        .render(&report, || report.summary(saved.as_deref()))
        .context("could not encode report")?;
    print!("{out}");
    Ok(())
}

#[derive(Serialize)]
struct ScoreOutput {
    rcs: f64,
    #[serde(flatten)]
    breakdown: EnergyBreakdown,
}

fn score(args: &ScoreArgs) -> Result<()> {
    let weights = Weights::new(args.alpha, args.beta, args.gamma);
    let breakdown = Scorer::new(args.smoothing).breakdown(
        &args.intent,
        &args.understanding,
        &args.action,
        weights,
    );
    let output = ScoreOutput {
        rcs: breakdown.score(),
        breakdown,
    };

    let out = args
        .format
        .render(&output, || {
            format!(
                "RCS: {:.4}\nEnergy: {:.4}\n  KL(I||U) = {:.4}  x alpha {}\n  KL(U||A) = {:.4}  x beta {}\n  KL(A||I) = {:.4}  x gamma {}\n",
                output.rcs,
                breakdown.energy,
                breakdown.intent_understanding,
                weights.alpha,
                breakdown.understanding_action,
                weights.beta,
                breakdown.action_intent,
                weights.gamma,
            )
        })
        .context("could not encode score")?;
    print!("{out}");
    Ok(())
}

fn adapters(args: &AdaptersArgs) -> Result<()> {
    let config = args.config.load()?;
    let registry = AdapterRegistry::with_config(&config);
    for name in registry.names() {
        match config.adapters.get(name) {
            Some(declared) => println!("{name}\t{}", declared.command.join(" ")),
            None => println!("{name}\t(built-in)"),
        }
    }
    Ok(())
}
