use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "evalframe", about = "Record normalization, RAG evaluation, and threshold gating")]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/evalframe/config.toml, if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Flatten and partition a batch of stream records.
    Transform(InputArgs),
    /// Score an application's ground truth.
    Evaluate(InputArgs),
    /// Gate evaluation results against the application's thresholds.
    CheckThresholds(InputArgs),
}

#[derive(clap::Args)]
struct InputArgs {
    /// Read the event from this file instead of stdin.
    #[arg(long)]
    input: Option<PathBuf>,
}

impl InputArgs {
    fn read(&self) -> anyhow::Result<String> {
        match &self.input {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("could not read {}", path.display())),
            None => {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text).context("could not read stdin")?;
                Ok(text)
            }
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = evalframe::Config::load(cli.config.as_deref()).context("could not load config")?;
    tracing::debug!(path = ?cli.config, "configuration loaded");
    let output = match &cli.command {
        Command::Transform(args) => evalframe::app::transform(&config, &args.read()?)?,
        Command::Evaluate(args) => evalframe::app::evaluate(&config, &args.read()?)?,
        Command::CheckThresholds(args) => evalframe::app::check_thresholds(&config, &args.read()?)?,
    };
    println!("{output}");
    Ok(())
}
