use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::{self, check::CheckArgs, render::RenderArgs, schema::SchemaArgs};

#[derive(Parser, Debug)]
#[command(
    name = "greentic-form",
    about = "Inspect and dry-run declarative form schemas",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Engine config (TOML)
    #[arg(long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a schema file for structural errors and warnings
    Check(CheckArgs),
    /// Run one render pass and print the visible tree
    Render(RenderArgs),
    /// Print the JSON Schema of the field-schema format
    Schema(SchemaArgs),
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Check(args) => cmd::check::run(args),
        Commands::Render(args) => cmd::render::run(args, cli.config.as_deref()),
        Commands::Schema(args) => cmd::schema::run(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
