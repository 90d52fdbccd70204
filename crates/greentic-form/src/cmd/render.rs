use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use form_spec::{FormRead, MemoryStore};

use crate::config::EngineConfig;
use crate::engine::FormEngine;
use crate::render::{render_json, render_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    Text,
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Schema file (JSON array of field nodes)
    #[arg(value_name = "schema.json")]
    pub schema: PathBuf,
    /// Current form values layered over declared defaults
    #[arg(long = "values", value_name = "values.json")]
    pub values: Option<PathBuf>,
    #[arg(long, value_enum, default_value = "text")]
    pub format: RenderFormat,
    /// Also print the value tree after hide-transition clears
    #[arg(long = "show-values")]
    pub show_values: bool,
}

pub fn run(args: RenderArgs, config: Option<&Path>) -> Result<()> {
    let fields = super::load_schema(&args.schema)?;
    let config = match config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let mut store = MemoryStore::with_defaults(&fields);
    if let Some(path) = &args.values {
        store = store.with_values(super::load_values(path)?);
    }
    let mut engine = FormEngine::new(fields, config)
        .with_context(|| format!("schema {} cannot be rendered", args.schema.display()))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;
    let nodes = runtime.block_on(async {
        let mut nodes = engine.render(&mut store);
        while engine.settle_pending().await > 0 {
            nodes = engine.render(&mut store);
        }
        nodes
    });

    match args.format {
        RenderFormat::Text => println!("{}", render_text(&nodes)),
        RenderFormat::Json => println!("{}", serde_json::to_string_pretty(&render_json(&nodes)?)?),
    }
    if args.show_values {
        println!("{}", serde_json::to_string_pretty(store.values())?);
    }
    Ok(())
}
