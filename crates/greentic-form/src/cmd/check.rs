use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use form_spec::check_schema;

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Schema file (JSON array of field nodes)
    #[arg(value_name = "schema.json")]
    pub schema: PathBuf,
    /// Emit the report as JSON
    #[arg(long)]
    pub json: bool,
    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let fields = super::load_schema(&args.schema)?;
    let report = check_schema(&fields)
        .with_context(|| format!("schema {} failed checks", args.schema.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{} field(s):", report.addresses.len());
        for address in &report.addresses {
            println!("  {address}");
        }
        for warning in &report.warnings {
            println!("warning: {warning}");
        }
    }

    if args.strict && !report.warnings.is_empty() {
        bail!(
            "{} warning(s) treated as errors (--strict)",
            report.warnings.len()
        );
    }
    Ok(())
}
