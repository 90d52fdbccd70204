use anyhow::Result;
use clap::Args;
use form_spec::FieldSchema;

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    /// Print a single compact line
    #[arg(long)]
    pub compact: bool,
}

pub fn run(args: SchemaArgs) -> Result<()> {
    let schema = schemars::schema_for!(Vec<FieldSchema>);
    let out = if args.compact {
        serde_json::to_string(&schema)?
    } else {
        serde_json::to_string_pretty(&schema)?
    };
    println!("{out}");
    Ok(())
}
