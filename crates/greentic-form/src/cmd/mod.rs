#![cfg(feature = "cli")]

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use form_spec::FieldSchema;
use serde_json::Value;

pub mod check;
pub mod render;
pub mod schema;

pub(crate) fn load_schema(path: &Path) -> Result<Vec<FieldSchema>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read schema {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("schema {} is not a valid field list", path.display()))
}

pub(crate) fn load_values(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read values {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("values {} is not valid JSON", path.display()))
}
