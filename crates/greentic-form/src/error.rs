use form_spec::SchemaError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid form schema: {0}")]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no field at address '{0}'")]
    UnknownField(String),
    #[error("no tokio runtime is running on this thread")]
    NoRuntime,
}
