use filter_builder::{BuildError, TranslateError};
use filter_engine::{AdapterError, ConfigError};
use filter_eval::EvalError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read input file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to deserialize input as JSON: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Invalid adapter configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to adapt filter: {0}")]
    Adapt(#[from] AdapterError),

    #[error("Failed to build filter: {0}")]
    Build(#[from] BuildError),

    #[error("Invalid record: {0}")]
    Record(#[from] EvalError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(serde_json::Error),
}

impl From<TranslateError> for CliError {
    fn from(err: TranslateError) -> Self {
        match err {
            TranslateError::Adapt(e) => CliError::Adapt(e),
            TranslateError::Build(e) => CliError::Build(e),
        }
    }
}
