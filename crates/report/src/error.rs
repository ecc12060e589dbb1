use thiserror::Error;

use apiwatch_athena::AthenaError;
use apiwatch_core::ConfigError;
use apiwatch_storage::StorageError;

use crate::rows::RowError;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("athena error: {0}")]
    Athena(#[from] AthenaError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("result parse error: {0}")]
    Rows(#[from] RowError),

    #[error("template rendering failed: {0}")]
    Template(String),
}
