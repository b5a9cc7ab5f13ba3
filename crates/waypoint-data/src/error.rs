use polars::prelude::PolarsError;
use thiserror::Error;
pub type Result<T> = std::result::Result<T, DataError>;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("Required catalog file not found: {0}")]
    RequiredFileNotFound(std::path::PathBuf),
    #[error("Catalog table '{table}' is missing column '{column}'")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
}
