use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// 行号从 1 开始（不含表头）
    #[error("invalid row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("duplicate location id {0}")]
    DuplicateId(u64),

    #[error("invalid location: {0}")]
    InvalidLocation(String),

    #[error("invalid config {path:?}: {reason}")]
    Config { path: PathBuf, reason: String },
}
