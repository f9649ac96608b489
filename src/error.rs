use std::path::PathBuf;
use thiserror::Error;

/// All possible errors in the pipeline and query utility
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Input file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required column `{0}` is missing")]
    MissingColumn(String),

    #[error("Cannot compute {0}")]
    Computation(String),

    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Database not found: {}. Run `emp run` first.", .0.display())]
    StoreNotFound(PathBuf),

    #[error("Table `{0}` does not exist. Run `emp run` first.")]
    TableNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// True for failures raised while opening, writing or reading the store
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            PipelineError::Storage(_)
                | PipelineError::StoreNotFound(_)
                | PipelineError::TableNotFound(_)
        )
    }

    /// True for failures raised while reading the input file
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            PipelineError::FileNotFound(_) | PipelineError::Parse { .. } | PipelineError::Csv(_)
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PipelineError>;
