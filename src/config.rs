//! Default locations and per-command settings.

use std::path::PathBuf;

use crate::models::Status;

/// CSV read by `emp run` when no `--input` is given.
pub const DEFAULT_INPUT: &str = "employee_data.csv";
/// SQLite file shared by `emp run` and `emp query`.
pub const DEFAULT_DATABASE: &str = "employee_data.db";
/// Table the cleaned records are written to.
pub const DEFAULT_TABLE: &str = "employees";

/// Settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub database: PathBuf,
    pub table: String,
    /// Replace the table inside a single transaction
    pub atomic: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            input: PathBuf::from(DEFAULT_INPUT),
            database: PathBuf::from(DEFAULT_DATABASE),
            table: DEFAULT_TABLE.to_string(),
            atomic: false,
        }
    }
}

/// Settings for the query utility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    pub database: PathBuf,
    pub table: String,
    /// Status matched by the filtered query; any value is accepted
    pub status: String,
    pub json: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            database: PathBuf::from(DEFAULT_DATABASE),
            table: DEFAULT_TABLE.to_string(),
            status: Status::Active.as_str().to_string(),
            json: false,
        }
    }
}
