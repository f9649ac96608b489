pub mod cleaner;
pub mod cli;
pub mod cli_handlers;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod query;
pub mod store;

pub use error::{PipelineError, Result};
pub use models::*;
