use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{DEFAULT_DATABASE, DEFAULT_INPUT, DEFAULT_TABLE};

#[derive(Parser)]
#[command(name = "emp")]
#[command(about = "Employee CSV cleaning pipeline and query utility")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load, clean and save employee records
    Run {
        /// CSV file to ingest
        #[arg(long, default_value = DEFAULT_INPUT)]
        input: PathBuf,
        /// SQLite database to write
        #[arg(long, default_value = DEFAULT_DATABASE)]
        db: PathBuf,
        /// Destination table, replaced on every run
        #[arg(long, default_value = DEFAULT_TABLE)]
        table: String,
        /// Replace the table inside a single transaction
        #[arg(long)]
        atomic: bool,
    },

    /// Print the saved employee records
    Query {
        /// SQLite database to read
        #[arg(long, default_value = DEFAULT_DATABASE)]
        db: PathBuf,
        /// Table to read
        #[arg(long, default_value = DEFAULT_TABLE)]
        table: String,
        /// Status matched by the filtered query
        #[arg(long, default_value = "Active")]
        status: String,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
}
