use clap::Parser;
use std::process;
use emp::cli::{Cli, Commands};
use emp::cli_handlers;
use emp::config::{PipelineConfig, QueryConfig};

fn main() {
    // Diagnostics go to stderr so stdout only carries results
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            input,
            db,
            table,
            atomic,
        } => cli_handlers::handle_run(PipelineConfig {
            input,
            database: db,
            table,
            atomic,
        }),
        Commands::Query {
            db,
            table,
            status,
            json,
        } => cli_handlers::handle_query(QueryConfig {
            database: db,
            table,
            status,
            json,
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
