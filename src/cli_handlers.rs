use serde_json::json;

use crate::config::{PipelineConfig, QueryConfig};
use crate::error::PipelineError;
use crate::models::{Table, Value};
use crate::output::{format_frame, format_row};
use crate::pipeline::{Pipeline, Step};
use crate::query;
use crate::store::Store;

/// Handle the run command
pub fn handle_run(config: PipelineConfig) -> Result<(), PipelineError> {
    let pipeline = Pipeline::new(config);

    pipeline.run_with(|step| match step {
        Step::Loaded(original) => {
            println!("Original Data:");
            println!("{}", format_frame(original));
        }
        Step::Cleaned(cleaned) => {
            println!();
            println!("Cleaned Data:");
            println!("{}", format_frame(cleaned));
        }
        Step::Saved(_) => {
            println!();
            println!("Data pipeline complete. Cleaned data saved to database.");
        }
    })?;

    Ok(())
}

/// Handle the query command
pub fn handle_query(config: QueryConfig) -> Result<(), PipelineError> {
    let store = Store::open_existing(&config.database)?;

    let all = query::all_employees(&store, &config.table)?;
    let filtered = query::employees_with_status(&store, &config.table, &config.status)?;
    let frame = query::employees_frame(&store, &config.table)?;

    if config.json {
        let as_table = |rows: Vec<Vec<Value>>| Table::with_rows(frame.columns.clone(), rows);
        let doc = json!({
            "all": as_table(all).to_records(),
            "status": config.status,
            "filtered": as_table(filtered).to_records(),
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("All Employees:");
    for row in &all {
        println!("{}", format_row(row));
    }

    println!();
    println!("{} Employees:", config.status);
    for row in &filtered {
        println!("{}", format_row(row));
    }

    println!();
    println!("Employees DataFrame:");
    println!("{}", format_frame(&frame));

    Ok(())
}
