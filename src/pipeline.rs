use std::path::Path;
use tracing::info;

use crate::cleaner;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::loader;
use crate::models::Table;
use crate::store::Store;

/// Outcome of a full pipeline run
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub original: Table,
    pub cleaned: Table,
    pub persisted: usize,
}

/// A completed step, reported to the caller of [`Pipeline::run_with`]
#[derive(Debug, Clone, Copy)]
pub enum Step<'a> {
    Loaded(&'a Table),
    Cleaned(&'a Table),
    Saved(usize),
}

/// Load, clean and persist employee records
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Pipeline { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Step 1: read the input CSV
    pub fn load(&self) -> Result<Table> {
        let table = loader::load_csv(&self.config.input)?;
        info!(
            input = %self.config.input.display(),
            rows = table.len(),
            "loaded input"
        );
        Ok(table)
    }

    /// Step 2: clean the loaded records
    pub fn clean(&self, table: &Table) -> Result<Table> {
        cleaner::clean(table)
    }

    /// Step 3: replace the destination table with `table`
    pub fn save(&self, table: &Table) -> Result<usize> {
        save_to_db(
            table,
            &self.config.database,
            &self.config.table,
            self.config.atomic,
        )
    }

    /// Run every step in order
    pub fn run(&self) -> Result<PipelineRun> {
        self.run_with(|_| {})
    }

    /// Run every step in order, calling `on_step` as each one finishes.
    ///
    /// Steps already reported stay reported when a later step fails.
    pub fn run_with<F>(&self, mut on_step: F) -> Result<PipelineRun>
    where
        F: FnMut(Step<'_>),
    {
        let original = self.load()?;
        on_step(Step::Loaded(&original));

        let cleaned = self.clean(&original)?;
        on_step(Step::Cleaned(&cleaned));

        let persisted = self.save(&cleaned)?;
        on_step(Step::Saved(persisted));

        Ok(PipelineRun {
            original,
            cleaned,
            persisted,
        })
    }
}

/// Write `table` to `database`, replacing any table called `name`.
///
/// The connection is closed before returning, on success or failure.
pub fn save_to_db(table: &Table, database: &Path, name: &str, atomic: bool) -> Result<usize> {
    let mut store = Store::open(database)?;
    let written = if atomic {
        store.replace_table_atomic(name, table)?
    } else {
        store.replace_table(name, table)?
    };
    info!(database = %database.display(), table = name, rows = written, "saved cleaned data");
    Ok(written)
}
