use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::models::{ColumnType, NAME_COLUMN, SALARY_COLUMN, STATUS_COLUMN, Status, Table, Value};

/// Clean a loaded table.
///
/// Steps run in a fixed order: drop rows without a name, fill missing
/// salaries with the mean of the remaining ones, keep only known statuses.
/// The input table is left untouched.
pub fn clean(table: &Table) -> Result<Table> {
    table.require_column(NAME_COLUMN)?;
    table.require_column(SALARY_COLUMN)?;
    table.require_column(STATUS_COLUMN)?;

    let named = drop_missing_names(table)?;
    debug!(
        dropped = table.len() - named.len(),
        remaining = named.len(),
        "dropped rows without a name"
    );

    let imputed = impute_salary(&named)?;

    let cleaned = filter_status(&imputed)?;
    debug!(
        dropped = imputed.len() - cleaned.len(),
        remaining = cleaned.len(),
        "dropped rows with unknown status"
    );

    info!(input = table.len(), output = cleaned.len(), "cleaned table");
    Ok(cleaned)
}

/// Remove every row whose name is missing.
pub fn drop_missing_names(table: &Table) -> Result<Table> {
    let idx = table.require_column(NAME_COLUMN)?;
    Ok(table.filter_rows(|row| !row[idx].is_null()))
}

/// Mean of the present salaries.
pub fn mean_salary(table: &Table) -> Result<f64> {
    let idx = table.require_column(SALARY_COLUMN)?;

    // running mean: a plain sum overflows near f64::MAX
    let mut mean = 0.0;
    let mut count = 0usize;
    for value in table.column_values(idx) {
        let x = match value {
            Value::Null => continue,
            Value::Text(_) => {
                return Err(PipelineError::Computation(
                    "mean salary: salary column is not numeric".to_string(),
                ));
            }
            Value::Integer(i) => *i as f64,
            Value::Real(r) => *r,
        };
        count += 1;
        mean += (x - mean) / count as f64;
    }

    if count == 0 {
        let reason = if table.is_empty() {
            "no rows remain"
        } else {
            "every salary is missing"
        };
        return Err(PipelineError::Computation(format!("mean salary: {reason}")));
    }
    if !mean.is_finite() {
        return Err(PipelineError::Computation(
            "mean salary: result is not finite".to_string(),
        ));
    }
    Ok(mean)
}

/// Replace missing salaries with the mean of the present ones.
///
/// The mean must exist even when nothing is missing, so an empty table is
/// an error. A table with no missing salary is otherwise returned as is.
pub fn impute_salary(table: &Table) -> Result<Table> {
    let idx = table.require_column(SALARY_COLUMN)?;
    let mean = mean_salary(table)?;
    let missing = table.column_values(idx).filter(|v| v.is_null()).count();
    if missing == 0 {
        return Ok(table.clone());
    }

    debug!(mean, imputed = missing, "filled missing salaries");

    let mut out = table.clone();
    out.columns[idx].ty = ColumnType::Real;
    for row in &mut out.rows {
        row[idx] = match &row[idx] {
            Value::Null => Value::Real(mean),
            Value::Integer(i) => Value::Real(*i as f64),
            other => other.clone(),
        };
    }
    Ok(out)
}

/// Keep only rows whose status is exactly one of [`Status::ALL`].
pub fn filter_status(table: &Table) -> Result<Table> {
    let idx = table.require_column(STATUS_COLUMN)?;
    Ok(table.filter_rows(|row| {
        row[idx]
            .as_str()
            .is_some_and(|s| Status::try_from(s).is_ok())
    }))
}
