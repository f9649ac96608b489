//! Fixed read queries against the persisted employee table.

use tracing::info;

use crate::error::Result;
use crate::models::{STATUS_COLUMN, Table, Value};
use crate::store::Store;

/// Every record, in storage order.
pub fn all_employees(store: &Store, table: &str) -> Result<Vec<Vec<Value>>> {
    let rows = store.select_all(table)?.rows;
    info!(table, rows = rows.len(), "selected all employees");
    Ok(rows)
}

/// Records whose status equals `status`. An unknown status matches nothing.
pub fn employees_with_status(store: &Store, table: &str, status: &str) -> Result<Vec<Vec<Value>>> {
    let rows = store
        .select_where(table, STATUS_COLUMN, &Value::from(status))?
        .rows;
    info!(table, status, rows = rows.len(), "selected employees by status");
    Ok(rows)
}

/// The whole table, with its declared column types.
pub fn employees_frame(store: &Store, table: &str) -> Result<Table> {
    store.select_all(table)
}
