use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{Connection, OpenFlags, Params, params};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::models::{Column, ColumnType, Table, Value};

/// Handle on the SQLite file the pipeline writes and the query utility reads
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create the database for writing
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Store { conn })
    }

    /// Open an existing database read-only
    pub fn open_existing<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PipelineError::StoreNotFound(path.to_path_buf()));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Store { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Store { conn })
    }

    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // ==================== Persistence ====================

    /// Replace the table `name` with the contents of `table`.
    ///
    /// The drop is committed before the new table is created and filled, so a
    /// failure while writing leaves no table behind.
    pub fn replace_table(&mut self, name: &str, table: &Table) -> Result<usize> {
        self.conn
            .execute(&format!("DROP TABLE IF EXISTS {}", quote_identifier(name)), [])?;

        let tx = self.conn.transaction()?;
        let inserted = create_and_fill(&tx, name, table)?;
        tx.commit()?;

        info!(table = name, rows = inserted, "replaced table");
        Ok(inserted)
    }

    /// Same as [`Store::replace_table`], but drop, create and insert share
    /// one transaction so the previous contents survive a failed write.
    pub fn replace_table_atomic(&mut self, name: &str, table: &Table) -> Result<usize> {
        let tx = self.conn.transaction()?;
        tx.execute(&format!("DROP TABLE IF EXISTS {}", quote_identifier(name)), [])?;
        let inserted = create_and_fill(&tx, name, table)?;
        tx.commit()?;

        info!(table = name, rows = inserted, "replaced table atomically");
        Ok(inserted)
    }

    // ==================== Reads ====================

    /// Declared columns of `name`, in table order
    pub fn table_schema(&self, name: &str) -> Result<Vec<Column>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")?;
        let columns = stmt.query_map([name], |row| {
            let col: String = row.get(0)?;
            let decl: String = row.get(1)?;
            Ok(Column::new(col, ColumnType::from_declared(&decl)))
        })?;
        let columns = columns.collect::<std::result::Result<Vec<_>, _>>()?;

        if columns.is_empty() {
            return Err(PipelineError::TableNotFound(name.to_string()));
        }
        Ok(columns)
    }

    /// Every row of `name`, in storage order
    pub fn select_all(&self, name: &str) -> Result<Table> {
        let columns = self.table_schema(name)?;
        let sql = format!("SELECT * FROM {}", quote_identifier(name));
        self.query_table(&sql, params![], columns)
    }

    /// Rows of `name` whose `column` equals `value`
    pub fn select_where(&self, name: &str, column: &str, value: &Value) -> Result<Table> {
        let columns = self.table_schema(name)?;
        if !columns.iter().any(|c| c.name == column) {
            return Err(PipelineError::MissingColumn(column.to_string()));
        }
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?1",
            quote_identifier(name),
            quote_identifier(column)
        );
        self.query_table(&sql, params![value], columns)
    }

    fn query_table<P: Params>(&self, sql: &str, params: P, columns: Vec<Column>) -> Result<Table> {
        debug!(sql, "running query");
        let width = columns.len();
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| {
            (0..width)
                .map(|i| row.get_ref(i).map(value_from_ref))
                .collect::<std::result::Result<Vec<_>, _>>()
        })?;
        let rows = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Table::with_rows(columns, rows))
    }
}

fn create_and_fill(conn: &Connection, name: &str, table: &Table) -> Result<usize> {
    let defs = table
        .columns
        .iter()
        .map(|c| format!("{} {}", quote_identifier(&c.name), c.ty.sql_type()))
        .collect::<Vec<_>>()
        .join(", ");
    conn.execute(
        &format!("CREATE TABLE {} ({defs})", quote_identifier(name)),
        [],
    )?;

    let placeholders = (1..=table.columns.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut stmt = conn.prepare(&format!(
        "INSERT INTO {} VALUES ({placeholders})",
        quote_identifier(name)
    ))?;

    for row in &table.rows {
        stmt.execute(rusqlite::params_from_iter(row.iter()))?;
    }
    Ok(table.rows.len())
}

/// Quote an SQL identifier, doubling embedded quotes
pub fn quote_identifier(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn value_from_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(r) => Value::Real(r),
        ValueRef::Text(t) | ValueRef::Blob(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Integer(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Value::Real(r) => ToSqlOutput::Owned(SqlValue::Real(*r)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn employees() -> Table {
        Table::with_rows(
            vec![
                Column::new("name", ColumnType::Text),
                Column::new("salary", ColumnType::Real),
                Column::new("status", ColumnType::Text),
            ],
            vec![
                vec!["A".into(), Value::Real(100.0), "Active".into()],
                vec!["B".into(), Value::Real(150.0), "Active".into()],
                vec!["C".into(), Value::Real(90.5), "Inactive".into()],
            ],
        )
    }

    #[test]
    fn test_replace_then_select_all() {
        let mut store = Store::open_in_memory().unwrap();
        let written = store.replace_table("employees", &employees()).unwrap();
        assert_eq!(written, 3);

        let read = store.select_all("employees").unwrap();
        assert_eq!(read, employees());
    }

    #[test]
    fn test_replace_discards_previous_contents() {
        let mut store = Store::open_in_memory().unwrap();
        store.replace_table("employees", &employees()).unwrap();

        let smaller = Table::with_rows(
            vec![Column::new("name", ColumnType::Text)],
            vec![vec!["Z".into()]],
        );
        store.replace_table("employees", &smaller).unwrap();

        let read = store.select_all("employees").unwrap();
        assert_eq!(read, smaller);
    }

    #[test]
    fn test_replace_is_idempotent() {
        let mut store = Store::open_in_memory().unwrap();
        store.replace_table("employees", &employees()).unwrap();
        store.replace_table("employees", &employees()).unwrap();
        assert_eq!(store.select_all("employees").unwrap().len(), 3);
    }

    #[test]
    fn test_atomic_replace_keeps_old_table_on_failure() {
        let mut store = Store::open_in_memory().unwrap();
        store.replace_table("employees", &employees()).unwrap();

        // duplicate column names make CREATE TABLE fail after the drop
        let broken = Table::new(vec![
            Column::new("name", ColumnType::Text),
            Column::new("name", ColumnType::Text),
        ]);
        assert!(store.replace_table_atomic("employees", &broken).is_err());
        assert_eq!(store.select_all("employees").unwrap().len(), 3);

        assert!(store.replace_table("employees", &broken).is_err());
        assert!(!store.table_exists("employees").unwrap());
    }

    #[test]
    fn test_nulls_round_trip() {
        let mut store = Store::open_in_memory().unwrap();
        let table = Table::with_rows(
            vec![
                Column::new("name", ColumnType::Text),
                Column::new("dept", ColumnType::Text),
                Column::new("age", ColumnType::Integer),
            ],
            vec![vec!["A".into(), Value::Null, Value::Integer(30)]],
        );
        store.replace_table("employees", &table).unwrap();
        assert_eq!(store.select_all("employees").unwrap(), table);
    }

    #[test]
    fn test_select_where() {
        let mut store = Store::open_in_memory().unwrap();
        store.replace_table("employees", &employees()).unwrap();

        let active = store
            .select_where("employees", "status", &"Active".into())
            .unwrap();
        assert_eq!(active.len(), 2);

        let none = store
            .select_where("employees", "status", &"Retired".into())
            .unwrap();
        assert!(none.is_empty());
        assert_eq!(none.columns.len(), 3);
    }

    #[test]
    fn test_missing_table() {
        let store = Store::open_in_memory().unwrap();
        assert!(matches!(
            store.select_all("employees"),
            Err(PipelineError::TableNotFound(t)) if t == "employees"
        ));
    }

    #[test]
    fn test_quoted_names() {
        let mut store = Store::open_in_memory().unwrap();
        let table = Table::with_rows(
            vec![Column::new("first \"nick\" name", ColumnType::Text)],
            vec![vec!["A".into()]],
        );
        store.replace_table("odd table", &table).unwrap();
        assert_eq!(store.select_all("odd table").unwrap(), table);
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_persisted_to_file() {
        let temp = NamedTempFile::new().unwrap();
        {
            let mut store = Store::open(temp.path()).unwrap();
            store.replace_table("employees", &employees()).unwrap();
        }
        let store = Store::open_existing(temp.path()).unwrap();
        assert_eq!(store.select_all("employees").unwrap(), employees());
    }

    #[test]
    fn test_open_existing_requires_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Store::open_existing(dir.path().join("nope.db")).err().unwrap();
        assert!(err.is_storage_error());
    }

    #[test]
    fn test_read_only_store_rejects_writes() {
        let temp = NamedTempFile::new().unwrap();
        Store::open(temp.path())
            .unwrap()
            .replace_table("employees", &employees())
            .unwrap();

        let mut store = Store::open_existing(temp.path()).unwrap();
        let err = store.replace_table("employees", &employees()).unwrap_err();
        assert!(err.is_storage_error());
    }
}
