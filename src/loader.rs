//! CSV ingestion with per-column type inference.

use csv::ReaderBuilder;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::models::{Column, ColumnType, Table, Value};

/// Field contents read as a missing value. Matched exactly, so `" NA"` is text.
const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Load a CSV file whose first row is the header.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => PipelineError::FileNotFound(path.to_path_buf()),
        _ => PipelineError::Io(e),
    })?;
    let table = load_csv_from_reader(file)?;
    debug!(
        path = %path.display(),
        rows = table.len(),
        columns = table.columns.len(),
        "loaded csv"
    );
    Ok(table)
}

/// Load CSV data from any reader.
pub fn load_csv_from_reader<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = dedupe_headers(rdr.headers()?.iter().map(str::to_string).collect());
    if headers.is_empty() {
        return Err(PipelineError::Parse {
            line: 1,
            message: "no columns to parse from file".to_string(),
        });
    }

    let mut raw: Vec<Vec<Option<String>>> = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        if record.len() > headers.len() {
            return Err(PipelineError::Parse {
                line,
                message: format!(
                    "expected {} fields, saw {}",
                    headers.len(),
                    record.len()
                ),
            });
        }
        let mut row: Vec<Option<String>> = record.iter().map(parse_field).collect();
        row.resize(headers.len(), None);
        raw.push(row);
    }

    let types: Vec<ColumnType> = (0..headers.len())
        .map(|idx| infer_type(raw.iter().map(|row| row[idx].as_deref())))
        .collect();

    let rows = raw
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&types)
                .map(|(field, ty)| convert(field, *ty))
                .collect()
        })
        .collect();

    let columns = headers
        .into_iter()
        .zip(types)
        .map(|(name, ty)| Column::new(name, ty))
        .collect();

    Ok(Table::with_rows(columns, rows))
}

/// Rename repeated header names to `<name>.<n>`, skipping names already taken.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = headers.iter().cloned().collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    headers
        .into_iter()
        .map(|name| {
            if seen.insert(name.clone()) {
                return name;
            }
            let n = counts.entry(name.clone()).or_insert(0);
            let renamed = loop {
                *n += 1;
                let candidate = format!("{name}.{n}");
                if !taken.contains(&candidate) {
                    break candidate;
                }
            };
            taken.insert(renamed.clone());
            seen.insert(renamed.clone());
            renamed
        })
        .collect()
}

fn parse_field(field: &str) -> Option<String> {
    if MISSING_MARKERS.contains(&field) {
        None
    } else {
        Some(field.to_string())
    }
}

/// Infer a column's type from its present values.
///
/// Integer columns with gaps become `Real`; a column with no values is `Text`.
fn infer_type<'a, I>(values: I) -> ColumnType
where
    I: Iterator<Item = Option<&'a str>>,
{
    let mut all_int = true;
    let mut all_real = true;
    let mut has_missing = false;
    let mut has_value = false;

    for value in values {
        match value {
            None => has_missing = true,
            Some(v) => {
                has_value = true;
                let v = v.trim();
                if all_int && v.parse::<i64>().is_err() {
                    all_int = false;
                }
                if all_real && v.parse::<f64>().is_err() {
                    all_real = false;
                }
            }
        }
        if !all_int && !all_real {
            return ColumnType::Text;
        }
    }

    match (has_value, all_int, all_real) {
        (false, _, _) => ColumnType::Text,
        (true, true, _) if !has_missing => ColumnType::Integer,
        (true, _, true) => ColumnType::Real,
        _ => ColumnType::Text,
    }
}

fn convert(field: Option<String>, ty: ColumnType) -> Value {
    let Some(field) = field else {
        return Value::Null;
    };
    match ty {
        // inference guarantees these parse
        ColumnType::Integer => field
            .trim()
            .parse()
            .map_or(Value::Null, Value::Integer),
        ColumnType::Real => field.trim().parse().map_or(Value::Null, Value::Real),
        ColumnType::Text => Value::Text(field),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn load(data: &str) -> Result<Table> {
        load_csv_from_reader(data.as_bytes())
    }

    #[test]
    fn test_header_and_types() {
        let t = load("name,salary,status,age\nA,100,Active,30\nB,250.5,Inactive,41\n").unwrap();
        assert_eq!(t.column_names(), vec!["name", "salary", "status", "age"]);
        assert_eq!(t.columns[0].ty, ColumnType::Text);
        assert_eq!(t.columns[1].ty, ColumnType::Real);
        assert_eq!(t.columns[3].ty, ColumnType::Integer);
        assert_eq!(t.rows[0][1], Value::Real(100.0));
        assert_eq!(t.rows[1][3], Value::Integer(41));
    }

    #[test]
    fn test_integer_column_with_gaps_is_real() {
        let t = load("name,salary\nA,100\nB,\nC,200\n").unwrap();
        assert_eq!(t.columns[1].ty, ColumnType::Real);
        assert_eq!(t.rows[0][1], Value::Real(100.0));
        assert_eq!(t.rows[1][1], Value::Null);
    }

    #[test]
    fn test_missing_markers() {
        let t = load("name,status\nNA,Active\n,Inactive\nnull,Active\nZed,N/A\n").unwrap();
        assert!(t.rows[0][0].is_null());
        assert!(t.rows[1][0].is_null());
        assert!(t.rows[2][0].is_null());
        assert_eq!(t.rows[3][0], Value::Text("Zed".into()));
        assert!(t.rows[3][1].is_null());
    }

    #[test]
    fn test_padded_markers_are_text() {
        let t = load("name,status\n NA,Active\n ,Active\n").unwrap();
        assert_eq!(t.rows[0][0], Value::Text(" NA".into()));
        assert_eq!(t.rows[1][0], Value::Text(" ".into()));
    }

    #[test]
    fn test_duplicate_headers_are_renamed() {
        let t = load("name,salary,status,salary,salary\nA,100,Active,1,2\n").unwrap();
        assert_eq!(
            t.column_names(),
            vec!["name", "salary", "status", "salary.1", "salary.2"]
        );
        assert_eq!(t.rows[0][3], Value::Integer(1));
    }

    #[test]
    fn test_renamed_header_skips_existing_name() {
        let t = load("a,a,a.1\n1,2,3\n").unwrap();
        assert_eq!(t.column_names(), vec!["a", "a.2", "a.1"]);
    }

    #[test]
    fn test_empty_column_is_text() {
        let t = load("name,notes\nA,\nB,\n").unwrap();
        assert_eq!(t.columns[1].ty, ColumnType::Text);
        assert!(t.rows.iter().all(|r| r[1].is_null()));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let t = load("name,salary,status\nA,100\n").unwrap();
        assert_eq!(t.rows[0].len(), 3);
        assert!(t.rows[0][2].is_null());
    }

    #[test]
    fn test_long_rows_are_rejected() {
        let err = load("name,salary\nA,100,extra\n").unwrap_err();
        assert!(matches!(err, PipelineError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_empty_input_is_parse_error() {
        let err = load("").unwrap_err();
        assert!(err.is_load_error());
    }

    #[test]
    fn test_quoted_fields() {
        let t = load("name,status\n\"Doe, Jane\",Active\n").unwrap();
        assert_eq!(t.rows[0][0], Value::Text("Doe, Jane".into()));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "name,salary,status").unwrap();
        writeln!(file, "A,100,Active").unwrap();
        let t = load_csv(file.path()).unwrap();
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let err = load_csv("definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
    }

    #[test]
    fn test_invalid_utf8_is_load_error() {
        let bytes: &[u8] = b"name,status\n\xff\xfe,Active\n";
        let err = load_csv_from_reader(bytes).unwrap_err();
        assert!(err.is_load_error());
    }
}
