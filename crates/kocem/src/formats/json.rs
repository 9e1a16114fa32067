//! JSON and JSON lines.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::table::{Cell, Record, Table};

/// Read an array of objects, or one object per line.
pub(crate) fn read(path: &Path) -> Result<Table> {
    let text = fs::read_to_string(path)?;
    let objects: Vec<Map<String, Value>> = if text.trim_start().starts_with('[') {
        serde_json::from_str(&text)?
    } else {
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect::<std::result::Result<_, _>>()?
    };

    let records: Vec<Record> = objects
        .into_iter()
        .map(|object| {
            object
                .into_iter()
                .map(|(name, value)| (name, Cell::from_json(&value)))
                .collect()
        })
        .collect();
    Ok(Table::from_records(records))
}

/// Write records as JSON lines or as a pretty-printed array.
///
/// Non-ASCII text is written as-is.
pub(crate) fn write(path: &Path, table: &Table, lines: bool) -> Result<()> {
    let objects: Vec<Value> = table.records().into_iter().map(record_to_value).collect();
    let mut out = BufWriter::new(fs::File::create(path)?);

    if lines {
        for object in &objects {
            serde_json::to_writer(&mut out, object)?;
            out.write_all(b"\n")?;
        }
    } else {
        serde_json::to_writer_pretty(&mut out, &objects)?;
        out.write_all(b"\n")?;
    }
    out.flush().map_err(Error::from)
}

fn record_to_value(record: Record) -> Value {
    Value::Object(
        record
            .into_iter()
            .map(|(name, cell)| (name, cell.to_json()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(["question", "answer"]);
        table.push_row(vec!["가꾸목의 순화어로 알맞은 것은?".into(), "각목".into()]);
        table.push_row(vec!["시마이의 순화어로 알맞은 것은?".into(), Cell::Empty]);
        table
    }

    #[test]
    fn test_lines_keep_korean_unescaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.json");
        write(&path, &sample(), true).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("각목"));
        assert!(text.contains("\"answer\":null"));
    }

    #[test]
    fn test_array_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.json");
        write(&path, &sample(), false).unwrap();

        assert!(fs::read_to_string(&path).unwrap().starts_with('['));
        assert_eq!(read(&path).unwrap(), sample());
    }

    #[test]
    fn test_read_lines_with_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.jsonl");
        fs::write(&path, "{\"a\":1}\n\n{\"a\":2,\"b\":\"x\"}\n").unwrap();

        let table = read(&path).unwrap();
        assert_eq!(table.columns(), &["a", "b"]);
        assert_eq!(table.rows()[1], vec![Cell::Number(2.0), Cell::from("x")]);
    }

    #[test]
    fn test_read_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(read(&path).unwrap_err(), Error::Json(_)));
    }
}
