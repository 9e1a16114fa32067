//! Delimited text (CSV, TSV, custom delimiter).

use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::Result;
use crate::table::{Cell, Table};

pub(crate) fn read(path: &Path, delimiter: u8) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)?;

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut table = Table::new(columns);
    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(infer_cell).collect());
    }
    Ok(table)
}

pub(crate) fn write(path: &Path, table: &Table, delimiter: u8) -> Result<()> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(ToString::to_string))?;
    }
    writer.flush()?;
    Ok(())
}

/// Empty fields become [`Cell::Empty`], plain decimal numbers become
/// [`Cell::Number`], everything else stays text.
///
/// Numbers with leading zeros (`007`) stay text so codes keep their form.
pub(crate) fn infer_cell(field: &str) -> Cell {
    if field.is_empty() {
        return Cell::Empty;
    }
    if looks_numeric(field) {
        if let Ok(n) = field.parse::<f64>() {
            return Cell::Number(n);
        }
    }
    Cell::Text(field.to_string())
}

fn looks_numeric(field: &str) -> bool {
    let digits = field.strip_prefix('-').unwrap_or(field);
    let mut chars = digits.chars();
    match (chars.next(), chars.next()) {
        (Some('0'), Some(c)) if c.is_ascii_digit() => return false,
        (Some(c), _) if c.is_ascii_digit() => {}
        _ => return false,
    }
    digits.chars().all(|c| c.is_ascii_digit() || c == '.') && digits.matches('.').count() <= 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_cell() {
        assert_eq!(infer_cell(""), Cell::Empty);
        assert_eq!(infer_cell("12"), Cell::Number(12.0));
        assert_eq!(infer_cell("-0.25"), Cell::Number(-0.25));
        assert_eq!(infer_cell("0.5"), Cell::Number(0.5));
        assert_eq!(infer_cell("007"), Cell::from("007"));
        assert_eq!(infer_cell("inf"), Cell::from("inf"));
        assert_eq!(infer_cell("1.2.3"), Cell::from("1.2.3"));
        assert_eq!(infer_cell("82%"), Cell::from("82%"));
    }

    #[test]
    fn test_tsv_roundtrip_with_quotes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.tsv");
        let mut table = Table::new(["문항", "정답"]);
        table.push_row(vec!["1.\n철근\n2.\n\"콘크리트\"".into(), "철근".into()]);

        write(&path, &table, b'\t').unwrap();
        assert_eq!(read(&path, b'\t').unwrap(), table);
    }

    #[test]
    fn test_ragged_rows_padded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        std::fs::write(&path, "a,b,c\n1,2\n").unwrap();

        let table = read(&path, b',').unwrap();
        assert_eq!(
            table.rows()[0],
            vec![Cell::Number(1.0), Cell::Number(2.0), Cell::Empty]
        );
    }
}
