//! Spreadsheet reading (calamine) and writing (`rust_xlsxwriter`).

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Workbook;

use crate::error::{Error, Result};
use crate::table::{Cell, Table};

/// Name of the sheet written to new workbooks.
pub(crate) const SHEET_NAME: &str = "Sheet1";

/// Read one sheet. The first row is the header.
pub(crate) fn read(path: &Path, sheet: Option<&str>) -> Result<Table> {
    let mut workbook = open_workbook_auto(path).map_err(|e| Error::workbook(path, e))?;
    let sheet_names = workbook.sheet_names();

    let sheet = match sheet {
        Some(name) if sheet_names.iter().any(|s| s == name) => name.to_string(),
        Some(name) => {
            return Err(Error::SheetNotFound {
                path: path.to_path_buf(),
                sheet: name.to_string(),
            })
        }
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| Error::workbook(path, "workbook has no sheets"))?,
    };

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| Error::workbook(path, e))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, data)| match data.to_string().trim() {
            "" => format!("Unnamed: {idx}"),
            name => name.to_string(),
        })
        .collect();

    let mut table = Table::new(columns);
    for row in rows {
        let cells: Vec<Cell> = row.iter().map(cell_from_data).collect();
        if cells.iter().all(Cell::is_blank) {
            continue;
        }
        table.push_row(cells);
    }
    Ok(table)
}

#[allow(clippy::cast_precision_loss)]
fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        other => Cell::Text(other.to_string()),
    }
}

/// Write the table to a single-sheet `.xlsx` workbook.
pub(crate) fn write(path: &Path, table: &Table) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in table.columns().iter().enumerate() {
        worksheet.write_string(0, column_number(col)?, name)?;
    }

    for (idx, row) in table.rows().iter().enumerate() {
        let row_number = u32::try_from(idx + 1)
            .map_err(|_| Error::internal("too many rows for an xlsx sheet"))?;
        for (col, cell) in row.iter().enumerate() {
            let col = column_number(col)?;
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    worksheet.write_string(row_number, col, s)?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(row_number, col, *n)?;
                }
                Cell::Bool(b) => {
                    worksheet.write_boolean(row_number, col, *b)?;
                }
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn column_number(col: usize) -> Result<u16> {
    u16::try_from(col).map_err(|_| Error::internal("too many columns for an xlsx sheet"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_two_sheets(path: &Path) {
        let mut workbook = Workbook::new();
        let first = workbook.add_worksheet();
        first.set_name("용어").unwrap();
        first.write_string(0, 0, "외래어").unwrap();
        first.write_string(0, 1, "우리말").unwrap();
        first.write_string(1, 0, "가꾸목").unwrap();
        first.write_string(1, 1, "각목").unwrap();

        let second = workbook.add_worksheet();
        second.set_name("Sheet2").unwrap();
        second.write_string(0, 0, "번호").unwrap();
        second.write_number(1, 0, 3).unwrap();
        workbook.save(path).unwrap();
    }

    #[test]
    fn test_read_first_sheet_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.xlsx");
        write_two_sheets(&path);

        let table = read(&path, None).unwrap();
        assert_eq!(table.columns(), &["외래어", "우리말"]);
        assert_eq!(table.rows()[0][1], Cell::from("각목"));
    }

    #[test]
    fn test_read_named_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.xlsx");
        write_two_sheets(&path);

        let table = read(&path, Some("Sheet2")).unwrap();
        assert_eq!(table.columns(), &["번호"]);
        assert_eq!(table.rows()[0][0], Cell::Number(3.0));
    }

    #[test]
    fn test_read_missing_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.xlsx");
        write_two_sheets(&path);

        let err = read(&path, Some("없음")).unwrap_err();
        assert!(matches!(err, Error::SheetNotFound { .. }));
    }

    #[test]
    fn test_read_not_a_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.xlsx");
        std::fs::write(&path, "plain text").unwrap();

        let err = read(&path, None).unwrap_err();
        assert!(matches!(err, Error::Workbook { .. }));
    }

    #[test]
    fn test_unnamed_header_and_blank_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.xlsx");
        let mut table = Table::new(["a", ""]);
        table.push_row(vec!["1".into(), "2".into()]);
        table.push_row(vec![Cell::Empty, Cell::Empty]);
        table.push_row(vec!["3".into(), Cell::Bool(true)]);
        write(&path, &table).unwrap();

        let read_back = read(&path, None).unwrap();
        assert_eq!(read_back.columns(), &["a", "Unnamed: 1"]);
        assert_eq!(read_back.len(), 2);
        assert_eq!(read_back.rows()[1][1], Cell::Bool(true));
    }
}
