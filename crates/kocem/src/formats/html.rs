//! HTML tables.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use scraper::{ElementRef, Html, Node, Selector};

use crate::error::{Error, Result};
use crate::table::Table;

use super::delimited::infer_cell;

/// Read the `index`-th `<table>` in the document.
///
/// The first row made of `<th>` cells names the columns; without one the
/// first row is used. Remaining rows go through the same number inference as
/// delimited text.
pub(crate) fn read(path: &Path, index: usize) -> Result<Table> {
    let document = Html::parse_document(&fs::read_to_string(path)?);

    let element = document
        .select(&selector("table"))
        .nth(index)
        .ok_or_else(|| Error::SheetNotFound {
            path: path.to_path_buf(),
            sheet: format!("table {index}"),
        })?;

    let row_selector = selector("tr");
    let cell_selector = selector("th, td");
    let mut rows = element.select(&row_selector).map(|tr| {
        let cells: Vec<ElementRef<'_>> = tr.select(&cell_selector).collect();
        let is_header = !cells.is_empty() && cells.iter().all(|c| c.value().name() == "th");
        (is_header, cells.into_iter().map(cell_text).collect::<Vec<_>>())
    });

    let Some((_, first)) = rows.next() else {
        return Ok(Table::new(Vec::<String>::new()));
    };
    let mut table = Table::new(first);
    for (is_header, cells) in rows {
        // repeated header rows from multi-row <thead> blocks
        if is_header && cells.as_slice() == table.columns() {
            continue;
        }
        table.push_row(cells.iter().map(String::as_str).map(infer_cell).collect());
    }
    Ok(table)
}

pub(crate) fn write(path: &Path, table: &Table) -> Result<()> {
    fs::write(path, render(table))?;
    Ok(())
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid table selector")
}

/// Cell text with `<br>` turned back into newlines.
fn cell_text(cell: ElementRef<'_>) -> String {
    let mut text = String::new();
    for node in cell.descendants() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(e) if e.name() == "br" => text.push('\n'),
            _ => {}
        }
    }
    text.trim().to_string()
}

fn render(table: &Table) -> String {
    let mut html = String::from("<table border=\"1\" class=\"dataframe\">\n  <thead>\n    <tr>\n");
    for column in table.columns() {
        let _ = writeln!(html, "      <th>{}</th>", escape(column));
    }
    html.push_str("    </tr>\n  </thead>\n  <tbody>\n");
    for row in table.rows() {
        html.push_str("    <tr>\n");
        for cell in row {
            let _ = writeln!(html, "      <td>{}</td>", escape(&cell.to_string()));
        }
        html.push_str("    </tr>\n");
    }
    html.push_str("  </tbody>\n</table>\n");
    html
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("<br>"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    #[test]
    fn test_render_escapes() {
        let mut table = Table::new(["Explanation"]);
        table.push_row(vec!["<문제 해설>\nA & B".into()]);

        let html = render(&table);
        assert!(html.contains("<th>Explanation</th>"));
        assert!(html.contains("<td>&lt;문제 해설&gt;<br>A &amp; B</td>"));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiz.html");

        let mut table = Table::new(["Question", "Explanation", "Human Accuracy"]);
        table.push_row(vec![
            "거푸집 존치기간은?".into(),
            "<문제 해설>\nA & B".into(),
            Cell::Number(0.82),
        ]);
        table.push_row(vec!["동바리 설치 기준은?".into(), Cell::Empty, Cell::Number(1.0)]);

        write(&path, &table).unwrap();
        assert_eq!(read(&path, 0).unwrap(), table);
    }

    #[test]
    fn test_read_selects_table_by_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        fs::write(
            &path,
            "<html><body>\
             <table><tr><th>메뉴</th></tr><tr><td>홈</td></tr></table>\
             <table>\
               <thead><tr><th>단어</th><th>번호</th></tr></thead>\
               <tbody><tr><td>거푸집</td><td>007</td></tr><tr><td>각목</td><td>12</td></tr></tbody>\
             </table>\
             </body></html>",
        )
        .unwrap();

        let table = read(&path, 1).unwrap();
        assert_eq!(table.columns(), ["단어", "번호"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0][1], Cell::from("007"));
        assert_eq!(table.rows()[1][1], Cell::Number(12.0));

        let err = read(&path, 2).unwrap_err();
        assert!(matches!(err, Error::SheetNotFound { .. }));
    }

    #[test]
    fn test_read_without_header_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.html");
        fs::write(
            &path,
            "<table><tr><td>문제</td><td>정답</td></tr><tr><td>가꾸목</td><td>각목</td></tr></table>",
        )
        .unwrap();

        let table = read(&path, 0).unwrap();
        assert_eq!(table.columns(), ["문제", "정답"]);
        assert_eq!(table.rows()[0][1], Cell::from("각목"));
    }
}
