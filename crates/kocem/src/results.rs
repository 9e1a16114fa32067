//! Parsing evaluation-harness results logs.
//!
//! The harness prints a run header followed by a markdown table:
//!
//! ```text
//! openai-completions (model=davinci-002), gen_kwargs: (None), limit: None, num_fewshot: None, batch_size: 1
//! |        Tasks        |Version|Filter|n-shot| Metric |   |Value |   |Stderr|
//! |---------------------|------:|------|-----:|--------|---|-----:|---|-----:|
//! |kocem_industry_jargon|      1|none  |     0|acc     |↑  |0.2116|±  |0.0159|
//! |                     |       |none  |     0|acc_norm|↑  |0.2116|±  |0.0159|
//! ```
//!
//! Rows with a blank task continue the task above them.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::table::{Cell, Table};

/// Number of cells in a results row.
const ROW_CELLS: usize = 9;

/// Column headers that start a results table.
const TABLE_HEADERS: [&str; 2] = ["Tasks", "Groups"];

fn header_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\S+) \(([^)]*=[^)]*)\), (gen_kwargs: .*)$").expect("valid header pattern")
    })
}

fn header_setting() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\w+): (\([^)]*\)|[^,]*)").expect("valid header pattern"))
}

/// The run header: model type, model arguments and run settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunHeader {
    /// Model backend, e.g. `openai-completions`.
    pub model_type: String,
    /// `key=value` model arguments in order.
    pub model_args: Vec<(String, String)>,
    /// `key: value` run settings in order.
    pub settings: Vec<(String, String)>,
}

impl RunHeader {
    /// Parse a header line of the form
    /// `model_type (key=value, …), gen_kwargs: …, key: value`.
    ///
    /// Returns `None` for any other line, including log lines that merely
    /// mention `gen_kwargs`.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let caps = header_line().captures(line.trim())?;
        let (model_type, args, rest) = (&caps[1], &caps[2], &caps[3]);

        let model_args = args
            .split(',')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();

        let settings = header_setting()
            .captures_iter(rest)
            .map(|c| (c[1].to_string(), c[2].trim().to_string()))
            .collect();

        Some(Self {
            model_type: model_type.to_string(),
            model_args,
            settings,
        })
    }

    /// The `model` argument, if present.
    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.model_arg("model")
    }

    /// A model argument by key.
    #[must_use]
    pub fn model_arg(&self, key: &str) -> Option<&str> {
        self.model_args
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// A run setting by key.
    #[must_use]
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Whether a larger metric value is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// `↑`
    HigherIsBetter,
    /// `↓`
    LowerIsBetter,
    /// No arrow.
    #[default]
    None,
}

impl Direction {
    fn parse(cell: &str) -> Self {
        match cell.trim() {
            "↑" => Self::HigherIsBetter,
            "↓" => Self::LowerIsBetter,
            _ => Self::None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HigherIsBetter => write!(f, "↑"),
            Self::LowerIsBetter => write!(f, "↓"),
            Self::None => Ok(()),
        }
    }
}

/// One metric of one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    /// Task name.
    pub task: String,
    /// Task version.
    pub version: String,
    /// Filter applied to responses.
    pub filter: String,
    /// Number of few-shot examples.
    pub n_shot: Option<u32>,
    /// Metric name, e.g. `acc`.
    pub metric: String,
    /// Better direction.
    pub direction: Direction,
    /// Metric value.
    pub value: f64,
    /// Standard error, if reported.
    pub stderr: Option<f64>,
}

/// A parsed results log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    /// Run header, if the log had one.
    pub header: Option<RunHeader>,
    /// Metric rows in log order.
    pub rows: Vec<MetricRow>,
}

impl EvalReport {
    /// Look up a metric.
    #[must_use]
    pub fn metric(&self, task: &str, metric: &str) -> Option<&MetricRow> {
        self.rows
            .iter()
            .find(|r| r.task == task && r.metric == metric)
    }

    /// Distinct task names in log order.
    #[must_use]
    pub fn tasks(&self) -> Vec<&str> {
        let mut tasks: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !tasks.contains(&row.task.as_str()) {
                tasks.push(&row.task);
            }
        }
        tasks
    }

    /// The report as a table, one row per metric.
    #[must_use]
    pub fn to_table(&self) -> Table {
        let model = self
            .header
            .as_ref()
            .and_then(RunHeader::model)
            .map_or(Cell::Empty, Cell::from);

        let mut table = Table::new([
            "Model", "Task", "Version", "Filter", "n-shot", "Metric", "Direction", "Value",
            "Stderr",
        ]);
        for row in &self.rows {
            table.push_row(vec![
                model.clone(),
                row.task.clone().into(),
                row.version.clone().into(),
                row.filter.clone().into(),
                row.n_shot.map_or(Cell::Empty, |n| Cell::Number(f64::from(n))),
                row.metric.clone().into(),
                row.direction.to_string().into(),
                row.value.into(),
                row.stderr.map_or(Cell::Empty, Cell::Number),
            ]);
        }
        table
    }
}

/// Parse a results log.
///
/// The first non-table line shaped like a run header becomes the header;
/// other log lines are ignored.
///
/// # Errors
///
/// Returns [`Error::ResultsParse`] if a table row is malformed or the log
/// has no metric rows.
pub fn parse(text: &str) -> Result<EvalReport> {
    let mut report = EvalReport::default();
    let mut current: Option<(String, String)> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if !trimmed.starts_with('|') {
            if report.header.is_none() {
                report.header = RunHeader::parse(trimmed);
            }
            continue;
        }

        let cells = split_row(trimmed);
        if is_separator(&cells) || TABLE_HEADERS.contains(&cells[0]) {
            current = None;
            continue;
        }
        if cells.len() != ROW_CELLS {
            return Err(Error::results_parse(
                line_no,
                format!("expected {ROW_CELLS} columns, found {}", cells.len()),
            ));
        }

        let task_cell = cells[0].trim_start_matches("- ").trim();
        if !task_cell.is_empty() {
            current = Some((task_cell.to_string(), cells[1].to_string()));
        }
        let Some((task, version)) = current.clone() else {
            return Err(Error::results_parse(line_no, "row has no task"));
        };

        report.rows.push(MetricRow {
            task,
            version,
            filter: cells[2].to_string(),
            n_shot: cells[3].parse().ok(),
            metric: cells[4].to_string(),
            direction: Direction::parse(cells[5]),
            value: parse_number(cells[6], line_no, "value")?
                .ok_or_else(|| Error::results_parse(line_no, "missing value"))?,
            stderr: parse_number(cells[8], line_no, "stderr")?,
        });
    }

    if report.rows.is_empty() {
        return Err(Error::results_parse(0, "no results table found"));
    }
    debug!(
        "Parsed {} metrics for {} tasks",
        report.rows.len(),
        report.tasks().len()
    );
    Ok(report)
}

fn split_row(line: &str) -> Vec<&str> {
    let inner = line.strip_prefix('|').unwrap_or(line);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(str::trim).collect()
}

fn is_separator(cells: &[&str]) -> bool {
    cells
        .iter()
        .all(|c| !c.is_empty() && c.chars().all(|ch| matches!(ch, '-' | ':')))
}

fn parse_number(cell: &str, line: usize, what: &str) -> Result<Option<f64>> {
    match cell {
        "" | "N/A" => Ok(None),
        _ => cell
            .parse()
            .map(Some)
            .map_err(|_| Error::results_parse(line, format!("invalid {what} '{cell}'"))),
    }
}
