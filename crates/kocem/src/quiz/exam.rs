//! Cleaning helpers for scraped exam records.

use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDate;
use regex::Regex;

use crate::error::{Error, Result};

/// Site text appended to options when no explanation has been written yet.
const MISSING_EXPLANATION_NOTICE: &str = "해설이 아직 작성되지 않았습니다.해설을 알고 계시다면 오른쪽 해설추가 기능을 이용하여 해설을 작성하여 다른분들과 함께 해설을 나누었으면 합니다.로그인 후 오류 신고 및 해설 작성 하시면 포인트가 제공됩니다.[포인트 모으기 및 사용법]";

/// Trailing link text that leaks into answers.
const POINTS_MARKER: &str = "[포인트 모으기 및 사용법]";

/// Heading prefixed to explanations.
const EXPLANATION_MARKER: &str = "<문제 해설>";

/// Numbered prefixes stripped from answers.
const ANSWER_PREFIXES: [&str; 4] = ["1. ", "2. ", "3. ", "4. "];

fn option_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+\.\n").expect("valid option separator"))
}

fn decimal_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid number pattern"))
}

/// Split an options block (`1.\n철근\n2.\n콘크리트`) into trimmed options.
#[must_use]
pub fn split_options(block: &str) -> Vec<String> {
    let cleaned = block.replace(MISSING_EXPLANATION_NOTICE, "");
    option_separator()
        .split(&cleaned)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Strip numbering and site text from an answer and lowercase it.
#[must_use]
pub fn normalize_answer(raw: &str) -> String {
    let mut answer = raw.to_string();
    for prefix in ANSWER_PREFIXES {
        answer = answer.replace(prefix, "");
    }
    answer.replace(POINTS_MARKER, "").trim().to_lowercase()
}

/// Remove the explanation heading and surrounding whitespace.
#[must_use]
pub fn clean_explanation(raw: &str) -> String {
    raw.replace(EXPLANATION_MARKER, "").trim().to_string()
}

/// First number in a percentage text as a fraction: `"82%"` → `0.82`.
#[must_use]
pub fn human_accuracy(text: &str) -> Option<f64> {
    decimal_number()
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(|n| n / 100.0)
}

/// Convert `2022년04월24일` to `2022-04-24`.
#[must_use]
pub fn exam_date(raw: &str) -> Option<String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y년%m월%d일")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// File name for a figure: `<field>-<name>-<date>-<NNN>.png`.
#[must_use]
pub fn figure_file_name(field: &str, name: &str, date: &str, number: u32) -> String {
    format!("{field}-{name}-{date}-{number:03}.png")
}

/// Decode a base64 figure, tolerating missing padding and a data-URL prefix.
///
/// # Errors
///
/// Returns [`Error::ImageDecode`] if the text isn't valid base64.
pub fn decode_figure(encoded: &str, name: &str) -> Result<Vec<u8>> {
    let payload = encoded
        .split_once("base64,")
        .map_or(encoded, |(_, data)| data);
    let mut payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();

    let missing = payload.len() % 4;
    if missing != 0 {
        payload.extend(std::iter::repeat('=').take(4 - missing));
    }

    STANDARD.decode(payload).map_err(|source| Error::ImageDecode {
        name: name.to_string(),
        source,
    })
}
