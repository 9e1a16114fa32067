//! Multiple-choice quiz items.
//!
//! Two generators produce [`Quiz`] items:
//!
//! - [`TermQuizGenerator`] builds term quizzes (loanword jargon, standard
//!   terminology) from prompt/answer pairs, sampling distractors from the
//!   other answers.
//! - [`VisionQuizGenerator`] builds domain-knowledge quizzes from exam
//!   workbooks, writing figures to disk and flagging items that need a
//!   vision encoder.

mod exam;
mod template;
mod term;
mod vision;

use serde::{Deserialize, Serialize};

use crate::table::{Cell, Record};

pub use exam::{
    clean_explanation, decode_figure, exam_date, figure_file_name, human_accuracy, normalize_answer, split_options,
};
pub use template::{QuizTemplate, TemplateSet};
pub use term::{term_quiz_table, TermKind, TermPair, TermQuizGenerator, TermQuizSettings};
pub use vision::{vision_quiz_table, ExamRecord, VisionQuiz, VisionQuizGenerator};

/// Benchmark category a quiz belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Transliterated construction jargon.
    Loanword,
    /// Terms from official construction glossaries.
    Standard,
    /// Domain knowledge from qualification exams.
    Domain,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loanword => write!(f, "loanword"),
            Self::Standard => write!(f, "standard"),
            Self::Domain => write!(f, "domain"),
        }
    }
}

/// One labelled option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    /// `A`, `B`, `C`, …
    pub label: String,
    /// Option text.
    pub text: String,
}

/// The correct answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Answer text.
    pub text: String,
    /// Label of the option holding the answer.
    pub key: String,
}

/// A multiple-choice quiz item.
///
/// Exactly one option has the answer's text, and its label is the answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    /// Question text.
    pub question: String,
    /// Options in presentation order.
    pub options: Vec<QuizOption>,
    /// The correct answer.
    pub answer: Answer,
    /// Benchmark category.
    pub category: Category,
}

impl Quiz {
    /// Label options in order and locate the answer.
    ///
    /// Returns `None` if no option equals `answer`.
    #[must_use]
    pub fn new(
        question: impl Into<String>,
        options: Vec<String>,
        answer: &str,
        category: Category,
    ) -> Option<Self> {
        let options: Vec<QuizOption> = options
            .into_iter()
            .enumerate()
            .map(|(idx, text)| QuizOption {
                label: option_label(idx),
                text,
            })
            .collect();

        let key = options.iter().find(|o| o.text == answer)?.label.clone();
        Some(Self {
            question: question.into(),
            options,
            answer: Answer {
                text: answer.to_string(),
                key,
            },
            category,
        })
    }

    /// Option columns (`A`, `B`, …) for a table row.
    #[must_use]
    pub fn option_cells(&self) -> Record {
        self.options
            .iter()
            .map(|o| (o.label.clone(), Cell::Text(o.text.clone())))
            .collect()
    }
}

/// Spreadsheet-style option label: `A`…`Z`, then `AA`, `AB`, …
#[must_use]
pub fn option_label(idx: usize) -> String {
    let mut n = idx + 1;
    let mut label = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        // rem < 26, so the cast cannot truncate
        #[allow(clippy::cast_possible_truncation)]
        label.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    label.iter().rev().collect()
}
