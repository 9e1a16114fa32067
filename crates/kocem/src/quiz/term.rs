//! Term quizzes from prompt/answer pairs.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::template::TemplateSet;
use super::{Category, Quiz, QuizTemplate};
use crate::error::{Error, Result};
use crate::table::{Record, Table};

/// The kind of term quiz, which determines the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermKind {
    /// Loanword → refined Korean word.
    #[default]
    Loanword,
    /// Glossary definition → standard term.
    Standard,
}

impl TermKind {
    /// The benchmark category of the generated items.
    #[must_use]
    pub fn category(self) -> Category {
        match self {
            Self::Loanword => Category::Loanword,
            Self::Standard => Category::Standard,
        }
    }
}

/// Settings for one term quiz run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermQuizSettings {
    /// Kind of quiz.
    pub kind: TermKind,
    /// Column whose value is substituted into the question.
    pub prompt_column: String,
    /// Column holding the correct answer.
    pub answer_column: String,
    /// Template key.
    pub template_key: String,
    /// Placeholder replaced in the template.
    pub placeholder: String,
    /// Number of wrong options per quiz.
    pub num_distractors: usize,
    /// RNG seed. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl TermQuizSettings {
    /// Defaults for a quiz kind.
    #[must_use]
    pub fn for_kind(kind: TermKind) -> Self {
        match kind {
            TermKind::Loanword => Self {
                kind,
                prompt_column: "외래어".to_string(),
                answer_column: "우리말".to_string(),
                template_key: "loanword".to_string(),
                placeholder: "LOANWORD".to_string(),
                num_distractors: 3,
                seed: None,
            },
            TermKind::Standard => Self {
                kind,
                prompt_column: "해설".to_string(),
                answer_column: "단어".to_string(),
                template_key: "standard".to_string(),
                placeholder: "STANDARD".to_string(),
                num_distractors: 4,
                seed: None,
            },
        }
    }

    /// Check the settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] for zero distractors or an empty placeholder.
    pub fn validate(&self) -> Result<()> {
        if self.num_distractors == 0 {
            return Err(Error::ConfigValidation {
                message: "num_distractors must be at least 1".to_string(),
            });
        }
        if self.placeholder.is_empty() {
            return Err(Error::ConfigValidation {
                message: "placeholder must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// A prompt and its correct answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermPair {
    /// Text substituted into the question.
    pub prompt: String,
    /// Correct answer.
    pub answer: String,
}

/// Generates one quiz per term pair.
#[derive(Debug, Clone)]
pub struct TermQuizGenerator {
    pairs: Vec<TermPair>,
    /// Distinct answers in first-seen order; the distractor pool.
    answers: Vec<String>,
    template: QuizTemplate,
    settings: TermQuizSettings,
}

impl TermQuizGenerator {
    /// Create a generator from pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid.
    pub fn new(
        pairs: Vec<TermPair>,
        template: QuizTemplate,
        settings: TermQuizSettings,
    ) -> Result<Self> {
        settings.validate()?;

        let mut answers: Vec<String> = Vec::new();
        for pair in &pairs {
            if !answers.contains(&pair.answer) {
                answers.push(pair.answer.clone());
            }
        }

        Ok(Self {
            pairs,
            answers,
            template,
            settings,
        })
    }

    /// Create a generator from a table, looking up the template in `templates`.
    ///
    /// Rows with a blank prompt or answer are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a column or the template is missing, or the
    /// settings are invalid.
    pub fn from_table(
        table: &Table,
        settings: TermQuizSettings,
        templates: &TemplateSet,
    ) -> Result<Self> {
        let prompt_idx = table.column_index(&settings.prompt_column)?;
        let answer_idx = table.column_index(&settings.answer_column)?;

        let mut pairs = Vec::with_capacity(table.len());
        for (idx, row) in table.rows().iter().enumerate() {
            match (row[prompt_idx].as_text(), row[answer_idx].as_text()) {
                (Some(prompt), Some(answer)) => pairs.push(TermPair {
                    prompt: prompt.trim().to_string(),
                    answer: answer.trim().to_string(),
                }),
                _ => warn!("Skipping row {}: blank prompt or answer", idx + 2),
            }
        }
        debug!("Loaded {} term pairs", pairs.len());

        let template = templates.get(&settings.template_key)?;
        Self::new(pairs, template, settings)
    }

    /// The loaded pairs.
    #[must_use]
    pub fn pairs(&self) -> &[TermPair] {
        &self.pairs
    }

    /// Generate a quiz for every pair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientDistractors`] if the sheet has too few
    /// distinct answers.
    pub fn generate_all(&self) -> Result<Vec<Quiz>> {
        let mut rng = match self.settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let quizzes = self
            .pairs
            .iter()
            .map(|pair| self.generate(pair, &mut rng))
            .collect::<Result<Vec<_>>>()?;
        info!("Generated {} {} quizzes", quizzes.len(), self.settings.kind.category());
        Ok(quizzes)
    }

    /// Generate one quiz.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientDistractors`] if there are fewer distinct
    /// wrong answers than requested distractors.
    pub fn generate(&self, pair: &TermPair, rng: &mut StdRng) -> Result<Quiz> {
        let candidates: Vec<&String> = self
            .answers
            .iter()
            .filter(|a| **a != pair.answer)
            .collect();

        let needed = self.settings.num_distractors;
        if candidates.len() < needed {
            return Err(Error::InsufficientDistractors {
                answer: pair.answer.clone(),
                needed,
                available: candidates.len(),
            });
        }

        let mut options: Vec<String> = candidates
            .choose_multiple(rng, needed)
            .map(|s| (*s).clone())
            .collect();
        options.push(pair.answer.clone());
        options.shuffle(rng);

        let question = self.template.render(&self.settings.placeholder, &pair.prompt);
        Quiz::new(question, options, &pair.answer, self.settings.kind.category())
            .ok_or_else(|| Error::internal("answer missing from generated options"))
    }
}

/// Lay out term quizzes as rows: `Question`, `Answer`, `Answer Key`, `A`, `B`, …
#[must_use]
pub fn term_quiz_table(quizzes: &[Quiz]) -> Table {
    let records: Vec<Record> = quizzes
        .iter()
        .map(|quiz| {
            let mut record: Record = vec![
                ("Question".to_string(), quiz.question.clone().into()),
                ("Answer".to_string(), quiz.answer.text.clone().into()),
                ("Answer Key".to_string(), quiz.answer.key.clone().into()),
            ];
            record.extend(quiz.option_cells());
            record
        })
        .collect();
    Table::from_records(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn pairs() -> Vec<TermPair> {
        [
            ("가꾸목", "각목"),
            ("시마이", "마무리"),
            ("데나오시", "재시공"),
            ("노가다", "막일"),
            ("함바", "현장 식당"),
        ]
        .iter()
        .map(|(p, a)| TermPair {
            prompt: (*p).to_string(),
            answer: (*a).to_string(),
        })
        .collect()
    }

    fn generator(seed: u64) -> TermQuizGenerator {
        let mut settings = TermQuizSettings::for_kind(TermKind::Loanword);
        settings.seed = Some(seed);
        let template = TemplateSet::builtin().get("loanword").unwrap();
        TermQuizGenerator::new(pairs(), template, settings).unwrap()
    }

    #[test]
    fn test_settings_for_kind() {
        let standard = TermQuizSettings::for_kind(TermKind::Standard);
        assert_eq!(standard.prompt_column, "해설");
        assert_eq!(standard.answer_column, "단어");
        assert_eq!(standard.num_distractors, 4);
        assert_eq!(TermKind::Standard.category(), Category::Standard);
    }

    #[test]
    fn test_settings_validate() {
        let mut settings = TermQuizSettings::for_kind(TermKind::Loanword);
        assert!(settings.validate().is_ok());
        settings.num_distractors = 0;
        assert!(settings.validate().is_err());
        settings.num_distractors = 1;
        settings.placeholder.clear();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_every_quiz_is_consistent() {
        let quizzes = generator(42).generate_all().unwrap();
        assert_eq!(quizzes.len(), 5);

        for (quiz, pair) in quizzes.iter().zip(pairs()) {
            assert_eq!(quiz.question, format!("{}의 순화어로 알맞은 것은?", pair.prompt));
            assert_eq!(quiz.options.len(), 4);
            assert_eq!(quiz.answer.text, pair.answer);

            let keyed = quiz
                .options
                .iter()
                .find(|o| o.label == quiz.answer.key)
                .unwrap();
            assert_eq!(keyed.text, pair.answer);

            let matches = quiz.options.iter().filter(|o| o.text == pair.answer).count();
            assert_eq!(matches, 1);

            let mut texts: Vec<&str> = quiz.options.iter().map(|o| o.text.as_str()).collect();
            texts.sort_unstable();
            texts.dedup();
            assert_eq!(texts.len(), 4, "options must be distinct");
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        assert_eq!(
            generator(7).generate_all().unwrap(),
            generator(7).generate_all().unwrap()
        );
    }

    #[test]
    fn test_duplicate_answers_not_offered_twice() {
        let mut pairs = pairs();
        pairs.push(TermPair {
            prompt: "각재".to_string(),
            answer: "각목".to_string(),
        });
        let mut settings = TermQuizSettings::for_kind(TermKind::Loanword);
        settings.seed = Some(1);
        settings.num_distractors = 4;
        let template = TemplateSet::builtin().get("loanword").unwrap();

        // 5 distinct answers, so 4 distractors is exactly enough
        let quizzes = TermQuizGenerator::new(pairs, template, settings)
            .unwrap()
            .generate_all()
            .unwrap();
        assert_eq!(quizzes.len(), 6);
        assert!(quizzes.iter().all(|q| q.options.len() == 5));
    }

    #[test]
    fn test_insufficient_distractors() {
        let mut settings = TermQuizSettings::for_kind(TermKind::Loanword);
        settings.num_distractors = 5;
        let template = TemplateSet::builtin().get("loanword").unwrap();
        let err = TermQuizGenerator::new(pairs(), template, settings)
            .unwrap()
            .generate_all()
            .unwrap_err();

        assert!(matches!(
            err,
            Error::InsufficientDistractors {
                needed: 5,
                available: 4,
                ..
            }
        ));
    }

    #[test]
    fn test_from_table_skips_blank_rows() {
        let mut table = Table::new(["외래어", "우리말"]);
        for pair in pairs() {
            table.push_row(vec![pair.prompt.into(), pair.answer.into()]);
        }
        table.push_row(vec!["빠루".into(), Cell::Empty]);

        let generator = TermQuizGenerator::from_table(
            &table,
            TermQuizSettings::for_kind(TermKind::Loanword),
            &TemplateSet::builtin(),
        )
        .unwrap();
        assert_eq!(generator.pairs().len(), 5);
    }

    #[test]
    fn test_from_table_missing_column() {
        let table = Table::new(["단어", "해설"]);
        let err = TermQuizGenerator::from_table(
            &table,
            TermQuizSettings::for_kind(TermKind::Loanword),
            &TemplateSet::builtin(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ColumnNotFound { .. }));
    }

    #[test]
    fn test_term_quiz_table_layout() {
        let quizzes = generator(3).generate_all().unwrap();
        let table = term_quiz_table(&quizzes);

        assert_eq!(
            table.columns(),
            &["Question", "Answer", "Answer Key", "A", "B", "C", "D"]
        );
        assert_eq!(table.len(), 5);

        let key_idx = table.column_index("Answer Key").unwrap();
        let answer_idx = table.column_index("Answer").unwrap();
        for row in table.rows() {
            let key = row[key_idx].to_string();
            let option_idx = table.column_index(&key).unwrap();
            assert_eq!(row[option_idx], row[answer_idx]);
        }
    }
}
