//! Domain-knowledge quizzes from qualification exam workbooks.
//!
//! Each workbook row is one exam question with a numbered options block,
//! an answer, and optionally a base64 figure. Figures are written to the
//! image directory and the quiz is flagged as needing a vision encoder.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::exam::{
    clean_explanation, decode_figure, exam_date, figure_file_name, human_accuracy,
    normalize_answer, split_options,
};
use super::{Category, Quiz};
use crate::config::VisionColumns;
use crate::error::{Error, Result};
use crate::table::{Cell, Record, Table};

/// One exam question as read from a workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamRecord {
    /// Question number within the exam.
    pub number: u32,
    /// Question text.
    pub question: String,
    /// Raw numbered options block.
    pub options: String,
    /// Base64 figure, if the question has one.
    pub image: Option<String>,
    /// Raw answer text.
    pub answer: String,
    /// Raw explanation.
    pub explanation: Option<String>,
    /// Human accuracy text, e.g. `82%`.
    pub rate: String,
    /// Exam field.
    pub field: String,
    /// Exam name.
    pub name: String,
    /// Raw exam date, e.g. `2022년04월24일`.
    pub date: String,
    /// Subject.
    pub subject: String,
}

impl ExamRecord {
    /// Identifier used in log messages: `field-name-date-number`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}-{}-{}-{}", self.field, self.name, self.date, self.number)
    }
}

/// A generated exam quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionQuiz {
    /// Question, lowercased options and answer.
    pub quiz: Quiz,
    /// Path of the written figure.
    pub figure: Option<PathBuf>,
    /// Explanation without its heading.
    pub explanation: String,
    /// Fraction of human examinees who answered correctly.
    pub human_accuracy: f64,
    /// Exam field.
    pub field: String,
    /// Exam name.
    pub test: String,
    /// Subject.
    pub subject: String,
    /// Exam date as `YYYY-MM-DD`.
    pub date: String,
}

impl VisionQuiz {
    /// Whether answering needs the figure.
    #[must_use]
    pub fn needs_vision(&self) -> bool {
        self.figure.is_some()
    }
}

/// Column positions resolved once per table.
struct ColumnIndices {
    number: usize,
    question: usize,
    options: usize,
    image: usize,
    answer: usize,
    explanation: usize,
    rate: usize,
    field: usize,
    name: usize,
    date: usize,
    subject: usize,
}

impl ColumnIndices {
    fn resolve(table: &Table, columns: &VisionColumns) -> Result<Self> {
        Ok(Self {
            number: table.column_index(&columns.number)?,
            question: table.column_index(&columns.question)?,
            options: table.column_index(&columns.options)?,
            image: table.column_index(&columns.image)?,
            answer: table.column_index(&columns.answer)?,
            explanation: table.column_index(&columns.explanation)?,
            rate: table.column_index(&columns.rate)?,
            field: table.column_index(&columns.field)?,
            name: table.column_index(&columns.name)?,
            date: table.column_index(&columns.date)?,
            subject: table.column_index(&columns.subject)?,
        })
    }

    fn record(&self, row: &[Cell]) -> ExamRecord {
        let text = |idx: usize| row[idx].as_text().unwrap_or_default();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let number = row[self.number].as_f64().map_or(0, |n| n.max(0.0) as u32);

        ExamRecord {
            number,
            question: text(self.question),
            options: text(self.options),
            image: row[self.image].as_text(),
            answer: text(self.answer),
            explanation: match &row[self.explanation] {
                Cell::Text(s) => Some(s.clone()),
                _ => None,
            },
            rate: text(self.rate),
            field: text(self.field),
            name: text(self.name),
            date: text(self.date),
            subject: text(self.subject),
        }
    }
}

/// Builds exam quizzes and writes their figures.
#[derive(Debug, Clone)]
pub struct VisionQuizGenerator {
    records: Vec<ExamRecord>,
    image_dir: PathBuf,
}

impl VisionQuizGenerator {
    /// Create a generator from records.
    #[must_use]
    pub fn new(records: Vec<ExamRecord>, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            records,
            image_dir: image_dir.into(),
        }
    }

    /// Read records from an exam table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] if a configured column is missing.
    pub fn from_table(
        table: &Table,
        columns: &VisionColumns,
        image_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let indices = ColumnIndices::resolve(table, columns)?;
        let records: Vec<ExamRecord> = table.rows().iter().map(|row| indices.record(row)).collect();
        debug!("Loaded {} exam records", records.len());
        Ok(Self::new(records, image_dir))
    }

    /// The loaded records.
    #[must_use]
    pub fn records(&self) -> &[ExamRecord] {
        &self.records
    }

    /// Generate quizzes for every usable record.
    ///
    /// Records whose answer isn't among the options, whose date can't be
    /// parsed, or whose figure can't be decoded are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if a figure can't be written.
    pub fn generate_all(&self) -> Result<Vec<VisionQuiz>> {
        let mut quizzes = Vec::with_capacity(self.records.len());
        for record in &self.records {
            if let Some(quiz) = self.generate(record)? {
                quizzes.push(quiz);
            }
        }
        info!(
            "Generated {} of {} exam quizzes ({} with figures)",
            quizzes.len(),
            self.records.len(),
            quizzes.iter().filter(|q| q.needs_vision()).count()
        );
        Ok(quizzes)
    }

    /// Generate one quiz, or `None` if the record is unusable.
    ///
    /// # Errors
    ///
    /// Returns an error if the figure can't be written.
    pub fn generate(&self, record: &ExamRecord) -> Result<Option<VisionQuiz>> {
        let answer = normalize_answer(&record.answer);
        let options: Vec<String> = split_options(&record.options)
            .into_iter()
            .map(|o| o.to_lowercase())
            .collect();

        let Some(quiz) = Quiz::new(record.question.clone(), options, &answer, Category::Domain)
        else {
            warn!(
                "[{}] Answer '{}' not found in options, skipping",
                record.label(),
                answer
            );
            return Ok(None);
        };

        let Some(date) = exam_date(&record.date) else {
            warn!("[{}] Unparseable exam date, skipping", record.label());
            return Ok(None);
        };

        let figure = match &record.image {
            Some(encoded) => match self.write_figure(record, encoded) {
                Ok(path) => Some(path),
                Err(e @ Error::ImageDecode { .. }) => {
                    warn!("[{}] {}, skipping", record.label(), e);
                    return Ok(None);
                }
                Err(e) => return Err(e),
            },
            None => None,
        };

        let human_accuracy = human_accuracy(&record.rate).unwrap_or_else(|| {
            warn!(
                "[{}] No percentage in '{}', using 0.0",
                record.label(),
                record.rate
            );
            0.0
        });

        Ok(Some(VisionQuiz {
            quiz,
            figure,
            explanation: record
                .explanation
                .as_deref()
                .map(clean_explanation)
                .unwrap_or_default(),
            human_accuracy,
            field: record.field.clone(),
            test: record.name.clone(),
            subject: record.subject.clone(),
            date,
        }))
    }

    fn write_figure(&self, record: &ExamRecord, encoded: &str) -> Result<PathBuf> {
        let file_name =
            figure_file_name(&record.field, &record.name, &record.date, record.number);
        let bytes = decode_figure(encoded, &file_name)?;

        ensure_dir(&self.image_dir)?;
        let path = self.image_dir.join(file_name);
        fs::write(&path, bytes)?;
        debug!("Wrote figure {}", path.display());
        Ok(path)
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
        path: dir.to_path_buf(),
        source,
    })
}

/// Lay out exam quizzes as rows.
///
/// Columns are `Vision Encoder`, `Question`, `Figure`, `Explanation`,
/// `Human Accuracy`, `Field`, `Test`, `Subject`, `Date`, `Answer`,
/// `Answer Key`, then the option labels.
#[must_use]
pub fn vision_quiz_table(quizzes: &[VisionQuiz]) -> Table {
    let records: Vec<Record> = quizzes
        .iter()
        .map(|q| {
            let figure = q
                .figure
                .as_ref()
                .map_or(Cell::Empty, |p| Cell::Text(p.display().to_string()));
            let mut record: Record = vec![
                ("Vision Encoder".to_string(), Cell::Number(f64::from(u8::from(q.needs_vision())))),
                ("Question".to_string(), q.quiz.question.clone().into()),
                ("Figure".to_string(), figure),
                ("Explanation".to_string(), q.explanation.clone().into()),
                ("Human Accuracy".to_string(), q.human_accuracy.into()),
                ("Field".to_string(), q.field.clone().into()),
                ("Test".to_string(), q.test.clone().into()),
                ("Subject".to_string(), q.subject.clone().into()),
                ("Date".to_string(), q.date.clone().into()),
                ("Answer".to_string(), q.quiz.answer.text.clone().into()),
                ("Answer Key".to_string(), q.quiz.answer.key.clone().into()),
            ];
            record.extend(q.quiz.option_cells());
            record
        })
        .collect();
    Table::from_records(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exam_table() -> Table {
        let columns = VisionColumns::default();
        let mut table = Table::new([
            columns.number,
            columns.question,
            columns.image,
            columns.options,
            columns.answer,
            columns.explanation,
            columns.rate,
            columns.field,
            columns.name,
            columns.date,
            columns.subject,
        ]);
        table.push_row(vec![
            Cell::Number(1.0),
            "거푸집 존치기간에 영향을 주는 요인이 아닌 것은?".into(),
            Cell::Empty,
            "1.\n시멘트 종류\n2.\n외기온도\n3.\n철근 지름\n4.\n부재 종류".into(),
            "3. 철근 지름".into(),
            "<문제 해설>\n철근 지름은 무관하다.".into(),
            "61%".into(),
            "CBT".into(),
            "건축기사".into(),
            "2022년04월24일".into(),
            "건축시공".into(),
        ]);
        table.push_row(vec![
            Cell::Number(2.0),
            "그림의 부재 명칭은?".into(),
            "cG5n".into(),
            "1.\nH-Beam\n2.\nI-Beam".into(),
            "1. H-Beam".into(),
            Cell::Empty,
            "".into(),
            "CBT".into(),
            "건축기사".into(),
            "2022년04월24일".into(),
            "건축구조".into(),
        ]);
        table.push_row(vec![
            Cell::Number(3.0),
            "정답이 보기에 없는 문제".into(),
            Cell::Empty,
            "1.\n가\n2.\n나".into(),
            "다".into(),
            Cell::Empty,
            "50%".into(),
            "CBT".into(),
            "건축기사".into(),
            "2022년04월24일".into(),
            "건축시공".into(),
        ]);
        table
    }

    #[test]
    fn test_generate_all() {
        crate::logging::init_test_logging();
        let dir = tempfile::tempdir().unwrap();
        let image_dir = dir.path().join("img");
        let generator =
            VisionQuizGenerator::from_table(&exam_table(), &VisionColumns::default(), &image_dir)
                .unwrap();
        assert_eq!(generator.records().len(), 3);

        let quizzes = generator.generate_all().unwrap();
        assert_eq!(quizzes.len(), 2);

        let first = &quizzes[0];
        assert_eq!(first.quiz.answer.key, "C");
        assert_eq!(first.explanation, "철근 지름은 무관하다.");
        assert!((first.human_accuracy - 0.61).abs() < 1e-9);
        assert_eq!(first.date, "2022-04-24");
        assert!(!first.needs_vision());

        let second = &quizzes[1];
        assert_eq!(second.quiz.answer.text, "h-beam");
        assert_eq!(second.quiz.options[1].text, "i-beam");
        assert_eq!(second.human_accuracy, 0.0);
        let figure = second.figure.as_ref().unwrap();
        assert_eq!(
            figure.file_name().unwrap().to_str().unwrap(),
            "CBT-건축기사-2022년04월24일-002.png"
        );
        assert_eq!(std::fs::read(figure).unwrap(), b"png");
    }

    #[test]
    fn test_bad_date_is_skipped() {
        let mut table = exam_table();
        let date_idx = table.column_index("출제일자").unwrap();
        let mut rows: Vec<Vec<Cell>> = table.rows().to_vec();
        rows[0][date_idx] = "2022-04-24".into();
        table = Table::new(table.columns().to_vec());
        for row in rows {
            table.push_row(row);
        }

        let dir = tempfile::tempdir().unwrap();
        let generator =
            VisionQuizGenerator::from_table(&table, &VisionColumns::default(), dir.path()).unwrap();
        let quizzes = generator.generate_all().unwrap();
        assert_eq!(quizzes.len(), 1);
        assert_eq!(quizzes[0].subject, "건축구조");
    }

    #[test]
    fn test_undecodable_figure_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let generator = VisionQuizGenerator::new(
            vec![ExamRecord {
                number: 9,
                question: "q".into(),
                options: "1.\na\n2.\nb".into(),
                image: Some("!!!!".into()),
                answer: "1. a".into(),
                explanation: None,
                rate: "10%".into(),
                field: "CBT".into(),
                name: "n".into(),
                date: "2020년01월02일".into(),
                subject: "s".into(),
            }],
            dir.path(),
        );
        assert!(generator.generate_all().unwrap().is_empty());
    }

    #[test]
    fn test_figure_write_failure_fails_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocked = dir.path().join("img");
        std::fs::write(&blocked, b"not a directory").unwrap();

        let generator =
            VisionQuizGenerator::from_table(&exam_table(), &VisionColumns::default(), &blocked)
                .unwrap();

        let err = generator.generate(&generator.records()[1]).unwrap_err();
        assert!(matches!(err, Error::DirectoryCreate { .. }));
        assert!(generator.generate_all().is_err());

        // records without a figure don't touch the image directory
        assert!(generator.generate(&generator.records()[0]).unwrap().is_some());
    }

    #[test]
    fn test_missing_column() {
        let table = Table::new(["문제"]);
        let err = VisionQuizGenerator::from_table(&table, &VisionColumns::default(), "img")
            .unwrap_err();
        assert!(matches!(err, Error::ColumnNotFound { .. }));
    }

    #[test]
    fn test_vision_quiz_table_layout() {
        let dir = tempfile::tempdir().unwrap();
        let generator =
            VisionQuizGenerator::from_table(&exam_table(), &VisionColumns::default(), dir.path())
                .unwrap();
        let table = vision_quiz_table(&generator.generate_all().unwrap());

        assert_eq!(
            &table.columns()[..11],
            [
                "Vision Encoder",
                "Question",
                "Figure",
                "Explanation",
                "Human Accuracy",
                "Field",
                "Test",
                "Subject",
                "Date",
                "Answer",
                "Answer Key"
            ]
        );
        assert_eq!(&table.columns()[11..], ["A", "B", "C", "D"]);
        assert_eq!(table.rows()[0][0], Cell::Number(0.0));
        assert_eq!(table.rows()[1][0], Cell::Number(1.0));
        // second quiz has two options, so C and D stay empty
        assert_eq!(table.rows()[1][13], Cell::Empty);
    }
}
