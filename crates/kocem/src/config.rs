//! Configuration management for kocem.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "kocem";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `KOCEM_`, `__` separates sections)
/// 2. TOML config file at `~/.config/kocem/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Term quiz generation.
    pub quiz: QuizConfig,
    /// Exam (vision) quiz generation.
    pub vision: VisionConfig,
    /// Spreadsheet input.
    pub workbook: WorkbookConfig,
    /// Format conversion.
    pub convert: ConvertConfig,
    /// Output locations.
    pub output: OutputConfig,
    /// Directory batch processing.
    pub batch: BatchConfig,
}

/// Term quiz configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    /// TOML file with question templates. Built-in templates are used when unset.
    pub template_path: Option<PathBuf>,
    /// Seed for distractor sampling and option shuffling.
    /// Unset means a fresh seed per run.
    pub seed: Option<u64>,
}

/// Column names of an exam workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionColumns {
    /// Question number.
    pub number: String,
    /// Question text.
    pub question: String,
    /// Base64-encoded figure.
    pub image: String,
    /// Options block.
    pub options: String,
    /// Correct answer.
    pub answer: String,
    /// Explanation.
    pub explanation: String,
    /// Human accuracy rate, e.g. `82%`.
    pub rate: String,
    /// Exam field.
    pub field: String,
    /// Exam name.
    pub name: String,
    /// Exam date, e.g. `2022년04월24일`.
    pub date: String,
    /// Subject.
    pub subject: String,
}

/// Exam quiz configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Input column names.
    pub columns: VisionColumns,
    /// Directory figures are written to.
    pub image_dir: PathBuf,
    /// Prefix prepended to the input file name to name the output.
    pub output_prefix: String,
}

/// Spreadsheet configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbookConfig {
    /// Sheet to read. The first sheet is used when unset.
    pub sheet: Option<String>,
}

/// Format conversion configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Delimiter for `.txt` and `.tsv` files.
    pub delimiter: char,
    /// Write `.json` as one object per line.
    pub json_lines: bool,
    /// Dataset name used inside `.db`/`.sqlite` files.
    pub sqlite_dataset: String,
    /// Which `<table>` to read from `.html` files, counting from 0.
    pub html_index: usize,
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory generated datasets are written to.
    pub dir: PathBuf,
}

/// Batch configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum number of files processed at once.
    pub concurrency: usize,
}

impl Default for VisionColumns {
    fn default() -> Self {
        Self {
            number: "문제번호".to_string(),
            question: "문제".to_string(),
            image: "그림".to_string(),
            options: "문항".to_string(),
            answer: "정답".to_string(),
            explanation: "문제해설".to_string(),
            rate: "정답률".to_string(),
            field: "CBT".to_string(),
            name: "시험".to_string(),
            date: "출제일자".to_string(),
            subject: "과목".to_string(),
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            columns: VisionColumns::default(),
            image_dir: PathBuf::from("output/img"),
            output_prefix: "국가기술자격증시험_".to_string(),
        }
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            delimiter: '\t',
            json_lines: true,
            sqlite_dataset: "records".to_string(),
            html_index: 0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("KOCEM_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.batch.concurrency == 0 {
            return Err(Error::ConfigValidation {
                message: "batch.concurrency must be at least 1".to_string(),
            });
        }

        if let Some(path) = &self.quiz.template_path {
            if !path.is_file() {
                return Err(Error::ConfigValidation {
                    message: format!("quiz.template_path {} does not exist", path.display()),
                });
            }
        }

        if self.convert.sqlite_dataset.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "convert.sqlite_dataset must not be empty".to_string(),
            });
        }

        if !self.convert.delimiter.is_ascii() {
            return Err(Error::ConfigValidation {
                message: "convert.delimiter must be a single ASCII character".to_string(),
            });
        }

        Ok(())
    }

    /// The delimiter for `.txt`/`.tsv` files as a byte.
    #[must_use]
    pub fn delimiter_byte(&self) -> u8 {
        u8::try_from(u32::from(self.convert.delimiter)).unwrap_or(b'\t')
    }
}
