//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Term quiz command arguments.
#[derive(Debug, Args)]
pub struct QuizCommand {
    /// Spreadsheet of prompt/answer pairs
    pub input: PathBuf,

    /// Kind of term quiz, which sets the default columns and template
    #[arg(short, long, value_enum, default_value = "loanword")]
    pub kind: QuizKindArg,

    /// Column substituted into the question
    #[arg(long)]
    pub prompt_column: Option<String>,

    /// Column holding the correct answer
    #[arg(long)]
    pub answer_column: Option<String>,

    /// Template key to use
    #[arg(long)]
    pub template_key: Option<String>,

    /// Placeholder replaced in the template
    #[arg(long)]
    pub placeholder: Option<String>,

    /// Number of wrong options per quiz
    #[arg(short, long)]
    pub distractors: Option<usize>,

    /// RNG seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Template file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub templates: Option<PathBuf>,

    /// Output file (defaults to the input name inside the output directory)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Exam quiz command arguments.
#[derive(Debug, Args)]
pub struct VisionCommand {
    /// Directory of exam workbooks (`.xlsx`)
    pub input_dir: PathBuf,

    /// Directory for generated quiz workbooks
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory for decoded figures
    #[arg(short, long, value_name = "DIR")]
    pub image_dir: Option<PathBuf>,
}

/// Conversion command arguments.
#[derive(Debug, Args)]
pub struct ConvertCommand {
    /// Directory of files to convert
    pub input_dir: PathBuf,

    /// Directory for converted files
    pub output_dir: PathBuf,

    /// Output extension (defaults to the output directory's name)
    #[arg(short, long, value_name = "EXT")]
    pub to: Option<String>,
}

/// Concatenation command arguments.
#[derive(Debug, Args)]
pub struct ConcatCommand {
    /// Directory holding the files to join
    pub input_dir: PathBuf,

    /// Only files whose name starts with this prefix
    #[arg(short, long, default_value = "국가기술자격증시험")]
    pub prefix: String,

    /// Output file (defaults to `3. Domain.xlsx` in the input directory)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Drop duplicate rows
    #[arg(long)]
    pub dedupe: bool,
}

/// Rename command arguments.
#[derive(Debug, Args)]
pub struct RenameCommand {
    /// Directory holding the files
    pub input_dir: PathBuf,

    /// Text to replace in file names
    #[arg(default_value = "국자기술자격증시험")]
    pub from: String,

    /// Replacement text
    #[arg(default_value = "국가기술자격증시험")]
    pub to: String,
}

/// Results command arguments.
#[derive(Debug, Args)]
pub struct ResultsCommand {
    /// Harness log containing a results table
    pub file: PathBuf,

    /// Print the report as JSON
    #[arg(short, long)]
    pub json: bool,

    /// Write the metrics table to a file (any supported format)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Dataset store command arguments.
#[derive(Debug, Args)]
pub struct DatasetsCommand {
    /// SQLite dataset file
    pub file: PathBuf,

    /// Remove this dataset instead of listing
    #[arg(long, value_name = "NAME")]
    pub drop: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Term quiz kind argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum QuizKindArg {
    /// Loanword jargon
    #[default]
    Loanword,
    /// Standard terminology
    Standard,
}

impl From<QuizKindArg> for crate::quiz::TermKind {
    fn from(arg: QuizKindArg) -> Self {
        match arg {
            QuizKindArg::Loanword => Self::Loanword,
            QuizKindArg::Standard => Self::Standard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::TermKind;

    #[test]
    fn test_quiz_kind_arg_conversion() {
        assert_eq!(TermKind::from(QuizKindArg::Loanword), TermKind::Loanword);
        assert_eq!(TermKind::from(QuizKindArg::Standard), TermKind::Standard);
    }

    #[test]
    fn test_quiz_kind_default() {
        assert_eq!(QuizKindArg::default(), QuizKindArg::Loanword);
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: true };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
