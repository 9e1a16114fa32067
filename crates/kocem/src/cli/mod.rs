//! Command-line interface for kocem.
//!
//! This module provides the CLI structure for the `kocem` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConcatCommand, ConfigCommand, ConvertCommand, DatasetsCommand, QuizCommand, QuizKindArg,
    RenameCommand, ResultsCommand, VisionCommand,
};

/// kocem - Build the Korean construction evaluation benchmark
///
/// Generates multiple-choice quizzes from construction glossaries and exam
/// workbooks, converts datasets between formats, and reads evaluation results.
#[derive(Debug, Parser)]
#[command(name = "kocem")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate term quizzes from a glossary spreadsheet
    Quiz(QuizCommand),

    /// Generate exam quizzes from every workbook in a directory
    Vision(VisionCommand),

    /// Convert every file in a directory to another format
    Convert(ConvertCommand),

    /// Join generated files into one dataset
    Concat(ConcatCommand),

    /// Fix a misspelling in file names
    Rename(RenameCommand),

    /// Parse an evaluation-harness results log
    Results(ResultsCommand),

    /// List or remove datasets in a SQLite file
    Datasets(DatasetsCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Config(ConfigCommand::Path),
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "kocem");
    }

    #[test]
    fn test_verbosity() {
        use crate::logging::Verbosity;
        assert_eq!(cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_quiz() {
        let args = vec![
            "kocem",
            "quiz",
            "glossary.xlsx",
            "--kind",
            "standard",
            "-d",
            "3",
            "--seed",
            "7",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Quiz(cmd) = cli.command else {
            panic!("expected quiz command");
        };
        assert_eq!(cmd.input, PathBuf::from("glossary.xlsx"));
        assert_eq!(cmd.kind, QuizKindArg::Standard);
        assert_eq!(cmd.distractors, Some(3));
        assert_eq!(cmd.seed, Some(7));
        assert!(cmd.output.is_none());
    }

    #[test]
    fn test_parse_vision() {
        let args = vec!["kocem", "vision", "src/3. Domain", "--image-dir", "img"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Vision(cmd) = cli.command else {
            panic!("expected vision command");
        };
        assert_eq!(cmd.image_dir, Some(PathBuf::from("img")));
    }

    #[test]
    fn test_parse_convert() {
        let args = vec!["kocem", "convert", "output", "out/jsonl", "--to", "json"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Convert(cmd) = cli.command else {
            panic!("expected convert command");
        };
        assert_eq!(cmd.output_dir, PathBuf::from("out/jsonl"));
        assert_eq!(cmd.to.as_deref(), Some("json"));
    }

    #[test]
    fn test_parse_concat_defaults() {
        let cli = Cli::try_parse_from(vec!["kocem", "concat", "output"]).unwrap();
        let Command::Concat(cmd) = cli.command else {
            panic!("expected concat command");
        };
        assert_eq!(cmd.prefix, "국가기술자격증시험");
        assert!(!cmd.dedupe);
    }

    #[test]
    fn test_parse_rename_defaults() {
        let cli = Cli::try_parse_from(vec!["kocem", "rename", "output"]).unwrap();
        let Command::Rename(cmd) = cli.command else {
            panic!("expected rename command");
        };
        assert_eq!(cmd.from, "국자기술자격증시험");
        assert_eq!(cmd.to, "국가기술자격증시험");
    }

    #[test]
    fn test_parse_results() {
        let args = vec!["kocem", "results", "run.log", "--json"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.command, Command::Results(ResultsCommand { json: true, .. })));
    }

    #[test]
    fn test_parse_datasets_drop() {
        let args = vec!["kocem", "datasets", "benchmark.db", "--drop", "records"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Datasets(cmd) = cli.command else {
            panic!("expected datasets command");
        };
        assert_eq!(cmd.drop.as_deref(), Some("records"));
    }

    #[test]
    fn test_parse_with_config() {
        let args = vec!["kocem", "-c", "/custom/config.toml", "config", "show"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose() {
        let args = vec!["kocem", "-v", "config", "path"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_parse_with_quiet() {
        let args = vec!["kocem", "-q", "config", "path"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.quiet);
    }
}
