//! `kocem` - CLI for the construction evaluation benchmark tooling
//!
//! This binary generates quiz datasets, converts them between formats and
//! reads evaluation results.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;

use kocem::batch::{self, BatchReport};
use kocem::cli::{
    Cli, Command, ConcatCommand, ConfigCommand, ConvertCommand, DatasetsCommand, QuizCommand,
    RenameCommand, ResultsCommand, VisionCommand,
};
use kocem::dataset;
use kocem::formats::{output_path_for, read_table, write_table};
use kocem::quiz::{
    term_quiz_table, vision_quiz_table, TemplateSet, TermQuizGenerator, TermQuizSettings,
    VisionQuizGenerator,
};
use kocem::{init_logging, results, Config, Converter, FormatOptions, Storage};

/// Output name used by `concat` when none is given.
const DEFAULT_CONCAT_OUTPUT: &str = "3. Domain.xlsx";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    // Execute the command
    match cli.command {
        Command::Quiz(cmd) => handle_quiz(&config, cmd),
        Command::Vision(cmd) => handle_vision(&config, cmd).await,
        Command::Convert(cmd) => handle_convert(&config, cmd).await,
        Command::Concat(cmd) => handle_concat(&config, &cmd),
        Command::Rename(cmd) => handle_rename(&cmd),
        Command::Results(cmd) => handle_results(&config, &cmd),
        Command::Datasets(cmd) => handle_datasets(&cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn handle_quiz(config: &Config, cmd: QuizCommand) -> anyhow::Result<()> {
    let mut settings = TermQuizSettings::for_kind(cmd.kind.into());
    if let Some(column) = cmd.prompt_column {
        settings.prompt_column = column;
    }
    if let Some(column) = cmd.answer_column {
        settings.answer_column = column;
    }
    if let Some(key) = cmd.template_key {
        settings.template_key = key;
    }
    if let Some(placeholder) = cmd.placeholder {
        settings.placeholder = placeholder;
    }
    if let Some(n) = cmd.distractors {
        settings.num_distractors = n;
    }
    settings.seed = cmd.seed.or(config.quiz.seed);

    let template_path = cmd.templates.or_else(|| config.quiz.template_path.clone());
    let templates = TemplateSet::load(template_path.as_deref())?;

    let options = FormatOptions::from(config);
    let table = read_table(&cmd.input, &options)
        .with_context(|| format!("failed to read {}", cmd.input.display()))?;
    let generator = TermQuizGenerator::from_table(&table, settings, &templates)?;
    let quizzes = generator.generate_all()?;

    let output = match cmd.output {
        Some(path) => path,
        None => config.output.dir.join(file_name(&cmd.input)?),
    };
    write_table(&output, &term_quiz_table(&quizzes), &options)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("Wrote {} quizzes to {}", quizzes.len(), output.display());
    Ok(())
}

async fn handle_vision(config: &Config, cmd: VisionCommand) -> anyhow::Result<()> {
    let files: Vec<PathBuf> = dataset::list_files(&cmd.input_dir)
        .with_context(|| format!("failed to list {}", cmd.input_dir.display()))?
        .into_iter()
        .filter(|p| p.extension().is_some_and(|e| e == "xlsx"))
        .collect();
    if files.is_empty() {
        println!("No .xlsx files in {}", cmd.input_dir.display());
        return Ok(());
    }

    let options = FormatOptions::from(config);
    let columns = config.vision.columns.clone();
    let prefix = config.vision.output_prefix.clone();
    let output_dir = cmd.output_dir.unwrap_or_else(|| config.output.dir.clone());
    let image_dir = cmd
        .image_dir
        .unwrap_or_else(|| config.vision.image_dir.clone());

    let report = batch::run_each(files, config.batch.concurrency, move |path: &Path| {
        let table = read_table(path, &options)?;
        let generator = VisionQuizGenerator::from_table(&table, &columns, image_dir.clone())?;
        let quizzes = generator.generate_all()?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output = output_dir.join(format!("{prefix}{name}"));
        write_table(&output, &vision_quiz_table(&quizzes), &options)?;
        Ok(output)
    })
    .await?;

    summarize(&report, "workbooks")
}

async fn handle_convert(config: &Config, cmd: ConvertCommand) -> anyhow::Result<()> {
    let files: Vec<PathBuf> = dataset::list_files(&cmd.input_dir)
        .with_context(|| format!("failed to list {}", cmd.input_dir.display()))?
        .into_iter()
        .filter(|p| p.extension().is_some())
        .collect();

    let converter = Converter::new(FormatOptions::from(config));
    let output_dir = cmd.output_dir;
    let extension = cmd.to;

    let report = batch::run_each(files, config.batch.concurrency, move |input: &Path| {
        let output = output_path_for(input, &output_dir, extension.as_deref());
        converter.convert(input, &output)?;
        Ok(output)
    })
    .await?;

    summarize(&report, "files")
}

fn summarize(report: &BatchReport, what: &str) -> anyhow::Result<()> {
    println!(
        "Processed {} of {} {}",
        report.succeeded.len(),
        report.total(),
        what
    );
    for (input, err) in &report.failed {
        if err.is_missing_input() {
            eprintln!("  {} (missing input): {err}", input.display());
        } else {
            eprintln!("  {}: {err}", input.display());
        }
    }
    if !report.is_success() {
        bail!(
            "{} of {} {} failed ({} with missing input)",
            report.failed.len(),
            report.total(),
            what,
            report.missing_input()
        );
    }
    Ok(())
}

fn handle_concat(config: &Config, cmd: &ConcatCommand) -> anyhow::Result<()> {
    let options = FormatOptions::from(config);
    let mut table = dataset::concat(&cmd.input_dir, &cmd.prefix, &options)?;
    if cmd.dedupe {
        let removed = table.dedupe();
        println!("Removed {removed} duplicate rows");
    }

    let output = cmd
        .output
        .clone()
        .unwrap_or_else(|| cmd.input_dir.join(DEFAULT_CONCAT_OUTPUT));
    write_table(&output, &table, &options)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("Wrote {} rows to {}", table.len(), output.display());
    Ok(())
}

fn handle_rename(cmd: &RenameCommand) -> anyhow::Result<()> {
    let renamed = dataset::rename(&cmd.input_dir, &cmd.from, &cmd.to)?;
    for path in &renamed {
        println!("{}", path.display());
    }
    println!("Renamed {} files", renamed.len());
    Ok(())
}

fn handle_results(config: &Config, cmd: &ResultsCommand) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&cmd.file)
        .with_context(|| format!("failed to read {}", cmd.file.display()))?;
    let report = results::parse(&text)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if let Some(header) = &report.header {
            println!(
                "Model: {} ({})",
                header.model().unwrap_or("unknown"),
                header.model_type
            );
        }
        for row in &report.rows {
            let stderr = row
                .stderr
                .map_or_else(|| "N/A".to_string(), |s| format!("{s:.4}"));
            println!(
                "  {:<28} {:<10} {:.4} ± {} {}",
                row.task, row.metric, row.value, stderr, row.direction
            );
        }
    }

    if let Some(output) = &cmd.output {
        write_table(output, &report.to_table(), &FormatOptions::from(config))
            .with_context(|| format!("failed to write {}", output.display()))?;
        println!("Wrote {} metrics to {}", report.rows.len(), output.display());
    }
    Ok(())
}

fn handle_datasets(cmd: &DatasetsCommand) -> anyhow::Result<()> {
    let mut storage = Storage::open_existing(&cmd.file)?;

    if let Some(name) = &cmd.drop {
        if storage.drop_dataset(name)? {
            println!("Removed dataset {name}");
        } else {
            println!("No dataset named {name}");
        }
        return Ok(());
    }

    let datasets = storage.datasets()?;
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&datasets)?);
    } else if datasets.is_empty() {
        println!("No datasets in {}", storage.path().display());
    } else {
        for info in &datasets {
            println!(
                "{:<24} {:>8} rows  {} columns",
                info.name,
                info.rows,
                info.columns.len()
            );
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Quiz]");
                println!(
                    "  Template file:  {}",
                    config
                        .quiz
                        .template_path
                        .as_ref()
                        .map_or_else(|| "(built-in)".to_string(), |p| p.display().to_string())
                );
                println!(
                    "  Seed:           {}",
                    config
                        .quiz
                        .seed
                        .map_or_else(|| "(random)".to_string(), |s| s.to_string())
                );
                println!();
                println!("[Vision]");
                println!("  Image dir:      {}", config.vision.image_dir.display());
                println!("  Output prefix:  {}", config.vision.output_prefix);
                println!("  Answer column:  {}", config.vision.columns.answer);
                println!();
                println!("[Convert]");
                println!("  Delimiter:      {:?}", config.convert.delimiter);
                println!("  JSON lines:     {}", config.convert.json_lines);
                println!("  SQLite dataset: {}", config.convert.sqlite_dataset);
                println!("  HTML table:     {}", config.convert.html_index);
                println!();
                println!("[Output]");
                println!("  Directory:      {}", config.output.dir.display());
                println!("  Concurrency:    {}", config.batch.concurrency);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn file_name(path: &Path) -> anyhow::Result<&std::ffi::OsStr> {
    path.file_name()
        .with_context(|| format!("{} has no file name", path.display()))
}
