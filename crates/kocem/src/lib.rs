//! `kocem` - Dataset tooling for the Korean construction evaluation benchmark
//!
//! This library turns construction glossaries and qualification exam workbooks
//! into multiple-choice quiz datasets, converts tables between spreadsheet,
//! text, JSON, HTML and SQLite formats, and parses evaluation-harness results.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod batch;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod formats;
pub mod logging;
pub mod quiz;
pub mod results;
pub mod storage;
pub mod table;

pub use config::Config;
pub use error::{Error, Result};
pub use formats::{Converter, Format, FormatOptions};
pub use logging::init_logging;
pub use quiz::{Quiz, TermQuizGenerator, VisionQuizGenerator};
pub use results::EvalReport;
pub use storage::Storage;
pub use table::{Cell, Table};
