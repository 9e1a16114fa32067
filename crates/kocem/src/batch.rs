//! Bounded parallel processing of files in a directory.
//!
//! Each file runs a blocking job on tokio's blocking pool. A semaphore caps
//! how many jobs run at once, and one failing file never stops the rest.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, error, info};

use crate::error::{Error, Result};

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// `(input, output)` for every file that succeeded.
    pub succeeded: Vec<(PathBuf, PathBuf)>,
    /// `(input, error)` for every file that failed.
    pub failed: Vec<(PathBuf, Error)>,
}

impl BatchReport {
    /// Whether every file succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total number of files processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Number of failures caused by missing input rather than a broken file.
    #[must_use]
    pub fn missing_input(&self) -> usize {
        self.failed
            .iter()
            .filter(|(_, err)| err.is_missing_input())
            .count()
    }
}

/// Run `job` on every file with at most `concurrency` jobs at once.
///
/// Results keep the order of `files`.
///
/// # Errors
///
/// Returns [`Error::ConfigValidation`] if `concurrency` is zero.
pub async fn run_each<F>(files: Vec<PathBuf>, concurrency: usize, job: F) -> Result<BatchReport>
where
    F: Fn(&Path) -> Result<PathBuf> + Send + Sync + 'static,
{
    if concurrency == 0 {
        return Err(Error::ConfigValidation {
            message: "batch concurrency must be at least 1".to_string(),
        });
    }

    let semaphore = Arc::new(Semaphore::new(concurrency));
    let job = Arc::new(job);
    let mut handles = Vec::with_capacity(files.len());

    for file in files {
        let semaphore = Arc::clone(&semaphore);
        let job = Arc::clone(&job);
        let input = file.clone();
        let task = tokio::spawn(async move {
            let permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => return Err(Error::internal(format!("batch semaphore closed: {e}"))),
            };

            debug!("Processing {}", input.display());
            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                job(&input)
            })
            .await
            .unwrap_or_else(|e| Err(Error::internal(format!("batch job panicked: {e}"))))
        });
        handles.push((file, task));
    }

    let mut report = BatchReport::default();
    for (file, handle) in handles {
        let outcome = handle
            .await
            .unwrap_or_else(|e| Err(Error::internal(format!("batch task failed: {e}"))));
        match outcome {
            Ok(output) => {
                info!("{} -> {}", file.display(), output.display());
                report.succeeded.push((file, output));
            }
            Err(e) => {
                error!("{}: {}", file.display(), e);
                report.failed.push((file, e));
            }
        }
    }

    Ok(report)
}
