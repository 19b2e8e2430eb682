use crate::plan::DownloadTask;
use crate::verification::VerificationError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DownloadAndCheckOptions {
    /// Transfers running at the same time.
    pub download_parallelism: usize,
    /// Tasks going through the integrity check at the same time.
    pub checking_parallelism: usize,
}

impl Default for DownloadAndCheckOptions {
    fn default() -> Self {
        Self {
            download_parallelism: 1,
            checking_parallelism: 5,
        }
    }
}

/// Why a single task failed. Never aborts the run.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server responded with status {status}")]
    Status { status: u16 },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Downloaded content does not match: {0}")]
    Verification(#[from] VerificationError),

    #[error("Failed to check existing file: {0}")]
    IntegrityCheck(eyre::Report),

    #[error("Download queue closed")]
    QueueClosed(#[from] tokio::sync::AcquireError),
}

#[derive(Debug)]
pub enum TaskOutcome {
    Downloaded { bytes: u64 },
    AlreadySatisfied,
    Failed(TransferError),
}

/// Completed/total counters of one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunProgress {
    pub done: usize,
    pub total: usize,
}

impl RunProgress {
    pub fn new(total: usize) -> Self {
        Self { done: 0, total }
    }

    pub fn advance(&mut self) -> Self {
        self.done += 1;
        *self
    }
}

#[derive(Debug)]
pub struct FailedTask {
    pub task: DownloadTask,
    pub error: TransferError,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub progress: RunProgress,
    pub downloaded: usize,
    pub downloaded_bytes: u64,
    pub already_satisfied: usize,
    pub failures: Vec<FailedTask>,
}

impl RunReport {
    pub fn new(total: usize) -> Self {
        Self {
            progress: RunProgress::new(total),
            ..Self::default()
        }
    }

    pub fn record(&mut self, task: DownloadTask, outcome: TaskOutcome) -> RunProgress {
        match outcome {
            TaskOutcome::Downloaded { bytes } => {
                self.downloaded += 1;
                self.downloaded_bytes += bytes;
            }
            TaskOutcome::AlreadySatisfied => self.already_satisfied += 1,
            TaskOutcome::Failed(error) => self.failures.push(FailedTask { task, error }),
        }
        self.progress.advance()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DownloadVariant;
    use crate::format::FormatTag;

    fn task(name: &str) -> DownloadTask {
        DownloadTask {
            bundle_name: "Bundle".to_string(),
            subproduct_name: name.to_string(),
            variant: DownloadVariant {
                platform: "ebook".to_string(),
                format_label: Some("EPUB".to_string()),
                url: Some(format!("https://dl/{name}")),
                size: None,
                checksum: None,
            },
            format: FormatTag::Epub,
            url: format!("https://dl/{name}"),
            output_path: PathBuf::from(format!("out/Bundle/{name}.epub")),
        }
    }

    #[test]
    fn test_report_counts_every_outcome() {
        let mut report = RunReport::new(3);

        let progress = report.record(task("a"), TaskOutcome::Downloaded { bytes: 10 });
        assert_eq!(progress, RunProgress { done: 1, total: 3 });
        report.record(task("b"), TaskOutcome::AlreadySatisfied);
        let progress = report.record(
            task("c"),
            TaskOutcome::Failed(TransferError::Status { status: 500 }),
        );

        assert_eq!(progress, RunProgress { done: 3, total: 3 });
        assert_eq!(report.downloaded, 1);
        assert_eq!(report.downloaded_bytes, 10);
        assert_eq!(report.already_satisfied, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].task.subproduct_name, "c");
        assert!(!report.is_success());
    }

    #[test]
    fn test_empty_report_is_success() {
        let report = RunReport::new(0);
        assert!(report.is_success());
        assert_eq!(report.progress, RunProgress::default());
    }
}
