use super::types::{DownloadAndCheckOptions, RunReport, TaskOutcome, TransferError};
use crate::plan::DownloadTask;
use crate::verification::{ContentDigestVerifier, IntegrityStatus, check_existing_file};
use futures::stream::{FuturesUnordered, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

async fn remove_if_exists(path: &Path) -> Result<(), TransferError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(TransferError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Streams the variant to its destination while hashing it.
async fn transfer(http: &reqwest::Client, task: &DownloadTask) -> Result<u64, TransferError> {
    let output_path = &task.output_path;
    let io_error = |source: std::io::Error| TransferError::Io {
        path: output_path.clone(),
        source,
    };

    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| TransferError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let response = http.get(&task.url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(TransferError::Status {
            status: status.as_u16(),
        });
    }

    let file = tokio::fs::File::create(output_path).await.map_err(io_error)?;
    let mut writer = tokio::io::BufWriter::new(file);
    let mut verifier = task.variant.checksum.clone().map(ContentDigestVerifier::new);
    let mut written = 0u64;

    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        if let Some(verifier) = verifier.as_mut() {
            tokio::task::block_in_place(|| verifier.update(&chunk));
        }
        writer.write_all(&chunk).await.map_err(io_error)?;
        written += chunk.len() as u64;
    }
    writer.flush().await.map_err(io_error)?;

    if let Some(verifier) = verifier {
        verifier.verify()?;
    }
    Ok(written)
}

async fn check_and_download(
    http: &reqwest::Client,
    task: &DownloadTask,
    checking_semaphore: Arc<Semaphore>,
    download_semaphore: Arc<Semaphore>,
) -> Result<TaskOutcome, TransferError> {
    let permit = checking_semaphore.acquire_owned().await?;
    let output_path = &task.output_path;
    tracing::trace!(item = %task.display_name(), output = %output_path.display(), "Checking");

    let status = check_existing_file(
        output_path,
        task.variant.checksum.as_ref(),
        task.variant.size,
    )
    .await
    .map_err(TransferError::IntegrityCheck)?;

    if status == IntegrityStatus::AlreadySatisfied {
        debug!(output = %output_path.display(), "File exists with matching digest, skipping download");
        return Ok(TaskOutcome::AlreadySatisfied);
    }
    if output_path.exists() {
        info!(output = %output_path.display(), "File exists with incorrect content, deleting");
        remove_if_exists(output_path).await?;
    }
    drop(permit);

    let _permit = download_semaphore.acquire_owned().await?;
    info!(
        bundle = %task.bundle_name,
        item = %task.subproduct_name,
        format = %task.format,
        output = %output_path.display(),
        "Downloading"
    );

    match transfer(http, task).await {
        Ok(bytes) => Ok(TaskOutcome::Downloaded { bytes }),
        Err(err) => {
            // A partial file would only fail the next integrity check.
            if let Err(cleanup_err) = remove_if_exists(output_path).await {
                warn!("Failed to remove partial download: {}", cleanup_err);
            }
            Err(err)
        }
    }
}

/// Runs every task to completion and reports each outcome.
///
/// Integrity checks and transfers are bounded separately, so hashing large local
/// files does not hold up the transfer slots. A failing task never cancels the others.
pub async fn download_and_check_all(
    http: &reqwest::Client,
    tasks: Vec<DownloadTask>,
    options: DownloadAndCheckOptions,
) -> RunReport {
    let mut report = RunReport::new(tasks.len());
    let download_semaphore = Arc::new(Semaphore::new(options.download_parallelism));
    let checking_semaphore = Arc::new(Semaphore::new(options.checking_parallelism));

    let mut futs = FuturesUnordered::new();
    for task in tasks {
        let download_semaphore = download_semaphore.clone();
        let checking_semaphore = checking_semaphore.clone();
        futs.push(async move {
            let outcome =
                match check_and_download(http, &task, checking_semaphore, download_semaphore).await {
                    Ok(outcome) => outcome,
                    Err(err) => TaskOutcome::Failed(err),
                };
            (task, outcome)
        });
    }

    info!("Processing {} downloads...", report.progress.total);

    while let Some((task, outcome)) = futs.next().await {
        let summary = match &outcome {
            TaskOutcome::Downloaded { bytes } => {
                format!("Downloaded {} ({} bytes)", task.output_path.display(), bytes)
            }
            TaskOutcome::AlreadySatisfied => format!("Up to date {}", task.output_path.display()),
            TaskOutcome::Failed(err) => {
                warn!("Download of {} failed: {:#}", task.display_name(), err);
                format!("Failed {}", task.output_path.display())
            }
        };
        let progress = report.record(task, outcome);
        info!("[{}/{}] {}", progress.done, progress.total, summary);
    }

    report
}
