use crate::catalog::Bundle;
use crate::cli::params::{CatalogParams, DownloadParams};
use crate::download::{RunReport, download_and_check_all};
use crate::error::BundleDlError;
use crate::plan::plan_downloads;

/// Fetches the catalog and applies the bundle filter.
pub async fn fetch_bundles(catalog: &CatalogParams) -> Result<Vec<Bundle>, BundleDlError> {
    let bundles = catalog.client.fetch_catalog(catalog.keys.as_deref()).await?;
    let fetched = bundles.len();

    let bundles = catalog.filter.apply(bundles);
    tracing::info!(
        "{} of {} bundles have ebooks or videos matching the filter",
        bundles.len(),
        fetched
    );
    Ok(bundles)
}

/// Runs the whole pipeline and returns the per-task report.
pub async fn execute_download(params: &DownloadParams) -> Result<RunReport, BundleDlError> {
    let bundles = fetch_bundles(&params.catalog).await?;

    let plan = plan_downloads(&bundles, &params.formats, &params.download_folder);
    for diagnostic in &plan.unmatched_bundles {
        tracing::warn!(
            "No requested format in '{}'. Available: {}",
            diagnostic.bundle_name,
            diagnostic.available_formats_list()
        );
    }

    tracing::info!(
        "Planned {} downloads into {}",
        plan.tasks.len(),
        params.download_folder.display()
    );
    let report =
        download_and_check_all(params.catalog.client.http(), plan.tasks, params.options).await;
    Ok(report)
}

pub async fn run_download(params: DownloadParams) -> Result<(), BundleDlError> {
    let report = execute_download(&params).await?;

    tracing::info!(
        "Done: {} downloaded ({} bytes), {} already up to date, {} failed",
        report.downloaded,
        report.downloaded_bytes,
        report.already_satisfied,
        report.failures.len()
    );

    if report.is_success() {
        return Ok(());
    }

    for failure in &report.failures {
        tracing::error!(
            "{} -> {}: {}",
            failure.task.display_name(),
            failure.task.output_path.display(),
            failure.error
        );
    }
    Err(BundleDlError::TransfersFailed {
        failed: report.failures.len(),
        total: report.progress.total,
    })
}
