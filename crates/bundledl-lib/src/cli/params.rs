use crate::catalog::CatalogClient;
use crate::download::DownloadAndCheckOptions;
use crate::filter::BundleFilter;
use crate::format::FormatSelection;
use std::path::PathBuf;

/// Where bundles come from and which of them to keep.
#[derive(Debug, Clone)]
pub struct CatalogParams {
    pub client: CatalogClient,
    /// Explicit purchase keys; `None` fetches the whole account.
    pub keys: Option<Vec<String>>,
    pub filter: BundleFilter,
}

#[derive(Debug, Clone)]
pub struct DownloadParams {
    pub catalog: CatalogParams,
    pub formats: FormatSelection,
    pub download_folder: PathBuf,
    pub options: DownloadAndCheckOptions,
}

#[derive(Debug, Clone)]
pub struct ListParams {
    pub catalog: CatalogParams,
}
