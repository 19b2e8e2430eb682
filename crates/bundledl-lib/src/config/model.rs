use crate::catalog::DEFAULT_API_BASE_URL;
use crate::download::DownloadAndCheckOptions;
use crate::filter::SortKey;
use crate::format::ALL_FORMATS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub api_base_url: String,
    pub download_folder: PathBuf,
    /// Requested formats; `all` selects everything.
    pub formats: Vec<String>,
    pub sort_by: SortKey,
    pub download_parallelism: usize,
    pub checking_parallelism: usize,
    /// Overrides the per-user session cache location.
    pub session_cache_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let options = DownloadAndCheckOptions::default();
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            download_folder: PathBuf::from("downloads"),
            formats: vec![ALL_FORMATS.to_string()],
            sort_by: SortKey::default(),
            download_parallelism: options.download_parallelism,
            checking_parallelism: options.checking_parallelism,
            session_cache_path: None,
        }
    }
}
