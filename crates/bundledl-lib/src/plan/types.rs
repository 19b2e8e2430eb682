use crate::catalog::DownloadVariant;
use crate::format::FormatTag;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// One file to materialize. Built by the planner, consumed once by the executor.
#[derive(Clone, Debug, PartialEq)]
pub struct DownloadTask {
    pub bundle_name: String,
    pub subproduct_name: String,
    pub variant: DownloadVariant,
    pub format: FormatTag,
    /// Remote URL of the variant, already checked to be present.
    pub url: String,
    pub output_path: PathBuf,
}

impl DownloadTask {
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.subproduct_name, self.format)
    }
}

/// A bundle that produced no task, with the tags it does offer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundleDiagnostic {
    pub bundle_name: String,
    pub available_formats: BTreeSet<FormatTag>,
}

impl BundleDiagnostic {
    pub fn available_formats_list(&self) -> String {
        if self.available_formats.is_empty() {
            return "none".to_string();
        }
        self.available_formats
            .iter()
            .map(FormatTag::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DownloadPlan {
    pub tasks: Vec<DownloadTask>,
    pub unmatched_bundles: Vec<BundleDiagnostic>,
}
