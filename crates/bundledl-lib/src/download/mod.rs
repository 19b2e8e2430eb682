#[allow(clippy::module_inception)]
mod download;
mod types;

pub use download::download_and_check_all;
pub use types::{
    DownloadAndCheckOptions, FailedTask, RunProgress, RunReport, TaskOutcome, TransferError,
};
