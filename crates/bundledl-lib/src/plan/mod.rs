mod planner;
mod types;

pub use planner::{available_formats, destination_path, plan_downloads};
pub use types::{BundleDiagnostic, DownloadPlan, DownloadTask};
