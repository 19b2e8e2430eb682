mod args;
mod download;
mod list;
mod params;
mod resolved_command;

pub use args::{Args, CatalogArgs, Command, parse_args};
pub use download::{execute_download, fetch_bundles, run_download};
pub use list::{format_bundle_line, run_list};
pub use params::{CatalogParams, DownloadParams, ListParams};
pub use resolved_command::{ResolvedCommand, resolve_command, resolve_session};
