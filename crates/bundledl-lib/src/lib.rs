pub mod catalog;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod filter;
pub mod format;
pub mod plan;
pub mod session;
pub mod utils;
pub mod verification;

pub use config::Config;
pub use error::BundleDlError;
