mod client;
mod types;

pub use client::{CatalogClient, DEFAULT_API_BASE_URL, ORDER_DETAIL_BATCH_SIZE};
pub use types::{
    Bundle, DownloadStructRecord, DownloadUrlRecord, DownloadVariant, OrderKeyRecord, OrderRecord,
    PlatformDownloadsRecord, ProductRecord, Subproduct, SubproductRecord,
};
