use crate::verification::Checksum;
use serde::{Deserialize, Serialize};

/// A purchased collection, as seen by the rest of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    pub name: String,
    /// ISO-8601 creation timestamp as returned by the catalog.
    pub created: String,
    pub key: String,
    pub subproducts: Vec<Subproduct>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subproduct {
    pub name: String,
    pub url: Option<String>,
    pub variants: Vec<DownloadVariant>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadVariant {
    pub platform: String,
    pub format_label: Option<String>,
    pub url: Option<String>,
    pub size: Option<u64>,
    pub checksum: Option<Checksum>,
}

impl Bundle {
    pub fn variants(&self) -> impl Iterator<Item = &DownloadVariant> {
        self.subproducts.iter().flat_map(|s| s.variants.iter())
    }
}

// Wire records of the order API. Only the fields the pipeline consumes are modeled.

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrderKeyRecord {
    pub gamekey: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrderRecord {
    pub gamekey: String,
    #[serde(default)]
    pub created: Option<String>,
    pub product: ProductRecord,
    #[serde(default)]
    pub subproducts: Vec<SubproductRecord>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProductRecord {
    pub human_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubproductRecord {
    pub human_name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub downloads: Vec<PlatformDownloadsRecord>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlatformDownloadsRecord {
    pub platform: String,
    #[serde(default)]
    pub download_struct: Vec<DownloadStructRecord>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadStructRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<DownloadUrlRecord>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub md5: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadUrlRecord {
    #[serde(default)]
    pub web: Option<String>,
}

impl From<OrderRecord> for Bundle {
    fn from(order: OrderRecord) -> Self {
        Self {
            name: order.product.human_name,
            created: order.created.unwrap_or_default(),
            key: order.gamekey,
            subproducts: order.subproducts.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<SubproductRecord> for Subproduct {
    fn from(record: SubproductRecord) -> Self {
        let variants = record
            .downloads
            .into_iter()
            .flat_map(|platform_downloads| {
                let platform = platform_downloads.platform;
                platform_downloads
                    .download_struct
                    .into_iter()
                    .map(move |download| DownloadVariant::from_record(&platform, download))
            })
            .collect();

        Self {
            name: record.human_name,
            url: record.url,
            variants,
        }
    }
}

impl DownloadVariant {
    fn from_record(platform: &str, record: DownloadStructRecord) -> Self {
        let checksum = Checksum::preferred(record.sha1.as_deref(), record.md5.as_deref());
        Self {
            platform: platform.to_string(),
            format_label: record.name,
            url: record.url.and_then(|url| url.web),
            size: record.file_size,
            checksum,
        }
    }
}
