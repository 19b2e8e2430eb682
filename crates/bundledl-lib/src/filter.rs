use crate::catalog::Bundle;
use crate::format::{PLATFORM_EBOOK, PLATFORM_VIDEO};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Bundle name, ascending
    Name,
    /// Purchase date, newest first
    #[default]
    Date,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BundleFilter {
    /// Case-insensitive substring the bundle name must contain.
    pub name_contains: Option<String>,
    pub sort_by: SortKey,
}

fn has_media_variant(bundle: &Bundle) -> bool {
    bundle
        .variants()
        .any(|variant| variant.platform == PLATFORM_EBOOK || variant.platform == PLATFORM_VIDEO)
}

impl BundleFilter {
    pub fn matches(&self, bundle: &Bundle) -> bool {
        let name_matches = self.name_contains.as_deref().is_none_or(|needle| {
            bundle.name.to_lowercase().contains(&needle.to_lowercase())
        });
        name_matches && has_media_variant(bundle)
    }

    /// Keeps matching bundles and orders them. Ties keep their fetch order.
    pub fn apply(&self, bundles: Vec<Bundle>) -> Vec<Bundle> {
        let mut bundles: Vec<Bundle> = bundles.into_iter().filter(|b| self.matches(b)).collect();

        match self.sort_by {
            SortKey::Name => bundles.sort_by(|a, b| a.name.cmp(&b.name)),
            SortKey::Date => bundles.sort_by_key(|b| Reverse(b.created.clone())),
        }

        bundles
    }
}
