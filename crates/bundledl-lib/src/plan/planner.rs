use super::types::{BundleDiagnostic, DownloadPlan, DownloadTask};
use crate::catalog::{Bundle, DownloadVariant, Subproduct};
use crate::format::{FormatSelection, FormatTag, PLATFORM_EBOOK, PLATFORM_VIDEO, canonical_tag};
use crate::utils::sanitize_path_component;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// `<folder>/<bundle>/<item><extension>`, with both names sanitized.
pub fn destination_path(
    download_folder: &Path,
    bundle_name: &str,
    subproduct_name: &str,
    format: &FormatTag,
) -> PathBuf {
    download_folder
        .join(sanitize_path_component(bundle_name))
        .join(format!(
            "{}{}",
            sanitize_path_component(subproduct_name),
            format.extension()
        ))
}

/// Claims the destination of a task, numbering it `<item> (2)`, `<item> (3)`, ... when
/// an earlier task of the plan already writes to the plain path. Items whose names
/// sanitize to the same string would otherwise overwrite each other.
fn claim_destination(
    taken: &mut HashSet<PathBuf>,
    download_folder: &Path,
    bundle_name: &str,
    subproduct_name: &str,
    format: &FormatTag,
) -> PathBuf {
    let mut path = destination_path(download_folder, bundle_name, subproduct_name, format);
    let mut n = 2;
    while !taken.insert(path.clone()) {
        path = destination_path(
            download_folder,
            bundle_name,
            &format!("{subproduct_name} ({n})"),
            format,
        );
        n += 1;
    }
    path
}

/// Variant fields the planner needs, or `None` when the variant is not a candidate.
fn candidate<'a>(variant: &'a DownloadVariant) -> Option<(&'a str, &'a str)> {
    if variant.platform != PLATFORM_EBOOK && variant.platform != PLATFORM_VIDEO {
        return None;
    }
    let label = variant.format_label.as_deref().filter(|l| !l.trim().is_empty())?;
    let url = variant.url.as_deref().filter(|u| !u.trim().is_empty())?;
    Some((label, url))
}

/// Canonical tags a bundle offers, admitted or not.
pub fn available_formats(bundle: &Bundle) -> BTreeSet<FormatTag> {
    bundle
        .subproducts
        .iter()
        .flat_map(|subproduct| {
            subproduct.variants.iter().filter_map(move |variant| {
                let (label, _) = candidate(variant)?;
                Some(canonical_tag(label, &variant.platform, subproduct.url.as_deref()))
            })
        })
        .collect()
}

fn plan_subproduct(
    bundle: &Bundle,
    subproduct: &Subproduct,
    formats: &FormatSelection,
    download_folder: &Path,
    seen_formats: &mut BTreeSet<FormatTag>,
    taken_paths: &mut HashSet<PathBuf>,
    tasks: &mut Vec<DownloadTask>,
) -> usize {
    let mut planned_formats = HashSet::new();
    let mut planned = 0;

    for variant in &subproduct.variants {
        let Some((label, url)) = candidate(variant) else {
            tracing::trace!(
                bundle = %bundle.name,
                item = %subproduct.name,
                platform = %variant.platform,
                "Skipping variant without usable platform, name or URL"
            );
            continue;
        };

        let format = canonical_tag(label, &variant.platform, subproduct.url.as_deref());
        seen_formats.insert(format.clone());

        if !formats.admits(&format) {
            continue;
        }

        // Same tag means same destination path; the first variant wins.
        if !planned_formats.insert(format.clone()) {
            tracing::debug!(
                bundle = %bundle.name,
                item = %subproduct.name,
                %format,
                label,
                "Dropping duplicate variant"
            );
            continue;
        }

        let output_path = claim_destination(
            taken_paths,
            download_folder,
            &bundle.name,
            &subproduct.name,
            &format,
        );
        tasks.push(DownloadTask {
            bundle_name: bundle.name.clone(),
            subproduct_name: subproduct.name.clone(),
            variant: variant.clone(),
            format,
            url: url.to_string(),
            output_path,
        });
        planned += 1;
    }

    planned
}

/// Expands bundles into download tasks for the requested formats.
pub fn plan_downloads(
    bundles: &[Bundle],
    formats: &FormatSelection,
    download_folder: &Path,
) -> DownloadPlan {
    let mut plan = DownloadPlan::default();
    let mut taken_paths = HashSet::new();

    for bundle in bundles {
        let mut seen_formats = BTreeSet::new();
        let mut planned = 0;

        for subproduct in &bundle.subproducts {
            planned += plan_subproduct(
                bundle,
                subproduct,
                formats,
                download_folder,
                &mut seen_formats,
                &mut taken_paths,
                &mut plan.tasks,
            );
        }

        tracing::debug!(bundle = %bundle.name, tasks = planned, "Planned bundle");
        if planned == 0 {
            plan.unmatched_bundles.push(BundleDiagnostic {
                bundle_name: bundle.name.clone(),
                available_formats: seen_formats,
            });
        }
    }

    plan
}
