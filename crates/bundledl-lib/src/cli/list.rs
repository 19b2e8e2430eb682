use crate::catalog::Bundle;
use crate::cli::download::fetch_bundles;
use crate::cli::params::ListParams;
use crate::error::BundleDlError;
use crate::plan::available_formats;
use itertools::Itertools;

/// One line per bundle: key, purchase date, name and the formats on offer.
pub fn format_bundle_line(bundle: &Bundle) -> String {
    let date = bundle.created.get(..10).unwrap_or(&bundle.created);
    let formats = available_formats(bundle).iter().map(|f| f.as_str()).join(", ");
    format!("{}\t{}\t{}\t[{}]", bundle.key, date, bundle.name, formats)
}

pub async fn run_list(params: ListParams) -> Result<(), BundleDlError> {
    let bundles = fetch_bundles(&params.catalog).await?;

    for bundle in &bundles {
        println!("{}", format_bundle_line(bundle));
    }

    tracing::info!("Listed {} bundles", bundles.len());
    Ok(())
}
