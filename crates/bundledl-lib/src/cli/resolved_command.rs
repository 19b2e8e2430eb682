use crate::catalog::CatalogClient;
use crate::cli::args::{CatalogArgs, Command};
use crate::cli::params::{CatalogParams, DownloadParams, ListParams};
use crate::config::{Config, load_config};
use crate::download::DownloadAndCheckOptions;
use crate::error::BundleDlError;
use crate::filter::BundleFilter;
use crate::format::FormatSelection;
use crate::session::SessionStore;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum ResolvedCommand {
    Download(DownloadParams),
    List(ListParams),
}

/// A session from the command line wins and refreshes the cache; otherwise the cache is used.
pub fn resolve_session(
    supplied: Option<String>,
    store: &SessionStore,
) -> Result<String, BundleDlError> {
    if let Some(session) = supplied.filter(|s| !s.trim().is_empty()) {
        if let Err(e) = store.save(&session) {
            tracing::warn!("Could not cache session: {}", e);
        }
        return Ok(session);
    }

    store.load().ok_or_else(|| BundleDlError::Auth {
        details: format!(
            "No valid session cached at {}. Log in with a browser and pass the session cookie with --session.",
            store.path().display()
        ),
    })
}

fn resolve_catalog(
    app_config: &Config,
    catalog: CatalogArgs,
) -> Result<CatalogParams, BundleDlError> {
    let store = SessionStore::new(
        app_config
            .session_cache_path
            .clone()
            .unwrap_or_else(SessionStore::default_path),
    );
    let session = resolve_session(catalog.session, &store)?;
    let client = CatalogClient::new(&app_config.api_base_url, session)?;

    let keys = if catalog.keys.is_empty() {
        None
    } else {
        Some(catalog.keys)
    };

    Ok(CatalogParams {
        client,
        keys,
        filter: BundleFilter {
            name_contains: catalog.name_filter,
            sort_by: catalog.sort_by.unwrap_or(app_config.sort_by),
        },
    })
}

pub fn resolve_command(command: Command) -> Result<ResolvedCommand, BundleDlError> {
    match command {
        Command::Download {
            config_path,
            catalog,
            download_folder,
            formats,
            download_parallelism,
            checking_parallelism,
        } => {
            let app_config = load_config(config_path.as_deref())?;

            let options = DownloadAndCheckOptions {
                download_parallelism: download_parallelism
                    .unwrap_or(app_config.download_parallelism),
                checking_parallelism: checking_parallelism
                    .unwrap_or(app_config.checking_parallelism),
            };
            for (name, value) in [
                ("download-parallelism", options.download_parallelism),
                ("checking-parallelism", options.checking_parallelism),
            ] {
                if value == 0 {
                    return Err(BundleDlError::validation(format!(
                        "{name} must be greater than 0."
                    )));
                }
            }

            let formats = if formats.is_empty() {
                &app_config.formats
            } else {
                &formats
            };
            let formats =
                FormatSelection::parse(formats.as_slice()).map_err(BundleDlError::validation)?;
            if formats.is_empty() {
                return Err(BundleDlError::validation("No formats requested."));
            }

            let download_folder = download_folder
                .map(PathBuf::from)
                .unwrap_or_else(|| app_config.download_folder.clone());

            let catalog = resolve_catalog(&app_config, catalog)?;

            Ok(ResolvedCommand::Download(DownloadParams {
                catalog,
                formats,
                download_folder,
                options,
            }))
        }
        Command::List {
            config_path,
            catalog,
        } => {
            let app_config = load_config(config_path.as_deref())?;
            let catalog = resolve_catalog(&app_config, catalog)?;
            Ok(ResolvedCommand::List(ListParams { catalog }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SortKey;
    use crate::format::FormatTag;

    fn write_config(dir: &std::path::Path, extra: &str) -> String {
        let path = dir.join("bundledl.yaml");
        let content = format!(
            "session_cache_path: {}\n{}",
            dir.join("session.json").display(),
            extra
        );
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn download_command(config_path: String, session: Option<&str>) -> Command {
        Command::Download {
            config_path: Some(config_path),
            catalog: CatalogArgs {
                session: session.map(str::to_string),
                ..CatalogArgs::default()
            },
            download_folder: None,
            formats: vec![],
            download_parallelism: None,
            checking_parallelism: None,
        }
    }

    #[test]
    fn test_download_uses_config_values() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(
            dir.path(),
            "download_folder: /srv/books\nformats: [epub]\nsort_by: name\nchecking_parallelism: 7\n",
        );

        let ResolvedCommand::Download(params) =
            resolve_command(download_command(config_path, Some("tok"))).unwrap()
        else {
            panic!("expected download params");
        };

        assert_eq!(params.download_folder, PathBuf::from("/srv/books"));
        assert!(params.formats.admits(&FormatTag::Epub));
        assert!(!params.formats.admits(&FormatTag::Pdf));
        assert_eq!(params.catalog.filter.sort_by, SortKey::Name);
        assert_eq!(params.catalog.keys, None);
        assert_eq!(
            params.options,
            DownloadAndCheckOptions {
                download_parallelism: 1,
                checking_parallelism: 7,
            }
        );
    }

    #[test]
    fn test_cli_values_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path(), "formats: [epub]\n");

        let command = Command::Download {
            config_path: Some(config_path),
            catalog: CatalogArgs {
                session: Some("tok".to_string()),
                name_filter: Some("rust".to_string()),
                keys: vec!["k1".to_string()],
                sort_by: Some(SortKey::Name),
            },
            download_folder: Some("out".to_string()),
            formats: vec!["video".to_string()],
            download_parallelism: Some(4),
            checking_parallelism: None,
        };

        let ResolvedCommand::Download(params) = resolve_command(command).unwrap() else {
            panic!("expected download params");
        };
        assert_eq!(params.download_folder, PathBuf::from("out"));
        assert!(params.formats.admits(&FormatTag::Video));
        assert!(!params.formats.admits(&FormatTag::Epub));
        assert_eq!(params.catalog.keys, Some(vec!["k1".to_string()]));
        assert_eq!(params.catalog.filter.name_contains.as_deref(), Some("rust"));
        assert_eq!(params.options.download_parallelism, 4);
    }

    #[test]
    fn test_unknown_format_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path(), "formats: [epub, docx]\n");

        let result = resolve_command(download_command(config_path, Some("tok")));
        assert!(matches!(result, Err(BundleDlError::Validation { .. })));
    }

    #[test]
    fn test_zero_parallelism_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path(), "download_parallelism: 0\n");

        let result = resolve_command(download_command(config_path, Some("tok")));
        assert!(matches!(result, Err(BundleDlError::Validation { .. })));
    }

    #[test]
    fn test_missing_session_is_an_auth_error() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path(), "");

        let result = resolve_command(download_command(config_path, None));
        assert!(matches!(result, Err(BundleDlError::Auth { .. })));
    }

    #[test]
    fn test_supplied_session_is_cached_for_next_run() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path(), "");

        resolve_command(download_command(config_path.clone(), Some("fresh"))).unwrap();
        assert_eq!(
            SessionStore::new(dir.path().join("session.json")).load(),
            Some("fresh".to_string())
        );

        let command = Command::List {
            config_path: Some(config_path),
            catalog: CatalogArgs::default(),
        };
        assert!(matches!(resolve_command(command), Ok(ResolvedCommand::List(_))));
    }
}
