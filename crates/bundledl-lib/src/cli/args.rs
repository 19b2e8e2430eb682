use crate::filter::SortKey;
use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogArgs {
    pub session: Option<String>,
    pub name_filter: Option<String>,
    pub keys: Vec<String>,
    pub sort_by: Option<SortKey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Download {
        config_path: Option<String>,
        catalog: CatalogArgs,
        download_folder: Option<String>,
        formats: Vec<String>,
        download_parallelism: Option<usize>,
        checking_parallelism: Option<usize>,
    },
    List {
        config_path: Option<String>,
        catalog: CatalogArgs,
    },
}

pub struct Args {
    pub command: Command,
    pub log_level: Level,
}

#[derive(Debug, Parser)]
#[command(
    name = "bundledl",
    version,
    about = "Download the ebooks, comics and videos of your storefront purchases, skipping files that are already in place"
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Sets the level of verbosity",
        action = ArgAction::Count,
        global = true
    )]
    verbose: u8,

    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Optional config file (YAML or TOML)",
        global = true
    )]
    config: Option<String>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, ClapArgs)]
struct CliCatalogArgs {
    #[arg(
        short = 's',
        long = "session",
        value_name = "TOKEN",
        help = "Session token from a logged-in browser; cached for later runs"
    )]
    session: Option<String>,

    #[arg(
        short = 'n',
        long = "name",
        value_name = "TEXT",
        help = "Only bundles whose name contains TEXT (case-insensitive)"
    )]
    name: Option<String>,

    #[arg(
        short = 'k',
        long = "key",
        value_name = "KEY",
        help = "Only these purchase keys (repeat or use comma-separated values)",
        action = ArgAction::Append,
        value_delimiter = ','
    )]
    keys: Vec<String>,

    #[arg(long = "sort-by", value_enum, help = "Bundle order [default: date]")]
    sort_by: Option<SortKey>,
}

impl From<CliCatalogArgs> for CatalogArgs {
    fn from(args: CliCatalogArgs) -> Self {
        Self {
            session: args.session,
            name_filter: args.name,
            keys: args.keys,
            sort_by: args.sort_by,
        }
    }
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Fetch the catalog and download every missing or outdated file
    Download {
        #[command(flatten)]
        catalog: CliCatalogArgs,

        #[arg(
            short = 'o',
            long = "download-folder",
            value_name = "DIR",
            help = "Folder receiving one sub-folder per bundle [default: downloads]"
        )]
        download_folder: Option<String>,

        #[arg(
            short = 'f',
            long = "format",
            value_name = "FORMAT",
            help = "Formats to download, e.g. epub, pdf, pdf_hd, cbz, video, or all (repeat or use comma-separated values)",
            action = ArgAction::Append,
            value_delimiter = ','
        )]
        formats: Vec<String>,

        #[arg(
            long = "download-parallelism",
            value_name = "N",
            help = "Maximum number of simultaneous downloads [default: 1]"
        )]
        download_parallelism: Option<usize>,

        #[arg(
            long = "checking-parallelism",
            value_name = "N",
            help = "Maximum number of concurrent file digest checks [default: 5]"
        )]
        checking_parallelism: Option<usize>,
    },

    /// Fetch the catalog and print the bundles with their available formats
    List {
        #[command(flatten)]
        catalog: CliCatalogArgs,
    },
}

fn init_tracing(log_level: Level) {
    let mut env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();
    for directive in ["hyper_util=warn", "reqwest=warn"] {
        if let Ok(directive) = directive.parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_env_filter(env_filter)
        .init();
}

pub fn parse_args() -> Args {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    init_tracing(log_level);

    let config_path = cli.config;
    let command = match cli.command {
        CliCommand::Download {
            catalog,
            download_folder,
            formats,
            download_parallelism,
            checking_parallelism,
        } => Command::Download {
            config_path,
            catalog: catalog.into(),
            download_folder,
            formats,
            download_parallelism,
            checking_parallelism,
        },
        CliCommand::List { catalog } => Command::List {
            config_path,
            catalog: catalog.into(),
        },
    };

    Args { command, log_level }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_download_flags_parse() {
        let cli = Cli::try_parse_from([
            "bundledl",
            "-v",
            "download",
            "--session",
            "abc",
            "-f",
            "epub,pdf",
            "--format",
            "video",
            "-k",
            "k1,k2",
            "--sort-by",
            "name",
            "--download-parallelism",
            "3",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        let CliCommand::Download {
            catalog,
            formats,
            download_parallelism,
            checking_parallelism,
            ..
        } = cli.command
        else {
            panic!("expected download command");
        };
        assert_eq!(formats, vec!["epub", "pdf", "video"]);
        assert_eq!(catalog.keys, vec!["k1", "k2"]);
        assert_eq!(catalog.session.as_deref(), Some("abc"));
        assert_eq!(catalog.sort_by, Some(SortKey::Name));
        assert_eq!(download_parallelism, Some(3));
        assert_eq!(checking_parallelism, None);
    }
}
