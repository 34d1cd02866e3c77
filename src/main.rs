use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use filmstash::commands::{self, ConfigureArgs, Console, ExportArgs, ListArgs, SearchArgs};
use filmstash::config::{ConfigStore, ImageQuality, MaxImageSize};
use filmstash::storage::{Downloader, FilmStorage};
use filmstash::tmdb::TmdbClient;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "filmstash", version, about = "Search TMDB and keep a local film collection")]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration directory (default: ~/.filmstash)
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search for a film and save it
    Search(SearchCmd),
    /// Show or change settings and the API key
    Configure(ConfigureCmd),
    /// List, inspect or delete saved films
    List(ListCmd),
    /// Export saved films as JSON, CSV or text
    Export(ExportCmd),
    /// Check the API key against the service
    Test,
}

#[derive(Args)]
struct SearchCmd {
    /// Film title to search for
    query: String,
    /// Release year
    #[arg(short, long)]
    year: Option<i32>,
    /// Include adult titles
    #[arg(long)]
    adult: bool,
    #[arg(short, long, default_value_t = 1)]
    page: u32,
    /// Base directory to save into
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,
    /// Do not download poster or backdrop
    #[arg(long)]
    no_images: bool,
    /// Save the first result without asking
    #[arg(long)]
    yes: bool,
}

#[derive(Args)]
struct ConfigureCmd {
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
    /// low, medium or high
    #[arg(long)]
    image_quality: Option<ImageQuality>,
    /// Metadata language, e.g. en-US
    #[arg(long)]
    language: Option<String>,
    #[arg(long, value_name = "BOOL")]
    include_adult: Option<bool>,
    #[arg(long, value_name = "BOOL")]
    download_images: Option<bool>,
    /// w300, w500, w780, w1280 or original
    #[arg(long)]
    max_image_size: Option<MaxImageSize>,
    /// Print the current configuration
    #[arg(long)]
    show: bool,
    /// Restore default settings
    #[arg(long)]
    reset: bool,
    /// Remove the stored API key
    #[arg(long)]
    clear_credentials: bool,
}

#[derive(Args)]
struct ListCmd {
    /// Base directory to read from
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,
    /// Show storage totals
    #[arg(long)]
    stats: bool,
    /// Show one saved film by directory name
    #[arg(long, value_name = "NAME")]
    show: Option<String>,
    /// Delete one saved film by directory name
    #[arg(long, value_name = "NAME")]
    delete: Option<String>,
    /// Delete without asking
    #[arg(long)]
    yes: bool,
}

#[derive(Args)]
struct ExportCmd {
    /// json, csv or txt
    #[arg(short, long, default_value = "json")]
    format: String,
    /// Destination directory (default: ./film-exports)
    #[arg(short, long, value_name = "DEST")]
    output: Option<PathBuf>,
    /// Collection to export instead of the configured one
    #[arg(short, long, value_name = "DIR")]
    source: Option<PathBuf>,
    /// Copy images next to JSON exports
    #[arg(long)]
    images: bool,
}

impl From<SearchCmd> for SearchArgs {
    fn from(cmd: SearchCmd) -> Self {
        Self {
            query: cmd.query,
            year: cmd.year,
            adult: cmd.adult,
            page: cmd.page,
            output: cmd.output,
            no_images: cmd.no_images,
            yes: cmd.yes,
        }
    }
}

impl From<ConfigureCmd> for ConfigureArgs {
    fn from(cmd: ConfigureCmd) -> Self {
        Self {
            api_key: cmd.api_key,
            output_dir: cmd.output_dir,
            image_quality: cmd.image_quality,
            language: cmd.language,
            include_adult: cmd.include_adult,
            download_images: cmd.download_images,
            max_image_size: cmd.max_image_size,
            show: cmd.show,
            reset: cmd.reset,
            clear_credentials: cmd.clear_credentials,
        }
    }
}

impl From<ListCmd> for ListArgs {
    fn from(cmd: ListCmd) -> Self {
        Self {
            output: cmd.output,
            stats: cmd.stats,
            show: cmd.show,
            delete: cmd.delete,
            yes: cmd.yes,
        }
    }
}

impl From<ExportCmd> for ExportArgs {
    fn from(cmd: ExportCmd) -> Self {
        Self {
            format: cmd.format,
            output: cmd.output,
            source: cmd.source,
            images: cmd.images,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let store = match cli.config_dir {
        Some(dir) => ConfigStore::new(dir),
        None => match ConfigStore::from_home() {
            Ok(store) => store,
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        },
    };

    let _guard = init_tracing(&store, cli.verbose);
    debug!("Using configuration directory {:?}", store.root());

    match run(cli.command, &store).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<filmstash::Error>() {
                Some(err) => error!(kind = %err.kind(), details = ?err.details(), "{err}"),
                None => error!("{e:#}"),
            }
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, store: &ConfigStore) -> Result<()> {
    let mut console = Console::stdio();

    match command {
        Command::Search(cmd) => {
            let client = TmdbClient::new(commands::require_api_key(store)?)?;
            let downloader = Downloader::new(client.http().clone());
            commands::search(&client, store, Some(downloader), &cmd.into(), &mut console).await?;
        }
        Command::Configure(cmd) => {
            commands::configure(store, &cmd.into(), &mut console)?;
        }
        Command::List(cmd) => {
            let storage = storage_for(store)?;
            commands::list(&storage, &cmd.into(), &mut console).await?;
        }
        Command::Export(cmd) => {
            let storage = storage_for(store)?;
            commands::export(&storage, &cmd.into(), &mut console).await?;
        }
        Command::Test => {
            let client = TmdbClient::new(commands::require_api_key(store)?)?;
            commands::test_connection(&client, store, &mut console)
                .await
                .context("Connection test failed")?;
        }
    }

    Ok(())
}

fn storage_for(store: &ConfigStore) -> Result<FilmStorage> {
    let config = store.load_config()?;
    Ok(FilmStorage::from_config(&config.user))
}

/// Console output follows `RUST_LOG`, then `--verbose`, then the configured
/// level. A daily file under `<config dir>/logs` always gets debug output.
fn init_tracing(store: &ConfigStore, verbose: bool) -> Option<WorkerGuard> {
    let level = if verbose {
        "debug".to_string()
    } else {
        store
            .load_config()
            .map(|config| config.app.log_level)
            .unwrap_or_else(|_| "warn".to_string())
    };

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,filmstash={level}")));
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let (file_layer, guard) = match file_appender(store) {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new("warn,filmstash=debug"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}

fn file_appender(store: &ConfigStore) -> Option<RollingFileAppender> {
    let root = store.resolve_config_directory().ok()?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("filmstash")
        .filename_suffix("log")
        .build(root.join("logs"))
        .map_err(|e| eprintln!("Warning: file logging disabled: {e}"))
        .ok()
}
