use anyhow::{bail, Context, Result};
use bookshelf_search::config::{default_config_path, find_config_file, get_config, load_config};
use bookshelf_search::models::{Book, SearchQuery};
use bookshelf_search::utils::{book_plain, books_table};
use bookshelf_search::{Config, PartialFailurePolicy, SearchAggregator};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Bookshelf - search Google Books and Open Library at once
#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search Google Books and Open Library and merge the results", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search both catalogs
    #[command(alias = "s")]
    Search {
        /// Search query string
        query: String,

        /// Results requested from each catalog
        #[arg(long, short = 'n')]
        max_results: Option<usize>,

        /// Skip the Open Library edition/work lookups (faster, fewer fields)
        #[arg(long)]
        no_details: bool,

        /// Return whatever succeeded when one catalog fails
        #[arg(long)]
        tolerate_failures: bool,
    },

    /// Show one book by id (Google Books volume id or Open Library work id)
    #[command(alias = "d")]
    Details {
        /// Book id
        id: String,
    },

    /// List the configured catalogs
    Sources,

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Where to write (defaults to the per-user config directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(cli: &Cli, config: &Config) {
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => config.logging.level.as_str(),
        (false, 1) => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("bookshelf_search={}", level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_configuration(cli: &Cli) -> Result<(Config, Option<PathBuf>)> {
    if let Some(path) = &cli.config {
        let config = load_config(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?;
        return Ok((config, Some(path.clone())));
    }

    match find_config_file() {
        Some(path) => {
            let config = load_config(&path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?;
            Ok((config, Some(path)))
        }
        None => Ok((get_config().context("Failed to read configuration")?, None)),
    }
}

fn resolve_format(format: OutputFormat) -> OutputFormat {
    if format != OutputFormat::Auto {
        return format;
    }
    if std::io::stdout().is_terminal() {
        OutputFormat::Table
    } else {
        OutputFormat::Json
    }
}

fn output_books(books: &[Book], format: OutputFormat) -> Result<()> {
    match resolve_format(format) {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(books)?),
        OutputFormat::Plain => {
            for book in books {
                println!("{}\n", book_plain(book));
            }
        }
        OutputFormat::Table | OutputFormat::Auto => println!("{}", books_table(books)),
    }
    Ok(())
}

fn output_book(book: &Book, format: OutputFormat) -> Result<()> {
    match resolve_format(format) {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(book)?),
        _ => println!("{}", book_plain(book)),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, config_path) = load_configuration(&cli)?;
    init_logging(&cli, &config);

    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    match cli.command {
        Commands::Search {
            ref query,
            max_results,
            no_details,
            tolerate_failures,
        } => {
            if query.trim().is_empty() {
                bail!("Please enter something to search for");
            }

            if tolerate_failures {
                config.search.failure_policy = PartialFailurePolicy::Tolerate;
            }

            let aggregator = SearchAggregator::from_config(&config)?;
            let search_query = SearchQuery::new(query.trim())
                .max_results(max_results.unwrap_or(config.providers.page_size).max(1))
                .fetch_details(config.search.fetch_details && !no_details);

            let books = match aggregator.search_query(&search_query).await {
                Ok(books) => books,
                Err(err) => {
                    tracing::error!(error = %err, "search failed");
                    bail!("Search failed, please try again");
                }
            };

            if books.is_empty() {
                if !cli.quiet {
                    eprintln!("No books found for \"{}\"", query.trim());
                }
                return Ok(());
            }

            output_books(&books, cli.output)?;
        }

        Commands::Details { ref id } => {
            let aggregator = SearchAggregator::from_config(&config)?;
            match aggregator.get_details(id.trim()).await {
                Some(book) => output_book(&book, cli.output)?,
                None => bail!("No book found with id \"{}\"", id.trim()),
            }
        }

        Commands::Sources => {
            let aggregator = SearchAggregator::from_config(&config)?;
            for (rank, source) in aggregator.registry().all().enumerate() {
                println!(
                    "{}. {} ({}) search={} lookup={}",
                    rank + 1,
                    source.name(),
                    source.id(),
                    source.supports_search(),
                    source.supports_id_lookup()
                );
            }
            println!("failure policy: {}", aggregator.policy());
        }

        Commands::Config { ref action } => match action {
            ConfigAction::Show => {
                let mut shown = config.clone();
                if shown.api_keys.google_books.is_some() {
                    shown.api_keys.google_books = Some("<set>".to_string());
                }
                print!("{}", shown.to_toml()?);
            }
            ConfigAction::Init { path, force } => {
                let path = match path.clone().or_else(default_config_path) {
                    Some(path) => path,
                    None => bail!("Could not determine a config directory; pass --path"),
                };
                if path.exists() && !force {
                    bail!("{} already exists (use --force to overwrite)", path.display());
                }

                let mut defaults = Config::default();
                defaults.api_keys.google_books = None;
                defaults
                    .save(&path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Wrote {}", path.display());
            }
        },
    }

    Ok(())
}
