//! Linkshelf main entry point
//!
//! This is the command-line interface for the Linkshelf link library.

use anyhow::Context;
use clap::{Parser, Subcommand};
use linkshelf::classify::{CompletionBackend, DisabledBackend, OpenAiBackend, PipelineStatus};
use linkshelf::config::{load_config_with_hash, Config};
use linkshelf::storage::{OwnerSummary, SqliteStorage};
use linkshelf::LinkService;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Linkshelf: a categorizing link library
///
/// Linkshelf fetches submitted pages, extracts a title, description and
/// thumbnail, and files each link under one category of a fixed taxonomy.
#[derive(Parser, Debug)]
#[command(name = "linkshelf")]
#[command(version = "1.0.0")]
#[command(about = "A categorizing link library", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Owner whose links are read or written
    #[arg(long, default_value_t = 1, global = true)]
    owner: i64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch, categorize and save a URL
    Add {
        #[arg(value_name = "URL")]
        url: String,
    },

    /// List saved links, newest first
    List {
        /// Only links under this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Show the newest links
    Recent {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show the links opened most recently
    Opened {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show one saved link
    Show { id: i64 },

    /// Delete one saved link
    Delete { id: i64 },

    /// Count saved links
    Count,

    /// Print the category vocabulary
    Categories,

    /// Show or update the owner profile embedded in links
    Owner {
        #[arg(long)]
        nick_name: Option<String>,

        #[arg(long)]
        image_uri: Option<String>,
    },
}

#[derive(Serialize)]
struct CategoryListing<'a> {
    version: u32,
    default: &'a str,
    categories: Vec<CategoryLine<'a>>,
    statuses: Vec<&'static str>,
}

#[derive(Serialize)]
struct CategoryLine<'a> {
    name: &'a str,
    description: &'a str,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let backend = classifier_backend(&config, matches!(cli.command, Command::Add { .. }));
    let storage = SqliteStorage::new(Path::new(&config.storage.database_path))
        .with_context(|| format!("Failed to open database {}", config.storage.database_path))?;
    let service = LinkService::from_config(&config, backend, storage)?;

    let owner = cli.owner;
    match cli.command {
        Command::Add { url } => match service.create_link(owner, &url).await {
            Ok(link) => print_json(&link)?,
            Err(e) => {
                tracing::error!("Failed to add link: {}", e);
                return Err(e.into());
            }
        },
        Command::List { category } => {
            let links = match category {
                Some(label) => service.list_links_by_category(owner, &label)?,
                None => service.list_links(owner)?,
            };
            print_json(&links)?;
        }
        Command::Recent { limit } => print_json(&service.recent_links(owner, limit)?)?,
        Command::Opened { limit } => {
            print_json(&service.recently_opened_links(owner, limit)?)?
        }
        Command::Show { id } => print_json(&service.get_link(owner, id)?)?,
        Command::Delete { id } => {
            service.delete_link(owner, id)?;
            print_json(&serde_json::json!({ "deleted": id }))?;
        }
        Command::Count => {
            print_json(&serde_json::json!({ "owner": owner, "count": service.count_links(owner)? }))?
        }
        Command::Categories => handle_categories(&service)?,
        Command::Owner {
            nick_name,
            image_uri,
        } => handle_owner(&service, owner, nick_name, image_uri)?,
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkshelf=info,warn"),
            1 => EnvFilter::new("linkshelf=debug,info"),
            2 => EnvFilter::new("linkshelf=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Picks the completion backend; without an API key links are still saved,
/// categorized by the URL and default fallbacks
fn classifier_backend(config: &Config, needed: bool) -> Arc<dyn CompletionBackend> {
    if !needed {
        return Arc::new(DisabledBackend::new("not used by this command"));
    }

    match OpenAiBackend::from_config(&config.classifier) {
        Ok(backend) => Arc::new(backend),
        Err(e) => {
            tracing::warn!("Classifier backend unavailable, using fallbacks only: {:#}", e);
            Arc::new(DisabledBackend::new(e.to_string()))
        }
    }
}

fn handle_categories(service: &LinkService<SqliteStorage>) -> anyhow::Result<()> {
    let taxonomy = service.taxonomy();
    let default = taxonomy.default_category();
    let listing = CategoryListing {
        version: taxonomy.version(),
        default: default.label(),
        categories: taxonomy
            .topics()
            .iter()
            .map(|topic| CategoryLine {
                name: &topic.name,
                description: &topic.description,
            })
            .collect(),
        statuses: PipelineStatus::ALL.iter().map(|s| s.label()).collect(),
    };
    print_json(&listing)
}

fn handle_owner(
    service: &LinkService<SqliteStorage>,
    owner_id: i64,
    nick_name: Option<String>,
    image_uri: Option<String>,
) -> anyhow::Result<()> {
    if nick_name.is_some() || image_uri.is_some() {
        let current = service.owner(owner_id)?;
        let updated = OwnerSummary {
            id: owner_id,
            nick_name: nick_name.unwrap_or(current.nick_name),
            image_uri: image_uri.or(current.image_uri),
        };
        service.set_owner(&updated)?;
        tracing::info!("Owner {} updated", owner_id);
    }

    print_json(&service.owner(owner_id)?)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
