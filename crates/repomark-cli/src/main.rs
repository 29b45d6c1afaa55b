use anyhow::{bail, Context};
use clap::Parser;
use repomark_core::{
    models::Repository, BookmarkStore, Config, GitHubProvider, SearchController, SearchState,
};
use repomark_storage::{MemoryStorage, SqliteStorage};
use repomark_tui::{ui::format_stars, App};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "repomark")]
#[command(version, about = "Search GitHub repositories and keep bookmarks", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true, env = "REPOMARK_CONFIG")]
    config: Option<PathBuf>,

    /// Bookmark database file
    #[arg(long, global = true, env = "REPOMARK_DB")]
    db: Option<PathBuf>,

    /// Keep bookmarks in memory only; nothing is read from or written to disk
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Launch the terminal UI (the default)
    Tui,
    /// Search for repositories
    Search {
        /// Search query
        query: String,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
        /// Only show results that are bookmarked
        #[arg(long)]
        bookmarked_only: bool,
        /// Toggle the bookmark of the result with this id
        #[arg(long, value_name = "ID")]
        toggle: Option<u64>,
    },
    /// List bookmarked repositories
    Bookmarks {
        /// Print bookmarks as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a bookmark
    Unbookmark {
        /// Repository id
        id: u64,
    },
    /// Show the effective configuration
    Config {
        /// Write the defaults to the config file
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui);

    // The TUI owns the terminal, so its logs go to a file
    let log_file = match command {
        Commands::Tui => Some(Config::data_dir()?.join("repomark.log")),
        _ => None,
    };
    init_logging(log_file.as_deref())?;

    let (config_path, mut config) = match cli.config {
        Some(path) => {
            let config = Config::load_from(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            (path, config)
        }
        None => (
            Config::config_path()?,
            Config::load().context("Failed to load config")?,
        ),
    };
    if let Some(db) = cli.db {
        config.storage.path = Some(db);
    }

    match command {
        Commands::Tui => {
            let app = App::new(
                open_bookmarks(&config, cli.ephemeral)?,
                SearchController::new(Arc::new(GitHubProvider::from_config(&config.github)?)),
                config.search.debounce(),
            );
            repomark_tui::run_tui(app).await?;
        }
        Commands::Search {
            query,
            json,
            bookmarked_only,
            toggle,
        } => {
            let mut bookmarks = open_bookmarks(&config, cli.ephemeral)?;
            let mut search =
                SearchController::new(Arc::new(GitHubProvider::from_config(&config.github)?));

            search.submit(&query);
            search.settle().await;

            let results: &[Repository] = match search.state() {
                SearchState::Success(repos) => repos.as_slice(),
                SearchState::Error(message) => bail!("{}", message),
                SearchState::Idle | SearchState::Loading => &[],
            };

            if let Some(id) = toggle {
                let repo = results
                    .iter()
                    .find(|repo| repo.id == id)
                    .with_context(|| format!("No result with id {} for '{}'", id, query))?;
                let bookmarked = bookmarks.toggle(repo);
                eprintln!(
                    "{} {}",
                    if bookmarked { "Bookmarked" } else { "Removed bookmark for" },
                    repo.full_name
                );
            }

            let shown: Vec<&Repository> = results
                .iter()
                .filter(|repo| !bookmarked_only || bookmarks.is_bookmarked(repo.id))
                .collect();

            if json {
                print_json(&shown, &bookmarks)?;
            } else if shown.is_empty() {
                println!("No repositories found");
            } else {
                print_table(&shown, &bookmarks);
            }
        }
        Commands::Bookmarks { json } => {
            let bookmarks = open_bookmarks(&config, cli.ephemeral)?;
            let all = bookmarks.all();

            if json {
                print_json(&all, &bookmarks)?;
            } else if all.is_empty() {
                println!("No bookmarks yet");
            } else {
                print_table(&all, &bookmarks);
            }
        }
        Commands::Unbookmark { id } => {
            let mut bookmarks = open_bookmarks(&config, cli.ephemeral)?;
            let Some(repo) = bookmarks.get(id).cloned() else {
                bail!("Repository {} is not bookmarked", id);
            };
            bookmarks.toggle(&repo);
            println!("Removed bookmark for {}", repo.full_name);
        }
        Commands::Config { init } => {
            if init {
                if config_path.exists() {
                    bail!("Config file already exists at {}", config_path.display());
                }
                Config::default().save_to(&config_path)?;
                println!("Wrote default config to {}", config_path.display());
                return Ok(());
            }

            println!("# config file: {}", config_path.display());
            println!("# database:    {}", config.db_path()?.display());
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "repomark=info".into()),
    );

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}

fn open_bookmarks(config: &Config, ephemeral: bool) -> anyhow::Result<BookmarkStore> {
    if ephemeral {
        tracing::debug!("Ephemeral run, bookmarks stay in memory");
        return Ok(BookmarkStore::open(Box::new(MemoryStorage::new())));
    }

    let db_path = config.db_path()?;
    tracing::debug!("Opening bookmarks at {}", db_path.display());
    let storage = SqliteStorage::open(&db_path)
        .with_context(|| format!("Failed to open bookmark database {}", db_path.display()))?;
    Ok(BookmarkStore::open(Box::new(storage)))
}

fn print_table(repos: &[&Repository], bookmarks: &BookmarkStore) {
    for repo in repos {
        let marker = if bookmarked(repo, bookmarks) { "★" } else { "☆" };
        println!(
            "{} {:<40} ⭐ {:>7}  {:<12} {}",
            marker,
            repo.full_name,
            format_stars(repo.stars),
            repo.language.as_deref().unwrap_or("-"),
            repo.id
        );
        println!(
            "    {}",
            repo.description
                .as_deref()
                .unwrap_or("No description available")
        );
    }
}

fn print_json(repos: &[&Repository], bookmarks: &BookmarkStore) -> anyhow::Result<()> {
    let rows: Vec<serde_json::Value> = repos
        .iter()
        .map(|repo| -> serde_json::Result<serde_json::Value> {
            let mut row = serde_json::to_value(repo)?;
            if let Some(fields) = row.as_object_mut() {
                fields.insert(
                    "bookmarked".to_string(),
                    serde_json::Value::Bool(bookmarked(repo, bookmarks)),
                );
            }
            Ok(row)
        })
        .collect::<serde_json::Result<_>>()?;

    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn bookmarked(repo: &Repository, bookmarks: &BookmarkStore) -> bool {
    bookmarks.is_bookmarked(repo.id)
}
