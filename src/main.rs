use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use popcorn::config::{default_config_path, find_config_file, get_config, load_config, Config};
use popcorn::models::{SearchState, WatchedMovie};
use popcorn::session::Session;
use popcorn::ui::{self, Spinner, Status};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// popcorn - search movies, rate them, and keep a watch list
#[derive(Parser, Debug)]
#[command(name = "popcorn")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search movies, rate them, and keep a personal watch list", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v, -vv, -vvv)
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

    /// Request timeout in seconds (overrides the configuration)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Directory holding the watch list (overrides the configuration)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Show all environment variables
    #[arg(long, global = true)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
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
    /// Search for movies by title
    #[command(alias = "s")]
    Search {
        /// Search query
        query: String,
    },

    /// Show a movie's details
    #[command(alias = "d")]
    Details {
        /// Movie id (e.g. tt0372784)
        id: String,
    },

    /// Rate a movie and add it to the watch list
    #[command(alias = "r")]
    Rate {
        /// Movie id (e.g. tt0372784)
        id: String,

        /// Rating from 1 to 10
        #[arg(value_parser = clap::value_parser!(u8).range(1..=10))]
        rating: u8,
    },

    /// Show or edit the watch list
    #[command(alias = "w")]
    Watched {
        #[command(subcommand)]
        command: Option<WatchedCommands>,
    },

    /// Search as you type, one line per edit (default)
    #[command(alias = "i")]
    Interactive,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum WatchedCommands {
    /// List watched movies
    #[command(alias = "ls")]
    List,

    /// Show count and averages
    Summary,

    /// Remove a movie from the list
    #[command(alias = "rm")]
    Remove {
        /// Movie id
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Write a default configuration file
    Init {
        /// Where to write it (default: the user config directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// Print where the configuration is read from
    Path,
}

/// Print all available environment variables
fn print_env_vars() {
    println!("popcorn - Environment Variables");
    println!();
    println!("Provider:");
    println!("  OMDB_API_KEY                      OMDb access key (default: bundled key)");
    println!("  POPCORN_PROVIDER__API_KEY         Same, takes precedence over the config file");
    println!("  POPCORN_PROVIDER__BASE_URL        OMDb base URL (default: https://www.omdbapi.com)");
    println!("  POPCORN_PROVIDER__TIMEOUT_SECS    Request timeout in seconds (default: 30)");
    println!();
    println!("Search:");
    println!("  POPCORN_SEARCH__MIN_QUERY_LEN     Shortest query sent to the provider (default: 3)");
    println!();
    println!("Storage:");
    println!("  POPCORN_STORAGE__DATA_DIR         Directory holding watched.json");
    println!();
    println!("Other Settings:");
    println!("  POPCORN_LOGGING__LEVEL            Default log level (default: warn)");
    println!("  RUST_LOG                          Rust logging filter (e.g. popcorn=debug)");
    std::process::exit(0);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.env {
        print_env_vars();
    }

    // Load configuration from file if specified or found in default locations
    let config_path = cli.config.clone().or_else(find_config_file);
    let mut config = match &config_path {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => get_config()?,
    };
    if let Some(timeout) = cli.timeout {
        config.provider.timeout_secs = timeout;
    }
    if let Some(data_dir) = &cli.data_dir {
        config.storage.data_dir = Some(data_dir.clone());
    }

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("popcorn={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let format = resolve_format(cli.output);

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Search { query } => {
            let mut session = Session::from_config(&config)?;
            let started = Instant::now();
            session.set_query(query.clone());

            let spinner = (!cli.quiet && ui::is_terminal() && session.search_state().is_loading)
                .then(|| Spinner::new(&format!("Searching for \"{}\"", query)));
            let state = session.settled().await;
            if let Some(spinner) = spinner {
                spinner.clear();
            }

            if query.chars().count() < config.search.min_query_len && !cli.quiet {
                ui::print_status(
                    Status::Info,
                    &format!(
                        "Type at least {} characters to search",
                        config.search.min_query_len
                    ),
                );
            }
            if format == OutputFormat::Table && !cli.quiet && state.error.is_none() {
                ui::print_search_header(&query, state.results.len(), started.elapsed());
            }
            output_search(&state, format)?;
            search_outcome(&state)?;
        }

        Commands::Details { id } => {
            let mut session = Session::from_config(&config)?;
            session.select(&id);
            let details = session.load_details().await?;
            let user_rating = session.watchlist().user_rating(&details.imdb_id);

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&details)?),
                _ => ui::print_details_box(&details, user_rating),
            }
        }

        Commands::Rate { id, rating } => {
            let mut session = Session::from_config(&config)?;
            session.select(&id);
            let details = session.load_details().await?;
            session.rate(rating)?;
            let watched = session.add_selected().await?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&watched)?),
                _ if !cli.quiet => ui::print_status(
                    Status::Success,
                    &format!(
                        "Added {} ({}) with rating {}",
                        details.title, details.year, watched.user_rating
                    ),
                ),
                _ => {}
            }
        }

        Commands::Watched { command } => {
            let mut session = Session::from_config(&config)?;
            match command.unwrap_or(WatchedCommands::List) {
                WatchedCommands::List => output_watched(session.watchlist().entries(), format)?,
                WatchedCommands::Summary => {
                    let summary = session.watchlist().summary();
                    match format {
                        OutputFormat::Json => {
                            println!("{}", serde_json::to_string_pretty(&summary)?)
                        }
                        _ => ui::print_watch_summary(&summary),
                    }
                }
                WatchedCommands::Remove { id } => {
                    if session.remove_watched(&id)? {
                        if !cli.quiet {
                            ui::print_status(Status::Success, &format!("Removed {}", id));
                        }
                    } else {
                        ui::print_status(
                            Status::Warning,
                            &format!("{} is not in your watch list", id),
                        );
                    }
                }
            }
        }

        Commands::Interactive => {
            let session = Session::from_config(&config)?;
            run_interactive(session, config.search.min_query_len).await?;
        }

        Commands::Config { command } => match command {
            ConfigCommands::Init { path, force } => {
                let path = path.unwrap_or_else(default_config_path);
                if path.exists() && !force {
                    anyhow::bail!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    );
                }
                Config::default().save(&path)?;
                ui::print_status(
                    Status::Success,
                    &format!("Wrote {}", path.display()),
                );
            }
            ConfigCommands::Show => println!("{}", toml::to_string_pretty(&config)?),
            ConfigCommands::Path => {
                match &config_path {
                    Some(path) => println!("config: {}", path.display()),
                    None => println!("config: (none, using defaults)"),
                }
                println!("data:   {}", config.storage.data_dir().display());
            }
        },
    }

    Ok(())
}

fn resolve_format(format: OutputFormat) -> OutputFormat {
    if format == OutputFormat::Auto {
        if std::io::stdout().is_terminal() {
            OutputFormat::Table
        } else {
            OutputFormat::Json
        }
    } else {
        format
    }
}

fn output_search(state: &SearchState, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(state)?);
        return Ok(());
    }

    if state.error.is_some() {
        return Ok(());
    }

    match format {
        OutputFormat::Plain => {
            for movie in &state.results {
                println!("{}\t{}\t{}", movie.imdb_id, movie.title, movie.year);
            }
        }
        _ => {
            use comfy_table::{Attribute, Cell, Table};
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["#", "Title", "Year", "ID"]);

            for (i, movie) in state.results.iter().enumerate() {
                table.add_row(vec![
                    Cell::new(i + 1),
                    Cell::new(ui::truncate_with_ellipsis(&movie.title, 50))
                        .add_attribute(Attribute::Bold),
                    Cell::new(&movie.year),
                    Cell::new(&movie.imdb_id),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}

/// Fail the command when the search settled with an error message
fn search_outcome(state: &SearchState) -> Result<()> {
    match &state.error {
        Some(error) => anyhow::bail!("{}", error),
        None => Ok(()),
    }
}

fn output_watched(movies: &[WatchedMovie], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(movies)?),
        OutputFormat::Plain => {
            for movie in movies {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    movie.imdb_id, movie.title, movie.imdb_rating, movie.user_rating, movie.runtime
                );
            }
        }
        _ => {
            use comfy_table::{Attribute, Cell, Table};
            if movies.is_empty() {
                ui::print_status(Status::Info, "Your watch list is empty");
                return Ok(());
            }
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["ID", "Title", "Year", "IMDb", "You", "Runtime"]);

            for movie in movies {
                table.add_row(vec![
                    Cell::new(&movie.imdb_id),
                    Cell::new(ui::truncate_with_ellipsis(&movie.title, 40))
                        .add_attribute(Attribute::Bold),
                    Cell::new(&movie.year),
                    Cell::new(format!("{:.1}", movie.imdb_rating)),
                    Cell::new(movie.user_rating),
                    Cell::new(format!("{} min", movie.runtime)),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}

/// A line typed in interactive mode
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    /// New value of the search box
    Query(String),
    Open(String),
    Close,
    Rate(String),
    Add,
    Watched,
    Summary,
    Remove(String),
    Retry,
    Help,
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let Some(command) = line.trim().strip_prefix(':') else {
        return Input::Query(line.trim_end_matches(['\r', '\n']).to_string());
    };

    let mut parts = command.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).unwrap_or_default().to_string();

    match name {
        "open" | "o" => Input::Open(arg),
        "close" | "c" => Input::Close,
        "rate" | "r" => Input::Rate(arg),
        "add" | "a" => Input::Add,
        "watched" | "w" => Input::Watched,
        "summary" => Input::Summary,
        "remove" | "rm" => Input::Remove(arg),
        "retry" => Input::Retry,
        "help" | "h" | "?" => Input::Help,
        "quit" | "q" | "exit" => Input::Quit,
        other => Input::Unknown(other.to_string()),
    }
}

async fn run_interactive(mut session: Session, min_query_len: usize) -> Result<()> {
    ui::print_banner();

    let mut updates = session.controller().subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shown_epoch = 0;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Input::Quit => break,
                    input => handle_input(&mut session, input).await,
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                render_state(&state, min_query_len, &mut shown_epoch);
            }
        }
    }

    session.close();
    Ok(())
}

/// Print a state once it has settled; each request is printed at most once
fn render_state(state: &SearchState, min_query_len: usize, shown_epoch: &mut u64) {
    if state.is_loading {
        ui::print_status(Status::Loading, "Loading...");
        return;
    }
    if state.epoch() == *shown_epoch || state.query.is_empty() {
        return;
    }
    *shown_epoch = state.epoch();

    if let Some(error) = &state.error {
        ui::print_status(Status::Error, error);
    } else if state.query.chars().count() < min_query_len {
        ui::print_status(Status::Info, "Keep typing...");
    } else {
        println!("Found {} results", state.len().to_string().bold());
        ui::print_movie_list(&state.results);
    }
}

async fn handle_input(session: &mut Session, input: Input) {
    let result: Result<()> = async {
        match input {
            Input::Query(query) => session.set_query(query),
            Input::Open(target) => {
                let id = resolve_target(session, &target)?;
                if session.select(&id) {
                    let details = session.load_details().await?;
                    let rating = session.watchlist().user_rating(&id);
                    ui::print_details_box(&details, rating);
                } else {
                    ui::print_status(Status::Info, "Closed");
                }
            }
            Input::Close => session.close(),
            Input::Rate(arg) => {
                let rating: u8 = arg
                    .parse()
                    .with_context(|| format!("not a rating: {:?}", arg))?;
                session.rate(rating)?;
                ui::print_status(Status::Star, &format!("Rating set to {}", rating));
            }
            Input::Add => {
                let watched = session.add_selected().await?;
                ui::print_status(
                    Status::Success,
                    &format!("Added {} to your list", watched.title),
                );
            }
            Input::Watched => {
                ui::print_watch_summary(&session.watchlist().summary());
                ui::print_watched(session.watchlist().entries());
            }
            Input::Summary => ui::print_watch_summary(&session.watchlist().summary()),
            Input::Remove(id) => {
                if session.remove_watched(&id)? {
                    ui::print_status(Status::Success, &format!("Removed {}", id));
                } else {
                    ui::print_status(Status::Warning, &format!("{} is not in your list", id));
                }
            }
            Input::Retry => session.retry(),
            Input::Help => ui::print_banner(),
            Input::Unknown(name) => {
                ui::print_status(Status::Warning, &format!("Unknown command :{}", name))
            }
            Input::Quit => {}
        }
        Ok(())
    }
    .await;

    if let Err(e) = result {
        ui::print_status(Status::Error, &e.to_string());
    }
}

/// Turn `:open` arguments into a movie id: a 1-based result number or an id
fn resolve_target(session: &Session, target: &str) -> Result<String> {
    if target.is_empty() {
        anyhow::bail!("usage: :open <result number | movie id>");
    }
    match target.parse::<usize>() {
        Ok(n) => session
            .search_state()
            .results
            .get(n.wrapping_sub(1))
            .map(|m| m.imdb_id.clone())
            .with_context(|| format!("no result number {}", n)),
        Err(_) => Ok(target.to_string()),
    }
}
