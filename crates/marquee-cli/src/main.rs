mod render;
mod shell;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use marquee_api::omdb::OmdbClient;
use marquee_api::{MediaKind, SortDirection, SortField};
use marquee_core::config::AppConfig;
use marquee_core::url_state::ViewParams;
use marquee_core::view::{FilterConfig, Tab};
use marquee_runtime::{require_api_key, DetailStatus, Runtime, SearchState, SearchStatus};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error>;

#[derive(Parser)]
#[command(name = "marquee")]
#[command(about = "Search movies and keep favorites and a watch-later list")]
#[command(version)]
struct Cli {
    /// Config file (default: platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search titles by name
    #[command(visible_alias = "s")]
    Search {
        /// Title to search for
        #[arg(required = true)]
        query: Vec<String>,

        /// Result page (10 per page)
        #[arg(short, long, default_value = "1")]
        page: u32,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show full details for a title
    #[command(visible_alias = "d")]
    Detail {
        /// IMDb id (e.g. tt1375666)
        id: String,

        /// Also open the IMDb page in a browser
        #[arg(long)]
        open: bool,
    },

    /// Manage favorites
    #[command(subcommand, visible_alias = "fav")]
    Favorites(FavoritesCommand),

    /// Manage the watch-later list
    #[command(subcommand)]
    Later(LaterCommand),

    /// Interactive search session
    Shell {
        /// Restore a view from a query string printed by `:url`
        #[arg(long)]
        from: Option<String>,
    },
}

#[derive(Subcommand)]
enum FavoritesCommand {
    /// List favorites
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Add or remove a title
    Toggle {
        /// IMDb id
        id: String,
    },
}

#[derive(Subcommand)]
enum LaterCommand {
    /// List saved titles
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Save a title to watch later
    Add {
        /// IMDb id
        id: String,
    },
    /// Remove a title
    #[command(visible_alias = "rm")]
    Remove {
        /// IMDb id
        id: String,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Only this release year
    #[arg(short, long)]
    year: Option<String>,

    /// movie, series or episode
    #[arg(short = 't', long = "type")]
    kind: Option<MediaKind>,

    /// Sort by year or title
    #[arg(long)]
    sort: Option<SortField>,

    /// asc or desc
    #[arg(long, default_value = "asc")]
    order: SortDirection,
}

impl FilterArgs {
    fn config(&self) -> FilterConfig {
        FilterConfig {
            year: self.year.clone(),
            kind: self.kind,
            sort: self.sort,
            direction: self.order,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _guard = init_tracing(&config, cli.verbose);

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "Command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr, or to a daily file under the data directory when
/// `general.log_to_file` is set. The guard must live until exit.
fn init_tracing(config: &AppConfig, verbose: u8) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => config.general.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if config.general.log_to_file {
        let dir = AppConfig::data_dir().join("logs");
        let appender = tracing_appender::rolling::daily(dir, "marquee.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_writer(writer)
            .with_env_filter(filter)
            .with_ansi(false)
            .init();
        Some(guard)
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .with_target(false)
            .init();
        None
    }
}

async fn run(command: Commands, config: AppConfig) -> Result<(), BoxError> {
    let needs_network = matches!(
        command,
        Commands::Search { .. }
            | Commands::Detail { .. }
            | Commands::Shell { .. }
            | Commands::Favorites(FavoritesCommand::Toggle { .. })
            | Commands::Later(LaterCommand::Add { .. })
    );
    if needs_network {
        require_api_key(&config)?;
    }
    let mut rt = Runtime::from_config(config)?;

    match command {
        Commands::Search {
            query,
            page,
            filter,
        } => cmd_search(&rt, &query, page, &filter.config()).await,
        Commands::Detail { id, open } => cmd_detail(&rt, &id, open).await,
        Commands::Favorites(FavoritesCommand::List { filter }) => {
            cmd_list(&rt, Tab::Favorites, &filter.config());
            Ok(())
        }
        Commands::Favorites(FavoritesCommand::Toggle { id }) => {
            let (movie, now) = rt.toggle_favorite_by_id(&id).await?;
            if now {
                println!("Added \"{}\" to favorites.", movie.title);
            } else {
                println!("Removed \"{}\" from favorites.", movie.title);
            }
            Ok(())
        }
        Commands::Later(LaterCommand::List { filter }) => {
            cmd_list(&rt, Tab::WatchLater, &filter.config());
            Ok(())
        }
        Commands::Later(LaterCommand::Add { id }) => {
            let (movie, inserted) = rt.add_watch_later_by_id(&id).await?;
            if inserted {
                println!("Saved \"{}\" to watch later.", movie.title);
            } else {
                println!("\"{}\" is already saved.", movie.title);
            }
            Ok(())
        }
        Commands::Later(LaterCommand::Remove { id }) => {
            if rt.remove_watch_later(&id)? {
                println!("Removed {id} from watch later.");
            } else {
                println!("{id} was not saved.");
            }
            Ok(())
        }
        Commands::Shell { from } => {
            let params = from.as_deref().map(ViewParams::parse).unwrap_or_default();
            shell::run(rt, params).await?;
            Ok(())
        }
    }
}

/// Join the positional search words. `None` when nothing but whitespace
/// was given, since a blank query never issues a request.
fn search_terms(words: &[String]) -> Option<String> {
    let query = words.join(" ");
    let query = query.trim();
    (!query.is_empty()).then(|| query.to_string())
}

async fn cmd_search(
    rt: &Runtime<OmdbClient>,
    words: &[String],
    page: u32,
    filter: &FilterConfig,
) -> Result<(), BoxError> {
    let Some(query) = search_terms(words) else {
        return Err("Please enter a search term".into());
    };

    let session = rt.search_session();
    let mut updates = session.subscribe();
    session.search_now(&query, filter.search_options(), page);
    let state = updates.wait_for(|s| s.is_settled()).await?.clone();

    if state.status == SearchStatus::Error {
        return Err(state
            .error
            .unwrap_or_else(|| "No movies found".to_string())
            .into());
    }

    let movies = rt.compose(Tab::Search, &state, filter);
    println!("{}", render::tab_heading(Tab::Search, movies.len(), &state));
    print!(
        "{}",
        render::movie_list(&movies, |id| (rt.is_favorite(id), rt.is_watch_later(id)))
    );
    if let Some(pagination) = state.pagination() {
        println!("{}", render::pagination_line(&pagination));
    }
    Ok(())
}

async fn cmd_detail(rt: &Runtime<OmdbClient>, id: &str, open: bool) -> Result<(), BoxError> {
    let session = rt.detail_session();
    let state = session.load(Some(id)).await;
    let movie = match (state.status, state.movie) {
        (DetailStatus::Ready, Some(movie)) => movie,
        _ => {
            return Err(state
                .error
                .unwrap_or_else(|| "Movie details not found".to_string())
                .into())
        }
    };

    let movie_id = &movie.summary.id;
    println!(
        "{}",
        render::detail(&movie, rt.is_favorite(movie_id), rt.is_watch_later(movie_id))
    );

    if open {
        let url = render::imdb_url(movie_id);
        tracing::debug!(%url, "Opening browser");
        open::that(&url)?;
    }
    Ok(())
}

fn cmd_list(rt: &Runtime<OmdbClient>, tab: Tab, filter: &FilterConfig) {
    let empty = SearchState::default();
    let movies = rt.compose(tab, &empty, filter);
    println!("{}", render::tab_heading(tab, movies.len(), &empty));
    if movies.is_empty() {
        println!("  (empty)");
        return;
    }
    print!(
        "{}",
        render::movie_list(&movies, |id| (rt.is_favorite(id), rt.is_watch_later(id)))
    );
}
