//! Interactive session. Plain lines are search queries (debounced like
//! keystrokes); lines starting with `:` are commands.

use marquee_api::{MediaKind, MetadataService, MovieSummary, SortDirection, SortField};
use marquee_core::url_state::ViewParams;
use marquee_core::view::Tab;
use marquee_runtime::{
    DetailSession, DetailStatus, Runtime, RuntimeError, SearchSession, SearchState, SearchStatus,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render;

const HELP: &str = "\
Type a title to search. Commands:
  :page <n>  :next  :prev           move through search results
  :tab search|favorites|later       switch tab
  :year <year|->                    filter by release year
  :type movie|series|episode|-      filter by kind
  :sort year|title|- [asc|desc]     sort the listing
  :fav <n|id>                       toggle favorite
  :later <n|id>                     toggle watch later
  :detail <n|id>                    show full details
  :url                              print a link to this view
  :cache [clear]                    show or clear cached responses
  :help  :quit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Search(String),
    Show,
    Page(u32),
    Next,
    Prev,
    Tab(Tab),
    Year(Option<String>),
    Kind(Option<MediaKind>),
    Sort(Option<SortField>, Option<SortDirection>),
    Favorite(String),
    Later(String),
    Detail(String),
    Url,
    Cache { clear: bool },
    Help,
    Quit,
}

/// `-` (or nothing) clears a filter.
fn clearable(arg: &str) -> Option<&str> {
    let arg = arg.trim();
    (!arg.is_empty() && arg != "-").then_some(arg)
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix(':') else {
        return Ok(if line.is_empty() {
            Command::Show
        } else {
            Command::Search(line.to_string())
        });
    };

    let (name, arg) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let arg = arg.trim();
    let require = |what: &str| {
        if arg.is_empty() {
            Err(format!(":{name} needs {what}"))
        } else {
            Ok(arg.to_string())
        }
    };

    match name {
        "page" | "p" => arg
            .parse::<u32>()
            .ok()
            .filter(|&n| n >= 1)
            .map(Command::Page)
            .ok_or_else(|| format!("invalid page: {arg:?}")),
        "next" | "n" => Ok(Command::Next),
        "prev" => Ok(Command::Prev),
        "tab" | "t" => Tab::parse(arg)
            .map(Command::Tab)
            .ok_or_else(|| format!("unknown tab: {arg:?}")),
        "year" => Ok(Command::Year(clearable(arg).map(str::to_string))),
        "type" => match clearable(arg) {
            None => Ok(Command::Kind(None)),
            Some(kind) => MediaKind::parse(kind)
                .map(|k| Command::Kind(Some(k)))
                .ok_or_else(|| format!("unknown type: {kind:?}")),
        },
        "sort" => {
            let mut words = arg.split_whitespace();
            let field = match words.next().and_then(clearable) {
                None => None,
                Some(f) => Some(SortField::parse(f).ok_or_else(|| format!("unknown sort field: {f:?}"))?),
            };
            let direction = match words.next() {
                None => None,
                Some(d) => Some(SortDirection::parse(d).ok_or_else(|| format!("unknown sort order: {d:?}"))?),
            };
            Ok(Command::Sort(field, direction))
        }
        "fav" | "f" => require("a result number or id").map(Command::Favorite),
        "later" | "l" => require("a result number or id").map(Command::Later),
        "detail" | "d" => require("a result number or id").map(Command::Detail),
        "url" => Ok(Command::Url),
        "cache" => match arg {
            "" => Ok(Command::Cache { clear: false }),
            "clear" => Ok(Command::Cache { clear: true }),
            other => Err(format!("unknown cache action: {other:?}")),
        },
        "help" | "h" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command :{other} (try :help)")),
    }
}

struct Shell<S> {
    rt: Runtime<S>,
    search: SearchSession<S>,
    details: DetailSession<S>,
    params: ViewParams,
    /// Last printed listing, for numbered references.
    listing: Vec<MovieSummary>,
}

impl<S: MetadataService + 'static> Shell<S> {
    fn new(rt: Runtime<S>, params: ViewParams) -> Self {
        let search = rt.search_session();
        let details = rt.detail_session();
        Self {
            rt,
            search,
            details,
            params,
            listing: Vec::new(),
        }
    }

    /// Returns `false` when the session should end.
    async fn handle(&mut self, line: &str) -> bool {
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{message}");
                return true;
            }
        };
        tracing::debug!(?command, "Shell command");

        match command {
            Command::Search(query) => {
                self.params.query = query.clone();
                self.params.page = 1;
                self.params.tab = Tab::Search;
                self.search.search(&query, self.params.search_options());
            }
            Command::Show => self.render(),
            Command::Page(page) => self.go_to_page(page),
            Command::Next => self.go_to_page(self.params.page.saturating_add(1)),
            Command::Prev => self.go_to_page(self.params.page.saturating_sub(1).max(1)),
            Command::Tab(tab) => {
                self.params.tab = tab;
                self.render();
            }
            Command::Year(year) => {
                self.params.year = year;
                self.refilter();
            }
            Command::Kind(kind) => {
                self.params.kind = kind;
                self.refilter();
            }
            Command::Sort(field, direction) => {
                self.params.sort = field;
                if let Some(direction) = direction {
                    self.params.direction = direction;
                }
                self.refilter();
            }
            Command::Favorite(target) => self.toggle_favorite(&target).await,
            Command::Later(target) => self.toggle_watch_later(&target).await,
            Command::Detail(target) => self.show_detail(&target).await,
            Command::Url => {
                let query = self.params.to_query_string();
                if query.is_empty() {
                    println!("?");
                } else {
                    println!("?{query}");
                }
            }
            Command::Cache { clear } => {
                let client = self.rt.client();
                if clear {
                    client.clear_cache();
                    println!("Cache cleared.");
                } else {
                    println!("{} cached responses.", client.cached_entries());
                }
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return false,
        }
        true
    }

    fn go_to_page(&mut self, page: u32) {
        let state = self.search.state();
        if state.query.trim().is_empty() {
            eprintln!("Nothing to page through yet.");
            return;
        }
        if let Some(pagination) = state.pagination() {
            if page > pagination.total_pages {
                eprintln!("Only {} pages.", pagination.total_pages);
                return;
            }
        }
        self.params.page = page;
        self.params.tab = Tab::Search;
        self.search.change_page(page);
    }

    /// Filters narrow the remote search too, so the search tab re-queries.
    fn refilter(&mut self) {
        if self.params.tab == Tab::Search && !self.params.query.trim().is_empty() {
            self.params.page = 1;
            self.search.set_options(self.params.search_options());
        } else {
            self.render();
        }
    }

    /// A number picks from the last listing; anything else is an id.
    fn pick(&self, target: &str) -> Option<MovieSummary> {
        match target.parse::<usize>() {
            Ok(n) if n >= 1 => self.listing.get(n - 1).cloned(),
            _ => None,
        }
    }

    async fn resolve(&self, target: &str) -> Result<MovieSummary, RuntimeError> {
        match self.pick(target) {
            Some(movie) => Ok(movie),
            None => self.rt.resolve_summary(target).await,
        }
    }

    async fn toggle_favorite(&mut self, target: &str) {
        let result = match self.resolve(target).await {
            Ok(movie) => self
                .rt
                .toggle_favorite(movie.clone())
                .map(|now| (movie, now)),
            Err(e) => Err(e),
        };
        match result {
            Ok((movie, true)) => println!("Added \"{}\" to favorites.", movie.title),
            Ok((movie, false)) => println!("Removed \"{}\" from favorites.", movie.title),
            Err(e) => eprintln!("{e}"),
        }
        if self.params.tab == Tab::Favorites {
            self.render();
        }
    }

    async fn toggle_watch_later(&mut self, target: &str) {
        let result = match self.resolve(target).await {
            Ok(movie) => self
                .rt
                .toggle_watch_later(movie.clone())
                .map(|now| (movie, now)),
            Err(e) => Err(e),
        };
        match result {
            Ok((movie, true)) => println!("Added \"{}\" to watch later.", movie.title),
            Ok((movie, false)) => println!("Removed \"{}\" from watch later.", movie.title),
            Err(e) => eprintln!("{e}"),
        }
        if self.params.tab == Tab::WatchLater {
            self.render();
        }
    }

    async fn show_detail(&mut self, target: &str) {
        let id = self
            .pick(target)
            .map(|m| m.id)
            .unwrap_or_else(|| target.to_string());
        let state = self.details.load(Some(&id)).await;
        match (state.status, state.movie) {
            (DetailStatus::Ready, Some(movie)) => {
                let favorite = self.rt.is_favorite(&movie.summary.id);
                let later = self.rt.is_watch_later(&movie.summary.id);
                println!("{}", render::detail(&movie, favorite, later));
            }
            _ => eprintln!(
                "{}",
                state
                    .error
                    .unwrap_or_else(|| "Movie details not found".to_string())
            ),
        }
    }

    fn on_search_state(&mut self, state: &SearchState) {
        match state.status {
            SearchStatus::Idle => {}
            SearchStatus::Ready => {
                self.params.page = state.page;
                if self.params.tab == Tab::Search {
                    self.render_with(state);
                }
            }
            SearchStatus::Loading | SearchStatus::Error => {
                if self.params.tab == Tab::Search {
                    if let Some(status) = render::search_status(state) {
                        println!("{status}");
                    }
                }
            }
        }
    }

    fn render(&mut self) {
        let state = self.search.state();
        self.render_with(&state);
    }

    fn render_with(&mut self, state: &SearchState) {
        let tab = self.params.tab;
        if tab == Tab::Search && state.status != SearchStatus::Ready {
            if let Some(status) = render::search_status(state) {
                println!("{status}");
            }
            return;
        }

        let movies = self.rt.compose(tab, state, &self.params.filter_config());
        println!("{}", render::tab_heading(tab, movies.len(), state));
        if movies.is_empty() {
            match tab {
                Tab::Search => println!("  No results match the current filters."),
                Tab::Favorites => println!("  No favorites yet. Use :fav <n> on a search result."),
                Tab::WatchLater => println!("  Nothing saved to watch later. Use :later <n>."),
            }
        } else {
            let rt = &self.rt;
            print!(
                "{}",
                render::movie_list(&movies, |id| (rt.is_favorite(id), rt.is_watch_later(id)))
            );
        }
        if tab == Tab::Search {
            if let Some(pagination) = state.pagination() {
                println!("{}", render::pagination_line(&pagination));
            }
        }
        self.listing = movies;
    }
}

/// Run the interactive loop until `:quit` or end of input.
pub async fn run<S: MetadataService + 'static>(
    rt: Runtime<S>,
    params: ViewParams,
) -> std::io::Result<()> {
    let mut shell = Shell::new(rt, params);
    let mut updates = shell.search.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if shell.params.query.trim().is_empty() {
        println!("{HELP}");
        if shell.params.tab != Tab::Search {
            shell.render();
        }
    } else {
        let params = shell.params.clone();
        shell
            .search
            .search_now(&params.query, params.search_options(), params.page);
    }

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !shell.handle(&line).await {
                    break;
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                shell.on_search_state(&state);
            }
        }
    }

    tracing::debug!("Shell closed");
    Ok(())
}
