//! newsfeed - replay a news reading session against offline data
//!
//! Drives the home feed or search through either the state machine or the
//! pager and prints every state it observes.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::watch;

use newsfeed::config::Config;
use newsfeed::fixture::FixtureStore;
use newsfeed::home::{self, ArticlesState, HomeEvent, HomeFeed, HomeState};
use newsfeed::logging::init_tracing;
use newsfeed::news::Article;
use newsfeed::paging::{DataState, PageSnapshot, PagingState, SnapshotSubscription};
use newsfeed::search::{self, SearchEvent, SearchFeed, SearchResults, SearchState};
use newsfeed::session::SessionScope;

#[derive(Parser, Debug)]
#[command(name = "newsfeed")]
#[command(version)]
#[command(about = "Replay a news reading session against a JSON fixture")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: ~/.config/newsfeed/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON file with `sources` and `articles`
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    /// Number of pages to load, counting the first
    #[arg(long, default_value_t = 1, global = true)]
    pages: u32,

    /// Which rendition of the feature to drive
    #[arg(long, value_enum, default_value_t = Mode::Machine, global = true)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Top headlines, optionally filtered by a source id
    Home {
        #[arg(long)]
        source: Option<String>,
    },

    /// Search articles by text
    Search { query: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Machine,
    Pager,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    let store = match &cli.fixture {
        Some(path) => FixtureStore::from_path(path)
            .with_context(|| format!("Failed to load fixture {}", path.display()))?,
        None => {
            tracing::warn!("No fixture given, every feed will be empty");
            FixtureStore::default()
        }
    };

    let pages = cli.pages.max(1);
    match (cli.command, cli.mode) {
        (Command::Home { source }, Mode::Machine) => {
            home_machine(&config, store, source, pages).await
        }
        (Command::Home { source }, Mode::Pager) => home_pager(&config, store, source, pages).await,
        (Command::Search { query }, Mode::Machine) => {
            search_machine(&config, store, query, pages).await
        }
        (Command::Search { query }, Mode::Pager) => {
            search_pager(&config, store, query, pages).await
        }
    }
}

async fn home_machine(
    config: &Config,
    store: FixtureStore,
    source: Option<String>,
    pages: u32,
) -> Result<()> {
    let store = Arc::new(store);
    let registry = home::registry(
        store.clone(),
        store,
        config.paging.page_size,
        config.dispatch.unmatched,
    )?;
    let session = SessionScope::new();
    let machine = home::launch(registry, &session);
    let printer = print_states(machine.subscribe(), describe_home);

    machine.settled().await;

    if let Some(id) = source {
        let item = machine
            .state()
            .sources
            .items()
            .and_then(|sources| sources.iter().find(|source| source.id == id).cloned());
        match item {
            Some(item) => {
                machine.dispatch(HomeEvent::SelectSource(Some(item)));
                machine.settled().await;
            }
            None => tracing::warn!(source = %id, "Unknown source, showing all"),
        }
    }

    for _ in 1..pages {
        if !machine.state().articles.can_load_more() {
            break;
        }
        machine.dispatch(HomeEvent::LoadMore);
        machine.settled().await;
    }

    session.close();
    drop(machine);
    let _ = printer.await;
    Ok(())
}

async fn search_machine(
    config: &Config,
    store: FixtureStore,
    query: String,
    pages: u32,
) -> Result<()> {
    let registry = search::registry(
        Arc::new(store),
        config.paging.page_size,
        config.search.debounce(),
        config.dispatch.unmatched,
    )?;
    let session = SessionScope::new();
    let machine = search::launch(registry, &session);
    let mut states = machine.subscribe();
    let printer = print_states(states.clone(), describe_search);

    let searching = !query.trim().is_empty();
    machine.dispatch(SearchEvent::QueryChanged(query));
    if searching {
        // Wait out the debounce window.
        let _ = states
            .wait_for(|state| {
                !matches!(state.results, SearchResults::Idle | SearchResults::Loading)
            })
            .await;
    }
    machine.settled().await;

    for _ in 1..pages {
        if !machine.state().results.can_load_more() {
            break;
        }
        machine.dispatch(SearchEvent::LoadMore);
        machine.settled().await;
    }

    session.close();
    drop(machine);
    let _ = printer.await;
    Ok(())
}

async fn home_pager(
    config: &Config,
    store: FixtureStore,
    source: Option<String>,
    pages: u32,
) -> Result<()> {
    let store = Arc::new(store);
    let feed = HomeFeed::new(
        store.clone(),
        store,
        config.paging.page_size,
        config.paging.pager_options(),
    );
    let mut snapshots = feed.subscribe();
    print_snapshot(&settle(&mut snapshots).await);

    if let Some(id) = source {
        let mut sources = feed.sources();
        let loaded = sources
            .wait_for(|sources| !matches!(sources, home::SourcesState::Loading))
            .await
            .ok()
            .and_then(|sources| {
                sources
                    .items()
                    .and_then(|items| items.iter().find(|source| source.id == id).cloned())
            });
        match loaded {
            Some(item) => {
                feed.select_source(Some(item)).finished().await;
                print_snapshot(&snapshots.current());
            }
            None => tracing::warn!(source = %id, "Unknown source, showing all"),
        }
    }

    for _ in 1..pages {
        let request = feed.load_more();
        if request.is_skipped() {
            break;
        }
        request.finished().await;
        print_snapshot(&snapshots.current());
    }

    feed.close();
    Ok(())
}

async fn search_pager(
    config: &Config,
    store: FixtureStore,
    query: String,
    pages: u32,
) -> Result<()> {
    let feed = SearchFeed::new(
        Arc::new(store),
        config.paging.page_size,
        config.search.debounce(),
        config.paging.pager_options(),
    );
    let mut snapshots = feed.subscribe();
    settle(&mut snapshots).await;

    feed.submit(query).finished().await;
    print_snapshot(&snapshots.current());

    for _ in 1..pages {
        let request = feed.load_more();
        if request.is_skipped() {
            break;
        }
        request.finished().await;
        print_snapshot(&snapshots.current());
    }

    feed.close();
    Ok(())
}

async fn settle(snapshots: &mut SnapshotSubscription<Article>) -> PageSnapshot<Article> {
    snapshots
        .wait_for(|snapshot| !snapshot.data_state.is_loading())
        .await
        .unwrap_or_else(|| snapshots.current())
}

/// Print every state the receiver observes until the machine goes away.
fn print_states<S>(
    mut states: watch::Receiver<S>,
    describe: fn(&S) -> String,
) -> tokio::task::JoinHandle<()>
where
    S: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut last = describe(&states.borrow_and_update());
        println!("{last}");
        while states.changed().await.is_ok() {
            let line = describe(&states.borrow_and_update());
            if line != last {
                println!("{line}");
                last = line;
            }
        }
    })
}

fn print_snapshot(snapshot: &PageSnapshot<Article>) {
    let data = match &snapshot.data_state {
        DataState::Loading => "loading".to_string(),
        DataState::Success(items) => format!("{} articles", items.len()),
        DataState::Error(message) => format!("error: {message}"),
    };
    let page = snapshot
        .current_page
        .map_or_else(|| "-".to_string(), |page| page.to_string());
    println!("page={page} state={:?} {data}", snapshot.page_state);
    for article in snapshot.items() {
        println!("  {} ({})", article.title, article.source.name);
    }
}

fn describe_paging(paging: &PagingState) -> String {
    match paging {
        PagingState::Idle { current_page } => format!("idle@{current_page}"),
        PagingState::Loading => "loading".to_string(),
        PagingState::Error {
            message,
            current_page,
        } => format!("error@{current_page}: {message}"),
        PagingState::EndReached => "end".to_string(),
    }
}

fn describe_articles(out: &mut String, articles: &[Article]) {
    for article in articles {
        let _ = write!(out, "\n  {} ({})", article.title, article.source.name);
    }
}

fn describe_home(state: &HomeState) -> String {
    let sources = match &state.sources {
        home::SourcesState::Loading => "loading".to_string(),
        home::SourcesState::Success(items) => items.len().to_string(),
        home::SourcesState::Error(message) => format!("error: {message}"),
    };
    let selected = state
        .selected_source
        .as_ref()
        .map_or("all", |source| source.id.as_str());

    let mut out = format!("sources={sources} selected={selected} refresh={:?} ", state.refresh);
    match &state.articles {
        ArticlesState::Loading => out.push_str("articles=loading"),
        ArticlesState::Error(message) => {
            let _ = write!(out, "articles=error: {message}");
        }
        ArticlesState::Success { articles, paging } => {
            let _ = write!(out, "articles={} paging={}", articles.len(), describe_paging(paging));
            describe_articles(&mut out, articles);
        }
    }
    out
}

fn describe_search(state: &SearchState) -> String {
    let mut out = format!("query={:?} ", state.query);
    match &state.results {
        SearchResults::Idle => out.push_str("results=idle"),
        SearchResults::Loading => out.push_str("results=loading"),
        SearchResults::Empty => out.push_str("results=empty"),
        SearchResults::Error(message) => {
            let _ = write!(out, "results=error: {message}");
        }
        SearchResults::Success { articles, paging } => {
            let _ = write!(out, "results={} paging={}", articles.len(), describe_paging(paging));
            describe_articles(&mut out, articles);
        }
    }
    out
}
