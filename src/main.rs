use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::Terminal;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tui_dispatch::{EffectStoreLike, EffectStoreWithMiddleware, EventOutcome, RenderContext};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem};

use pokedex::action::Action;
use pokedex::api::{HttpSource, RemoteSource, DEFAULT_API_BASE};
use pokedex::effect::Effect;
use pokedex::ids;
use pokedex::loader::handle_effect;
use pokedex::reducer::reducer;
use pokedex::state::AppState;
use pokedex::store::CacheStore;
use pokedex::ui;

#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(about = "Kanto Pokedex backed by PokeAPI with an on-disk cache")]
struct Args {
    #[command(flatten)]
    debug: DebugCliArgs,
    /// PokeAPI base URL
    #[arg(long, default_value = DEFAULT_API_BASE)]
    api_base: String,
    /// Directory holding the cached namespaces
    #[arg(long)]
    cache_dir: Option<PathBuf>,
    /// Directory for pokedex.log (defaults to the cache directory)
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// Catalog index shown first (0 = #001)
    #[arg(long, default_value_t = 0, value_parser = parse_start)]
    start: usize,
}

fn parse_start(raw: &str) -> Result<usize, String> {
    let index: usize = raw.parse().map_err(|e| format!("{e}"))?;
    if ids::is_valid_index(index) {
        Ok(index)
    } else {
        Err(format!("expected 0..={}", ids::CATALOG_SIZE - 1))
    }
}

fn data_dir() -> PathBuf {
    let base = dirs_next::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("pokedex")
}

/// The terminal belongs to the TUI, so logs go to a file.
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    let appender = tracing_appender::rolling::never(log_dir, "pokedex.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    guard
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    let cache_dir = args.cache_dir.clone().unwrap_or_else(data_dir);
    let log_dir = args.log_dir.clone().unwrap_or_else(|| cache_dir.clone());
    std::fs::create_dir_all(&log_dir)?;
    let _log_guard = init_tracing(&log_dir);

    let debug = DebugSession::new(args.debug);
    debug.save_state_schema::<AppState>().map_err(debug_error)?;
    debug.save_actions_schema::<Action>().map_err(debug_error)?;

    let start = args.start;
    let mut state = debug
        .load_state_or_else_async(|| async move {
            Ok::<AppState, io::Error>(AppState::default().with_selection(start))
        })
        .await
        .map_err(debug_error)?;
    state.cache = CacheStore::file(&cache_dir);
    state.settle_restored();
    info!(cache_dir = %cache_dir.display(), api_base = %args.api_base, "starting");

    let source: Arc<dyn RemoteSource> = Arc::new(HttpSource::new(args.api_base.clone()));

    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions, source).await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
    source: Arc<dyn RemoteSource>,
) -> io::Result<DebugRunOutput<AppState>> {
    debug
        .run_effect_app(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |_runtime| {},
            |frame, area, state, _render_ctx: RenderContext| {
                ui::render(frame, area, state);
            },
            |event, state| -> EventOutcome<Action> { ui::handle_event(event, state) },
            |action| matches!(action, Action::Quit),
            move |effect, ctx| handle_effect(effect, ctx, source.clone()),
        )
        .await
}
