// Terminal binary for Citadex

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use env_logger::Env;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io,
    path::Path,
    time::{Duration, Instant},
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::JoinHandle;

use citadex::{
    app::{App, InputMode},
    catalog::CatalogClient,
    config,
    favorites::FavoritesStore,
    fetch::{self, FetchRequest},
    router, theme,
    types::AppEvent,
    ui,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    let _ = dotenvy::dotenv();

    let cfg = config::load().context("Failed to load configuration")?;

    // Logging goes to a file in the state dir; stderr belongs to the TUI.
    init_logging(&cfg.state_dir).context("Failed to initialize logging")?;
    log::info!("citadex starting, state dir {}", cfg.state_dir.display());

    // Persistent state. Subscribing before the store moves into the app
    // gives the loop a snapshot stream of every membership change.
    let mut store = FavoritesStore::load(&cfg.state_dir);
    let favorites_rx = store.subscribe();
    let active_theme = cfg
        .theme_override
        .or_else(|| theme::load_saved(&cfg.state_dir))
        .unwrap_or_default();

    // terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // app + channels
    let (tx, rx) = unbounded_channel::<AppEvent>();
    let (fetch_tx, fetch_rx) = unbounded_channel::<FetchRequest>();

    let client = CatalogClient::new(&cfg.api_base, cfg.timeout_ms, cfg.retries as u8);
    let fetch_task: JoinHandle<Result<()>> =
        tokio::spawn(async move { fetch::run_fetch_worker(client, fetch_rx, tx).await });

    let mut app = App::new(
        cfg.render_fps,
        cfg.render_fps_choices.clone(),
        cfg.debounce_ms,
        cfg.state_dir.clone(),
        store,
        active_theme,
        fetch_tx,
    );

    // Startup route: an explicit citadex:// link or the default catalog view.
    // Example: ./citadex citadex://v1/characters?q=rick&status=alive
    match cfg.startup_link.as_deref().and_then(router::parse) {
        Some(route) => {
            log::info!(
                "Applied deep link route from CLI: {}",
                cfg.startup_link.as_deref().unwrap_or_default()
            );
            app.apply_route(route);
        }
        None => {
            if let Some(link) = cfg.startup_link.as_deref() {
                log::warn!("unrecognized link argument: {link}");
                app.show_error_toast(format!("Unrecognized link: {link}"));
            }
            app.schedule_page_fetch();
        }
    }

    // main loop
    let loop_result = run_loop(&mut app, &mut terminal, rx, favorites_rx).await;

    // cleanup
    fetch_task.abort();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    loop_result
}

/// Route log records to a file inside the state directory. The alternate
/// screen owns stdout/stderr while the app runs.
fn init_logging(state_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(state_dir)
        .with_context(|| format!("creating state dir {}", state_dir.display()))?;
    let log_path = state_dir.join("citadex.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening log file {}", log_path.display()))?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();
    Ok(())
}

async fn run_loop(
    app: &mut App,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut rx: UnboundedReceiver<AppEvent>,
    mut favorites_rx: UnboundedReceiver<Vec<u64>>,
) -> Result<()> {
    let mut last_frame = Instant::now();

    loop {
        // frame budget (coalesced renders)
        let frame_ms = 1000u32.saturating_div(app.fps()) as u64;
        let budget = Duration::from_millis(frame_ms.max(1));
        let wait = budget.saturating_sub(last_frame.elapsed());

        // input
        if event::poll(wait)? {
            match event::read()? {
                Event::Key(k) => {
                    if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                        handle_key(app, k);
                    }
                }
                _ => {}
            }
        }

        // fetch worker events
        while let Ok(ev) = rx.try_recv() {
            app.on_event(ev);
        }

        // favorites snapshots (the app owns the store; this stream is for
        // observability and anything else that cares about membership)
        while let Ok(ids) = favorites_rx.try_recv() {
            log::debug!("favorites snapshot: {} saved", ids.len());
        }

        // debounced search: commit once typing has paused long enough
        if app.maybe_commit_search() {
            app.log_debug(format!("[SEARCH] committed '{}'", app.query().search()));
        }

        if last_frame.elapsed() >= budget {
            terminal.draw(|f| ui::draw(f, app))?;
            last_frame = Instant::now();
        }
        if app.quit_flag() {
            break;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, k: KeyEvent) {
    // Search input mode captures typing before anything else
    if app.input_mode() == InputMode::Search {
        match k.code {
            KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
                app.on_event(AppEvent::Quit);
            }
            KeyCode::Char(c) => app.search_push(c),
            KeyCode::Backspace => app.search_backspace(),
            KeyCode::Enter => app.search_submit(),
            KeyCode::Esc => app.search_exit(),
            _ => {}
        }
        return;
    }

    // Normal mode keys
    match (k.code, k.modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.on_event(AppEvent::Quit);
        }

        // Screen switching
        (KeyCode::Tab, _) => app.switch_screen(),
        (KeyCode::Esc, _) => app.back(),

        // Navigation within the current screen
        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => app.move_selection(-1),
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => app.move_selection(1),
        (KeyCode::PageUp, _) => app.move_selection(-10),
        (KeyCode::PageDown, _) => app.move_selection(10),
        (KeyCode::Left, _) | (KeyCode::Char('h'), _) => app.prev_page(),
        (KeyCode::Right, _) | (KeyCode::Char('l'), _) => app.next_page(),
        (KeyCode::Enter, _) => app.open_selected_detail(),

        // Query controls
        (KeyCode::Char('/'), _) => app.open_search(),
        (KeyCode::Char('s'), _) => app.cycle_status_filter(),
        (KeyCode::Char('o'), KeyModifiers::CONTROL) => app.cycle_fps(),
        (KeyCode::Char('o'), _) => app.toggle_sort(),
        (KeyCode::Char('r'), _) => app.retry(),

        // Favorites / theme / links
        (KeyCode::Char('f'), _) => app.toggle_selected_favorite(),
        (KeyCode::Char('t'), _) => app.toggle_theme(),
        (KeyCode::Char('y'), _) | (KeyCode::Char('c'), _) => app.copy_current_link(),

        (KeyCode::Char('d'), KeyModifiers::CONTROL) => app.toggle_debug(),
        _ => {}
    }
}
