mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::refresher::PeriodicRefresher;
use crate::state::session::{SessionWatchdog, WatchdogHandle};
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::{error, info};
use playoff_api::SeasonType;
use playoff_api::auth::SessionState;
use playoff_api::client::PlayoffApi;
use playoff_api::store::{LoadRequest, PlayoffBracketStore};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

#[derive(Debug, PartialEq)]
enum CliAction {
    Run,
    Dump,
    Help,
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut settings = AppSettings::load();
    let action = match parse_cli_args(std::env::args().skip(1), &mut settings) {
        Ok(action) => action,
        Err(message) => {
            eprintln!("{message}\n\n{}", usage_text());
            std::process::exit(2);
        }
    };

    match action {
        CliAction::Help => {
            println!("{}", usage_text());
            return Ok(());
        }
        CliAction::Version => {
            println!("playofftui {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        CliAction::Dump => return dump_bracket(&settings).await,
        CliAction::Run => {}
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Error)?;
    tui_logger::set_default_level(log::LevelFilter::Error);

    let client = PlayoffApi::with_base_url(settings.api_url.clone());
    let credentials = settings.credentials.clone();
    let app = Arc::new(Mutex::new(App::new(settings)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(client, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Periodic bracket refresh thread (every 60s)
    let periodic_updater = PeriodicRefresher::new(ui_event_tx.clone());
    let periodic_task = tokio::spawn(periodic_updater.run());

    if let Some((user_name, password)) = credentials {
        let _ = network_req_tx
            .send(NetworkRequest::Login { user_name, password })
            .await;
    }

    // Trigger bracket load on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();
    periodic_task.abort();

    Ok(())
}

/// Flags override whatever the environment set.
fn parse_cli_args(
    args: impl IntoIterator<Item = String>,
    settings: &mut AppSettings,
) -> Result<CliAction, String> {
    let mut action = CliAction::Run;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let mut value_for = |flag: &str| {
            args.next()
                .ok_or_else(|| format!("Missing value for {flag}"))
        };
        match arg.as_str() {
            "-h" | "--help" => return Ok(CliAction::Help),
            "-V" | "--version" => return Ok(CliAction::Version),
            "--dump" => action = CliAction::Dump,
            "--season" => {
                let value = value_for("--season")?;
                settings.season_year =
                    value.parse().map_err(|_| format!("Invalid season year: {value}"))?;
            }
            "--season-type" => {
                let value = value_for("--season-type")?;
                settings.season_type = value
                    .parse()
                    .ok()
                    .and_then(SeasonType::from_code)
                    .ok_or_else(|| format!("Invalid season type (1, 2 or 3): {value}"))?;
            }
            "--week" => {
                let value = value_for("--week")?;
                settings.week = Some(value.parse().map_err(|_| format!("Invalid week: {value}"))?);
            }
            _ => return Err(format!("Unknown argument: {arg}")),
        }
    }

    Ok(action)
}

fn usage_text() -> &'static str {
    "playofftui - NFL playoff bracket terminal UI

Usage:
  playofftui [--season YEAR] [--season-type 1|2|3] [--week N]
  playofftui --dump [--season YEAR] [--season-type 1|2|3] [--week N]
  playofftui --help
  playofftui --version

Options:
  --dump               Print the assembled bracket as JSON and exit

Environment:
  PLAYOFFTUI_API_URL      Backend base URL (default http://localhost:3000/api)
  PLAYOFFTUI_SEASON       Season year (default: current NFL season)
  PLAYOFFTUI_SEASON_TYPE  1 preseason, 2 regular, 3 postseason (default 3)
  PLAYOFFTUI_WEEK         Single postseason week (default: all weeks)
  PLAYOFFTUI_USER         Sign in on startup, with PLAYOFFTUI_PASSWORD
  PLAYOFFTUI_PASSWORD
  PLAYOFFTUI_LOG          error, warn, info, debug or trace"
}

async fn dump_bracket(settings: &AppSettings) -> anyhow::Result<()> {
    let api = PlayoffApi::with_base_url(settings.api_url.clone());
    let request = LoadRequest::new(settings.season_year, settings.season_type, settings.week);
    let mut store = PlayoffBracketStore::new();
    store.load(&api, request).await?;
    println!("{}", serde_json::to_string_pretty(&store.bracket())?);
    Ok(())
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();
    let mut watchdog: Option<WatchdogHandle> = None;

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw = handle_network_response(
                    response,
                    &app,
                    &network_requests,
                    &mut watchdog,
                    &mut loading,
                )
                .await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted | UiEvent::RefreshTick => {
            let request = app.lock().await.begin_load();
            let _ = network_requests.send(NetworkRequest::LoadBracket { request }).await;
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    watchdog: &mut Option<WatchdogHandle>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        NetworkResponse::BracketLoaded { snapshot } => {
            app.lock().await.on_bracket_loaded(snapshot);
        }
        NetworkResponse::BracketLoadFailed { message } => {
            app.lock().await.on_bracket_load_failed(message);
        }
        NetworkResponse::SessionChanged { state, user_name } => {
            supervise_watchdog(state, watchdog, network_requests);
            app.lock().await.on_session_changed(state, user_name);
        }
        NetworkResponse::Error { message } => {
            error!("Network error: {message}");
            app.lock().await.on_error(message);
        }
    }
    !loading.is_loading
}

/// One watchdog per signed-in session.
fn supervise_watchdog(
    state: SessionState,
    watchdog: &mut Option<WatchdogHandle>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    match state {
        SessionState::Scheduled => {
            if watchdog.as_ref().is_none_or(WatchdogHandle::is_finished) {
                info!("starting session watchdog");
                *watchdog = Some(SessionWatchdog::spawn(network_requests.clone()));
            }
        }
        SessionState::Refreshing => {}
        SessionState::Idle | SessionState::Expired => {
            if let Some(handle) = watchdog.take() {
                info!("stopping session watchdog");
                drop(handle.cancel());
            }
        }
    }
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

/// Best effort: also runs from the panic hook, where there is nobody to
/// report a failure to.
pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
