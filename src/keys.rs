use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    let request = match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => {
            guard.update_tab(MenuItem::Afc);
            None
        }
        (_, Char('2'), _) => {
            guard.update_tab(MenuItem::Nfc);
            None
        }
        (_, Char('3'), _) => {
            guard.update_tab(MenuItem::SuperBowl);
            None
        }
        (_, Char('?'), _) => {
            guard.update_tab(MenuItem::Help);
            None
        }
        (MenuItem::Help, KeyCode::Esc, _) => {
            guard.exit_help();
            None
        }

        // Game selection
        (_, Char('j') | KeyCode::Down, _) => {
            guard.select_next_game();
            None
        }
        (_, Char('k') | KeyCode::Up, _) => {
            guard.select_prev_game();
            None
        }

        // Loading
        (_, Char('r'), _) => Some(NetworkRequest::LoadBracket { request: guard.begin_load() }),
        (_, Char(']'), _) => Some(NetworkRequest::LoadBracket { request: guard.next_season() }),
        (_, Char('['), _) => Some(NetworkRequest::LoadBracket { request: guard.prev_season() }),
        (_, Char('='), _) => Some(NetworkRequest::LoadBracket { request: guard.next_week() }),
        (_, Char('-'), _) => Some(NetworkRequest::LoadBracket { request: guard.prev_week() }),

        // Session
        (_, Char('L'), _) => Some(NetworkRequest::Logout),

        // Global
        (_, Char('f'), _) => {
            guard.toggle_full_screen();
            None
        }
        (_, Char('"'), _) => {
            guard.toggle_show_logs();
            None
        }

        _ => None,
    };

    drop(guard);
    if let Some(request) = request {
        let _ = network_requests.send(request).await;
    }
}
