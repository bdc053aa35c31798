use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use playoff_api::auth::SessionState;
use playoff_api::store::{BracketSnapshot, LoadRequest};

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadBracket { request: LoadRequest },
    Login { user_name: String, password: String },
    Logout,
    /// Watchdog tick: compare the clock to the token expiry.
    CheckSession,
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    BracketLoaded { snapshot: BracketSnapshot },
    BracketLoadFailed { message: String },
    SessionChanged { state: SessionState, user_name: Option<String> },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    /// Periodic reload of the current request.
    RefreshTick,
}
