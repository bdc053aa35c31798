use crate::app::MenuItem;
use crate::state::app_settings::AppSettings;
use chrono::{DateTime, Local};
use playoff_api::auth::SessionState;
use playoff_api::store::{LoadRequest, PlayoffBracketStore};

/// Postseason weeks: wild card, divisional, conference, bye week, Super Bowl.
pub const LAST_POSTSEASON_WEEK: u8 = 5;

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub bracket: PlayoffBracketStore,
    /// The request behind the bracket currently shown (or being loaded).
    pub request: LoadRequest,
    /// Flattened game index on a conference tab.
    pub selected_game: usize,
    pub session_state: SessionState,
    pub session_user: Option<String>,
    pub last_updated: Option<DateTime<Local>>,
}

impl AppState {
    pub fn new(settings: &AppSettings) -> Self {
        Self {
            request: LoadRequest::new(settings.season_year, settings.season_type, settings.week),
            ..Self::default()
        }
    }
}
