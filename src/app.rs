use crate::components::bracket::{CONFERENCE_GAMES, game_at};
use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, LAST_POSTSEASON_WEEK};
use chrono::Local;
use playoff_api::auth::SessionState;
use playoff_api::store::{BracketSnapshot, LoadRequest};
use playoff_api::{BracketGame, Conference};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Afc,
    Nfc,
    SuperBowl,
    Help,
}

impl MenuItem {
    pub fn conference(&self) -> Option<Conference> {
        match self {
            MenuItem::Afc => Some(Conference::Afc),
            MenuItem::Nfc => Some(Conference::Nfc),
            _ => None,
        }
    }
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let app = Self {
            state: AppState::new(&settings),
            settings,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_bracket_loaded(&mut self, snapshot: BracketSnapshot) {
        self.state.last_error = None;
        self.state.bracket.apply_snapshot(snapshot);
        self.state.last_updated = Some(Local::now());
    }

    pub fn on_bracket_load_failed(&mut self, message: String) {
        self.state.bracket.fail_load(message);
        self.state.last_error = self.state.bracket.error.clone();
    }

    pub fn on_session_changed(&mut self, state: SessionState, user_name: Option<String>) {
        self.state.session_state = state;
        if user_name.is_some() || state != SessionState::Refreshing {
            self.state.session_user = user_name;
        }
        if state == SessionState::Expired {
            self.state.last_error = Some("Session expired, sign in again".to_string());
        }
    }

    pub fn on_error(&mut self, message: String) {
        self.state.last_error = Some(message);
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Mark the store as loading the current request and hand it back for
    /// the network worker.
    pub fn begin_load(&mut self) -> LoadRequest {
        let request = self.state.request;
        self.state.bracket.begin_load(&request);
        request
    }

    pub fn next_season(&mut self) -> LoadRequest {
        self.state.request.season_year = self.state.request.season_year.saturating_add(1);
        self.begin_load()
    }

    pub fn prev_season(&mut self) -> LoadRequest {
        self.state.request.season_year = self.state.request.season_year.saturating_sub(1);
        self.begin_load()
    }

    /// No week means every postseason week at once.
    pub fn next_week(&mut self) -> LoadRequest {
        self.state.request.week = match self.state.request.week {
            None => Some(1),
            Some(w) => Some((w + 1).min(LAST_POSTSEASON_WEEK)),
        };
        self.begin_load()
    }

    pub fn prev_week(&mut self) -> LoadRequest {
        self.state.request.week = match self.state.request.week {
            None | Some(0..=1) => None,
            Some(w) => Some(w - 1),
        };
        self.begin_load()
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        self.state.selected_game = 0;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Game selection
    // -----------------------------------------------------------------------

    fn games_in_view(&self) -> usize {
        match self.state.active_tab {
            MenuItem::Afc | MenuItem::Nfc => CONFERENCE_GAMES,
            MenuItem::SuperBowl => 1,
            MenuItem::Help => 0,
        }
    }

    pub fn select_next_game(&mut self) {
        let max = self.games_in_view().saturating_sub(1);
        if self.state.selected_game < max {
            self.state.selected_game += 1;
        }
    }

    pub fn select_prev_game(&mut self) {
        self.state.selected_game = self.state.selected_game.saturating_sub(1);
    }

    /// The highlighted game, rebuilt from the store.
    pub fn selected_game(&self) -> Option<BracketGame> {
        match self.state.active_tab {
            MenuItem::Afc => game_at(&self.state.bracket.afc_bracket(), self.state.selected_game).cloned(),
            MenuItem::Nfc => game_at(&self.state.bracket.nfc_bracket(), self.state.selected_game).cloned(),
            MenuItem::SuperBowl => Some(self.state.bracket.super_bowl()),
            MenuItem::Help => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playoff_api::SeasonType;

    fn app() -> App {
        let settings = AppSettings {
            season_year: 2024,
            season_type: SeasonType::Postseason,
            week: None,
            ..AppSettings::default()
        };
        App::new(settings)
    }

    #[test]
    fn season_keys_reload_with_new_year() {
        let mut app = app();
        let request = app.next_season();
        assert_eq!(request.season_year, 2025);
        assert!(app.state.bracket.loading);
        assert_eq!(app.state.bracket.season_year, 2025);

        let request = app.prev_season();
        assert_eq!(request.season_year, 2024);
    }

    #[test]
    fn week_steps_between_all_weeks_and_super_bowl() {
        let mut app = app();
        assert_eq!(app.next_week().week, Some(1));
        assert_eq!(app.state.bracket.season_week, 1);
        for _ in 0..10 {
            app.next_week();
        }
        assert_eq!(app.state.request.week, Some(LAST_POSTSEASON_WEEK));
        assert_eq!(app.prev_week().week, Some(LAST_POSTSEASON_WEEK - 1));

        app.state.request.week = Some(1);
        assert_eq!(app.prev_week().week, None);
        assert_eq!(app.prev_week().week, None);
    }

    #[test]
    fn failed_load_surfaces_error_and_keeps_loading_off() {
        let mut app = app();
        app.begin_load();
        app.on_bracket_load_failed(String::new());
        assert!(!app.state.bracket.loading);
        assert_eq!(app.state.last_error.as_deref(), Some("Failed to load playoff bracket"));

        app.begin_load();
        app.on_bracket_loaded(BracketSnapshot::default());
        assert!(app.state.last_error.is_none());
        assert!(app.state.last_updated.is_some());
    }

    #[test]
    fn selection_is_bounded_per_tab() {
        let mut app = app();
        for _ in 0..20 {
            app.select_next_game();
        }
        assert_eq!(app.state.selected_game, CONFERENCE_GAMES - 1);
        assert_eq!(app.selected_game().map(|g| g.slot), Some("AFC-CONF".to_string()));

        app.update_tab(MenuItem::SuperBowl);
        assert_eq!(app.state.selected_game, 0);
        app.select_next_game();
        assert_eq!(app.state.selected_game, 0);
        assert_eq!(app.selected_game().map(|g| g.slot), Some("SB".to_string()));
    }

    #[test]
    fn help_returns_to_previous_tab() {
        let mut app = app();
        app.update_tab(MenuItem::Nfc);
        app.update_tab(MenuItem::Help);
        app.exit_help();
        assert_eq!(app.state.active_tab, MenuItem::Nfc);
    }

    #[test]
    fn session_changes_track_user() {
        let mut app = app();
        app.on_session_changed(SessionState::Scheduled, Some("coach".into()));
        app.on_session_changed(SessionState::Refreshing, None);
        assert_eq!(app.state.session_user.as_deref(), Some("coach"));

        app.on_session_changed(SessionState::Expired, None);
        assert!(app.state.session_user.is_none());
        assert!(app.state.last_error.is_some());
    }
}
