use log::error;
use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::bracket::{CONFERENCE_HEIGHT, ConferenceGrid, ConferenceView, SuperBowlView, format_matchup};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use playoff_api::auth::SessionState;
use playoff_api::{Conference, SeasonType};

static TABS: &[&str; 3] = &["AFC", "NFC", "Super Bowl"];

const HELP_LINES: &[(&str, &str)] = &[
    ("1 / 2 / 3", "AFC / NFC / Super Bowl"),
    ("j k  ↓ ↑", "select game"),
    ("r", "reload bracket"),
    ("[ ]", "previous / next season"),
    ("- =", "previous / next week (below week 1 shows every week)"),
    ("L", "sign out"),
    ("f", "toggle full screen"),
    ("\"", "toggle logs"),
    ("? / Esc", "open / close help"),
    ("q", "quit"),
];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
            draw_status(f, layout.status, app);
        }

        match app.state.active_tab {
            MenuItem::Afc => draw_conference(f, layout.main, app, Conference::Afc),
            MenuItem::Nfc => draw_conference(f, layout.main, app, Conference::Nfc),
            MenuItem::SuperBowl => draw_super_bowl(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if app.state.show_logs && layout.logs.height > 0 {
            draw_logs(f, layout.logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });

    if let Err(e) = result {
        error!("failed to draw frame: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_for_index = match app.state.active_tab {
        MenuItem::Help => app.state.previous_tab,
        tab => tab,
    };
    let tab_index = match tab_for_index {
        MenuItem::Afc | MenuItem::Help => 0,
        MenuItem::Nfc => 1,
        MenuItem::SuperBowl => 2,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_conference(f: &mut Frame, area: Rect, app: &App, conference: Conference) {
    let title = format!(" {} Playoffs {} ", conference.label(), app.state.request.season_year);
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.state.bracket.events().is_empty() {
        let msg = if app.state.bracket.loading {
            "Loading bracket..."
        } else {
            "No playoff games for this season yet"
        };
        draw_message(f, inner, msg);
        return;
    }

    let bracket = match conference {
        Conference::Afc => app.state.bracket.afc_bracket(),
        Conference::Nfc => app.state.bracket.nfc_bracket(),
    };

    let [bracket_area, _, footer] = Layout::vertical([
        Constraint::Length(CONFERENCE_HEIGHT),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let grid = ConferenceGrid::compute(bracket_area.width);
    f.render_widget(
        ConferenceView { bracket: &bracket, grid: &grid, selected: app.state.selected_game },
        bracket_area,
    );

    draw_selected_footer(f, footer, app);
}

fn draw_super_bowl(f: &mut Frame, area: Rect, app: &App) {
    let title = format!(" Super Bowl {} ", app.state.request.season_year);
    let block = default_border(Color::Yellow).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let game = app.state.bracket.super_bowl();
    let [game_area, _, footer] = Layout::vertical([
        Constraint::Length(8),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(inner);
    f.render_widget(SuperBowlView { game: &game, selected: true }, game_area);
    draw_selected_footer(f, footer, app);
}

fn draw_selected_footer(f: &mut Frame, area: Rect, app: &App) {
    let Some(game) = app.selected_game() else {
        return;
    };
    let mut spans = vec![Span::styled(format_matchup(&game), Style::default().fg(Color::Gray))];
    let logos: Vec<&str> = [game.top.as_ref(), game.bottom.as_ref()]
        .into_iter()
        .flatten()
        .map(|t| t.logo_url.as_str())
        .filter(|url| !url.is_empty())
        .collect();
    if !logos.is_empty() {
        spans.push(Span::styled(
            format!("  [{}]", logos.join(" ")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines: Vec<Line> = HELP_LINES
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(
                    format!("{keys:>12}  "),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::raw(*action),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan))
        .style_debug(Style::default().fg(Color::Gray))
        .output_target(false)
        .output_file(false)
        .output_line(false);
    f.render_widget(logs, area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(status_text(app), Style::default().fg(Color::Gray))];
    if let Some(err) = &app.state.last_error {
        spans.push(Span::styled(format!("  {err}"), Style::default().fg(Color::Red)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Season, week, session and freshness, left to right.
pub fn status_text(app: &App) -> String {
    let request = &app.state.request;
    let season_type = match request.season_type {
        SeasonType::Preseason => "Preseason",
        SeasonType::Regular => "Regular season",
        SeasonType::Postseason => "Postseason",
    };
    let week = match request.week {
        Some(w) => format!("week {w}"),
        None => "all weeks".to_string(),
    };
    let session = match (app.state.session_state, &app.state.session_user) {
        (SessionState::Scheduled | SessionState::Refreshing, Some(user)) => {
            format!("{} as {user}", app.state.session_state.label())
        }
        (state, _) => state.label().to_string(),
    };
    let mut text = format!(" {} {season_type} | {week} | {session}", request.season_year);
    if let Some(updated) = app.state.last_updated {
        text.push_str(&format!(" | updated {}", updated.format("%H:%M:%S")));
    }
    text
}

fn draw_message(f: &mut Frame, area: Rect, msg: &str) {
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(area);
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        middle,
    );
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_settings::AppSettings;

    fn app() -> App {
        App::new(AppSettings {
            season_year: 2024,
            season_type: SeasonType::Postseason,
            week: Some(2),
            ..AppSettings::default()
        })
    }

    #[test]
    fn status_text_shows_season_week_and_session() {
        let mut app = app();
        assert_eq!(status_text(&app), " 2024 Postseason | week 2 | signed out");

        app.on_session_changed(SessionState::Scheduled, Some("coach".into()));
        assert_eq!(status_text(&app), " 2024 Postseason | week 2 | signed in as coach");

        app.state.request.week = None;
        app.on_session_changed(SessionState::Expired, None);
        assert_eq!(status_text(&app), " 2024 Postseason | all weeks | expired");
    }
}
