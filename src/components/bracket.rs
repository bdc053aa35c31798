use playoff_api::{BracketGame, BracketTeam, ConferenceBracket, PlayoffRound};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::Widget;

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Rows per game cell: top-team line, status line, bottom-team line.
pub const GAME_HEIGHT: u16 = 3;

/// Wild card games, one blank row apart.
const WILD_CARD_CENTERS: [u16; 3] = [1, 5, 9];
const DIVISIONAL_CENTERS: [u16; 2] = [3, 7];
const CHAMPIONSHIP_CENTER: u16 = 5;

/// Rows taken by one conference bracket.
pub const CONFERENCE_HEIGHT: u16 = WILD_CARD_CENTERS[2] + 2;

/// Games per conference view: three wild card, two divisional, one championship.
pub const CONFERENCE_GAMES: usize = 6;

pub const CONNECTOR_WIDTH: u16 = 3;

const CELL_W_FULL: u16 = 24;

/// Pre-computed position for one game of a conference bracket.
#[derive(Debug, Clone)]
pub struct GameCell {
    pub center_row: u16,
    pub col: u16,
    pub cell_width: u16,
    pub round: PlayoffRound,
    pub game_idx: usize,
}

/// Column layout for wild card | divisional | championship | champion.
#[derive(Debug, Clone)]
pub struct ConferenceGrid {
    /// Wild card, divisional, then championship.
    pub cells: Vec<GameCell>,
    /// Starting column of each round plus the champion column.
    pub round_cols: [u16; 4],
    pub cell_width: u16,
}

impl ConferenceGrid {
    pub fn compute(terminal_width: u16) -> Self {
        let per_col = terminal_width.saturating_sub(CONNECTOR_WIDTH * 3) / 4;
        let cell_width = per_col.clamp(1, CELL_W_FULL);
        let stride = cell_width + CONNECTOR_WIDTH;
        let round_cols = [0, stride, stride * 2, stride * 3];

        let columns: [(PlayoffRound, &[u16]); 3] = [
            (PlayoffRound::WildCard, &WILD_CARD_CENTERS),
            (PlayoffRound::Divisional, &DIVISIONAL_CENTERS),
            (PlayoffRound::Conference, &[CHAMPIONSHIP_CENTER]),
        ];

        let mut cells = Vec::with_capacity(CONFERENCE_GAMES);
        for (depth, (round, centers)) in columns.into_iter().enumerate() {
            for (game_idx, &center_row) in centers.iter().enumerate() {
                cells.push(GameCell {
                    center_row,
                    col: round_cols[depth],
                    cell_width,
                    round,
                    game_idx,
                });
            }
        }

        Self { cells, round_cols, cell_width }
    }
}

/// Game at a flattened selection index: 0..3 wild card, 3..5 divisional, 5 championship.
pub fn game_at(bracket: &ConferenceBracket, index: usize) -> Option<&BracketGame> {
    match index {
        0..=2 => bracket.wild_card.get(index),
        3 | 4 => bracket.divisional.get(index - 3),
        5 => Some(&bracket.championship),
        _ => None,
    }
}

fn game_for_cell<'a>(bracket: &'a ConferenceBracket, cell: &GameCell) -> Option<&'a BracketGame> {
    match cell.round {
        PlayoffRound::WildCard => bracket.wild_card.get(cell.game_idx),
        PlayoffRound::Divisional => bracket.divisional.get(cell.game_idx),
        PlayoffRound::Conference => Some(&bracket.championship),
        PlayoffRound::SuperBowl => None,
    }
}

// ---------------------------------------------------------------------------
// ConferenceView widget
// ---------------------------------------------------------------------------

/// Renders one conference: wild card → divisional → championship → champion.
pub struct ConferenceView<'a> {
    pub bracket: &'a ConferenceBracket,
    pub grid: &'a ConferenceGrid,
    /// Flattened index, see [`game_at`].
    pub selected: usize,
}

impl<'a> Widget for ConferenceView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < GAME_HEIGHT {
            return;
        }

        let dim = Style::default().fg(Color::DarkGray);
        for (idx, cell) in self.grid.cells.iter().enumerate() {
            let game = game_for_cell(self.bracket, cell);
            draw_game_cell(game, cell.col, cell.center_row, cell.cell_width, idx == self.selected, area, buf);
        }

        // Reseeding decides who meets whom after the wild card round, so only
        // the divisional games get bracket lines into the championship.
        let conn_x = area.x + self.grid.round_cols[1] + self.grid.cell_width;
        draw_connector(
            DIVISIONAL_CENTERS[0],
            CHAMPIONSHIP_CENTER,
            DIVISIONAL_CENTERS[1],
            conn_x,
            area,
            buf,
        );

        let champ_x = area.x + self.grid.round_cols[2] + self.grid.cell_width;
        for x in champ_x..champ_x + CONNECTOR_WIDTH {
            if let Some(y) = screen_y(CHAMPIONSHIP_CENTER, area) {
                put_char(buf, x, y, '─', dim);
            }
        }

        let champion_x = area.x + self.grid.round_cols[3];
        if champion_x < area.x + area.width
            && let Some(y) = screen_y(CHAMPIONSHIP_CENTER, area)
        {
            let avail = (area.x + area.width - champion_x) as usize;
            let width = (self.grid.cell_width as usize).min(avail);
            let (text, style) = match &self.bracket.champion {
                Some(team) => (
                    format_team_line(Some(team), None, width),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                None => (format_team_line(None, None, width), dim),
            };
            buf.set_string(champion_x, y, text, style);
            if let Some(label_y) = screen_y(CHAMPIONSHIP_CENTER + 1, area) {
                let label = format!(" {} CHAMPION", self.bracket.conference.label());
                let label: String = label.chars().take(width).collect();
                buf.set_string(champion_x, label_y, label, dim);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SuperBowlView widget
// ---------------------------------------------------------------------------

/// The Super Bowl between the two conference champions.
pub struct SuperBowlView<'a> {
    pub game: &'a BracketGame,
    pub selected: bool,
}

impl<'a> Widget for SuperBowlView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < GAME_HEIGHT + 2 || area.width < 12 {
            return;
        }

        let accent = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        let title = "── SUPER BOWL ──";
        let tx = area.x + area.width.saturating_sub(title.chars().count() as u16) / 2;
        buf.set_string(tx, area.y, title, accent);

        let cell_w = CELL_W_FULL.min(area.width);
        let x = area.x + (area.width - cell_w) / 2;
        let center_row = 3;
        draw_game_cell(Some(self.game), x - area.x, center_row, cell_w, self.selected, area, buf);

        if let Some(y) = screen_y(center_row + 3, area) {
            let line = match self.game.winner() {
                Some(team) => format!("Champion: {}", team.name),
                None => "Champion: TBD".to_string(),
            };
            let lx = area.x + area.width.saturating_sub(line.chars().count() as u16) / 2;
            buf.set_string(lx, y, line, accent);
        }
    }
}

// ---------------------------------------------------------------------------
// Shared drawing helpers
// ---------------------------------------------------------------------------

/// Convert a bracket-relative row to a screen row, `None` when clipped.
fn screen_y(bracket_row: u16, area: Rect) -> Option<u16> {
    (bracket_row < area.height).then_some(area.y + bracket_row)
}

fn draw_game_cell(
    game: Option<&BracketGame>,
    col: u16,
    center_row: u16,
    cell_width: u16,
    selected: bool,
    area: Rect,
    buf: &mut Buffer,
) {
    let x = area.x + col;
    if x >= area.x + area.width {
        return;
    }
    let avail_w = (area.x + area.width).saturating_sub(x) as usize;

    let base_style = if selected {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().fg(Color::Gray)
    };
    let winner_style = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);

    let rows = [
        (center_row.saturating_sub(1), 0u8),
        (center_row, 1),
        (center_row.saturating_add(1), 2),
    ];
    for (bracket_row, slot_idx) in rows {
        let Some(sy) = screen_y(bracket_row, area) else {
            continue;
        };

        let content = format_game_row(game, slot_idx, cell_width as usize);
        let text: String = content.chars().take(avail_w).collect();

        let style = match (slot_idx, game) {
            (1, _) => dim,
            (0, Some(g)) if is_winner(g, g.top.as_ref()) => winner_style,
            (2, Some(g)) if is_winner(g, g.bottom.as_ref()) => winner_style,
            _ => base_style,
        };

        buf.set_string(x, sy, &text, style);
    }
}

fn is_winner(game: &BracketGame, team: Option<&BracketTeam>) -> bool {
    match (game.winner_id, team) {
        (Some(winner_id), Some(team)) => team.id == winner_id,
        _ => false,
    }
}

/// `slot_idx`: 0 = top team, 1 = status, 2 = bottom team.
fn format_game_row(game: Option<&BracketGame>, slot_idx: u8, width: usize) -> String {
    match game {
        None => " ".repeat(width),
        Some(g) => match slot_idx {
            0 => format_team_line(g.top.as_ref(), g.top_score, width),
            2 => format_team_line(g.bottom.as_ref(), g.bottom_score, width),
            _ => format_status_line(g, width),
        },
    }
}

/// `"[seed] [name       ] [score] "`, always exactly `width` chars.
pub fn format_team_line(team: Option<&BracketTeam>, score: Option<u16>, width: usize) -> String {
    let seed = match team {
        Some(t) if t.seed > 0 => format!("{:2}", t.seed),
        _ => "  ".to_string(),
    };
    let name = team.map(|t| t.name.as_str()).unwrap_or("TBD");
    let score_str = match score {
        Some(s) => format!("{s:3}"),
        None => "   ".to_string(),
    };
    let name_w = width.saturating_sub(8);
    let name_trunc: String = name.chars().take(name_w).collect();
    let line = format!("{seed} {name_trunc:<name_w$} {score_str} ");
    line.chars().take(width).collect()
}

/// Center row of a cell: final, live-ish score, or the slot id.
pub fn format_status_line(game: &BracketGame, width: usize) -> String {
    let raw = if game.winner_id.is_some() {
        " FINAL".to_string()
    } else if game.is_empty() {
        format!(" {}", game.slot)
    } else {
        match (game.top_score, game.bottom_score) {
            (Some(top), Some(bottom)) => format!(" {top}-{bottom}"),
            _ => format!(" {}", game.slot),
        }
    };
    let padded = format!("{raw:<width$}");
    padded.chars().take(width).collect()
}

/// One-line summary of a game for the detail footer.
pub fn format_matchup(game: &BracketGame) -> String {
    let side = |team: Option<&BracketTeam>| match team {
        Some(t) => {
            let seed = if t.seed > 0 { format!("#{} ", t.seed) } else { String::new() };
            let record = if t.record.is_empty() { String::new() } else { format!(" ({})", t.record) };
            format!("{seed}{}{record}", t.name)
        }
        None => "TBD".to_string(),
    };
    let mut line = format!("{}: {} at {}", game.slot, side(game.top.as_ref()), side(game.bottom.as_ref()));
    if let Some(winner) = game.winner() {
        line.push_str(&format!(", won by {}", winner.name));
    }
    line
}

/// Lines from the two divisional games into the championship.
///
/// ```text
///  top  ──┐
///         │
///         ├──  championship
///         │
///  bot  ──┘
/// ```
fn draw_connector(r_top: u16, r_mid: u16, r_bot: u16, conn_base_x: u16, area: Rect, buf: &mut Buffer) {
    let style = Style::default().fg(Color::DarkGray);
    let col_a = conn_base_x;
    let col_b = conn_base_x + 1;
    let col_c = conn_base_x + 2;
    let limit_x = area.x + area.width;

    let mut put = |x: u16, row: u16, ch: char| {
        if x < limit_x
            && let Some(sy) = screen_y(row, area)
        {
            put_char(buf, x, sy, ch, style);
        }
    };

    put(col_a, r_top, '─');
    put(col_b, r_top, '┐');
    for row in (r_top + 1)..r_mid {
        put(col_b, row, '│');
    }
    put(col_b, r_mid, '├');
    put(col_c, r_mid, '─');
    for row in (r_mid + 1)..r_bot {
        put(col_b, row, '│');
    }
    put(col_a, r_bot, '─');
    put(col_b, r_bot, '┘');
}

fn put_char(buf: &mut Buffer, x: u16, y: u16, ch: char, style: Style) {
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_char(ch);
        cell.set_style(style);
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
