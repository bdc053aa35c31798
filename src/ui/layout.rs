use tui::layout::{Constraint, Layout, Rect, Size};
pub const TAB_BAR_HEIGHT: u16 = 3;
pub const STATUS_HEIGHT: u16 = 1;
pub const LOG_PANE_PERCENT: u16 = 30;

/// Pre-computed layout areas for the main draw loop.
#[derive(Debug, PartialEq)]
pub struct LayoutAreas {
    pub tab_bar: [Rect; 2],
    pub main: Rect,
    pub status: Rect,
    /// Log pane below the bracket, zero-sized when hidden.
    pub logs: Rect,
}

impl LayoutAreas {
    pub fn new(size: Size) -> Self {
        let rect = Rect::new(0, 0, size.width, size.height);
        Self::from_rect(rect, false, false)
    }

    pub fn update(&mut self, area: Rect, full_screen: bool, show_logs: bool) {
        *self = Self::from_rect(area, full_screen, show_logs);
    }

    fn from_rect(area: Rect, full_screen: bool, show_logs: bool) -> Self {
        if full_screen {
            let [main] = Layout::vertical([Constraint::Fill(1)]).areas(area);
            return LayoutAreas {
                tab_bar: [Rect::ZERO, Rect::ZERO],
                main,
                status: Rect::ZERO,
                logs: Rect::ZERO,
            };
        }

        let [tab, body, status] = Layout::vertical([
            Constraint::Length(TAB_BAR_HEIGHT),
            Constraint::Fill(1),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .areas(area);

        let (main, logs) = if show_logs {
            let [main, logs] = Layout::vertical([
                Constraint::Fill(1),
                Constraint::Percentage(LOG_PANE_PERCENT),
            ])
            .areas(body);
            (main, logs)
        } else {
            (body, Rect::ZERO)
        };

        LayoutAreas {
            tab_bar: Self::split_tab_bar(tab),
            main,
            status,
            logs,
        }
    }

    fn split_tab_bar(area: Rect) -> [Rect; 2] {
        Layout::horizontal([Constraint::Percentage(85), Constraint::Percentage(15)]).areas(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_screen_uses_whole_area() {
        let area = Rect::new(0, 0, 120, 40);
        let layout = LayoutAreas::from_rect(area, true, true);
        assert_eq!(layout.main, area);
        assert_eq!(layout.logs, Rect::ZERO);
    }

    #[test]
    fn log_pane_takes_space_from_main() {
        let area = Rect::new(0, 0, 120, 40);
        let hidden = LayoutAreas::from_rect(area, false, false);
        assert_eq!(hidden.main.height, 40 - TAB_BAR_HEIGHT - STATUS_HEIGHT);
        assert_eq!(hidden.status.y, 39);

        let shown = LayoutAreas::from_rect(area, false, true);
        assert!(shown.logs.height > 0);
        assert_eq!(shown.main.height + shown.logs.height, hidden.main.height);
    }
}
