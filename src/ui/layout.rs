//! Screen layout shared by drawing and mouse hit-testing
//!
//! Every rect the pointer can land on is computed here, so a card is hit
//! exactly where it was drawn.

use crate::app::App;
use crate::dnd::{CardRect, LayoutMode, Point};
use crate::state::{KeyId, NoticeLevel, Project, ProjectId};
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub const SIDEBAR_WIDTH: u16 = 26;

/// Grid layout configuration
const MIN_CARD_WIDTH: u16 = 26;
const GRID_CARD_HEIGHT: u16 = 5; // border + name + detail + value + border
const LIST_CARD_HEIGHT: u16 = 3;
const CARD_SPACING_H: u16 = 1;

/// Blank line between "All Projects" and the project rows
const SIDEBAR_SEPARATOR: u16 = 1;

impl From<Rect> for CardRect {
    fn from(rect: Rect) -> Self {
        CardRect::new(
            f64::from(rect.x),
            f64::from(rect.y),
            f64::from(rect.width),
            f64::from(rect.height),
        )
    }
}

/// Pointer position at the centre of a terminal cell
pub fn pointer(column: u16, row: u16) -> Point {
    Point::new(f64::from(column) + 0.5, f64::from(row) + 0.5)
}

pub fn contains(rect: Rect, column: u16, row: u16) -> bool {
    rect.contains(Position::new(column, row))
}

/// Area inside a bordered block
pub fn inner(area: Rect) -> Rect {
    Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

/// Truncate to a number of characters, ending in "..." when there is room
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max_len).collect()
    }
}

/// Top-level split of the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub sidebar: Rect,
    pub keys: Rect,
    pub status: Rect,
}

impl ScreenLayout {
    pub fn new(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(SIDEBAR_WIDTH), // Projects
                Constraint::Min(0),                // Keys
            ])
            .split(rows[0]);

        Self {
            sidebar: columns[0],
            keys: columns[1],
            status: rows[1],
        }
    }

    /// Layout for a terminal of the given size (height, width)
    pub fn for_size(size: Option<(u16, u16)>) -> Self {
        let (height, width) = size.unwrap_or((24, 80));
        Self::new(Rect::new(0, 0, width, height))
    }
}

/// A clickable sidebar row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarRow {
    AllProjects,
    Project(ProjectId),
}

impl SidebarRow {
    pub fn project_id(self) -> Option<ProjectId> {
        match self {
            Self::AllProjects => None,
            Self::Project(id) => Some(id),
        }
    }
}

/// Visible sidebar rows, one terminal line each
pub fn sidebar_rows(sidebar: Rect, projects: &[Project]) -> Vec<(SidebarRow, Rect)> {
    let inner = inner(sidebar);
    let bottom = inner.y + inner.height;
    let row = |y: u16| Rect::new(inner.x, y, inner.width, 1);

    let mut rows = Vec::with_capacity(projects.len() + 1);
    if inner.height == 0 {
        return rows;
    }
    rows.push((SidebarRow::AllProjects, row(inner.y)));

    let first = inner.y + 1 + SIDEBAR_SEPARATOR;
    for (i, project) in projects.iter().enumerate() {
        let y = first + i as u16;
        if y >= bottom {
            break;
        }
        rows.push((SidebarRow::Project(project.id), row(y)));
    }
    rows
}

/// Sidebar row under the pointer
pub fn sidebar_row_at(
    sidebar: Rect,
    projects: &[Project],
    column: u16,
    row: u16,
) -> Option<SidebarRow> {
    sidebar_rows(sidebar, projects)
        .into_iter()
        .find(|(_, rect)| contains(*rect, column, row))
        .map(|(target, _)| target)
}

/// Helper for key card layout calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: usize,
    pub card_width: u16,
    pub card_height: u16,
}

impl GridLayout {
    /// Create a layout for the inner width of the key panel
    pub fn new(inner_width: u16, mode: LayoutMode) -> Self {
        match mode {
            LayoutMode::List => Self {
                columns: 1,
                card_width: inner_width,
                card_height: LIST_CARD_HEIGHT,
            },
            LayoutMode::Grid => {
                // Each card needs MIN_CARD_WIDTH plus spacing (except the last)
                let columns = if inner_width >= MIN_CARD_WIDTH {
                    ((inner_width + CARD_SPACING_H) / (MIN_CARD_WIDTH + CARD_SPACING_H)) as usize
                } else {
                    1
                }
                .max(1);

                // Distribute remaining space evenly across cards
                let total_spacing = (columns.saturating_sub(1) as u16) * CARD_SPACING_H;
                let card_width = inner_width.saturating_sub(total_spacing) / columns as u16;

                Self {
                    columns,
                    card_width: card_width.min(inner_width).max(1),
                    card_height: GRID_CARD_HEIGHT,
                }
            }
        }
    }

    /// Convert linear index to (row, col)
    fn index_to_pos(&self, index: usize) -> (usize, usize) {
        (index / self.columns, index % self.columns)
    }

    fn visible_rows(&self, inner_height: u16) -> usize {
        ((inner_height / self.card_height) as usize).max(1)
    }

    /// First card row shown so that the selected card stays visible
    pub fn first_visible_row(&self, selected: usize, inner_height: u16) -> usize {
        let (row, _) = self.index_to_pos(selected);
        row.saturating_sub(self.visible_rows(inner_height) - 1)
    }

    fn card_area(&self, inner: Rect, row: usize, col: usize) -> Rect {
        Rect {
            x: inner.x + (col as u16) * (self.card_width + CARD_SPACING_H),
            y: inner.y + (row as u16) * self.card_height,
            width: self.card_width,
            height: self.card_height,
        }
    }
}

/// Rects of the visible key cards, in display order
pub fn key_card_rects(
    keys_area: Rect,
    mode: LayoutMode,
    order: &[KeyId],
    selected: usize,
) -> Vec<(KeyId, Rect)> {
    let inner = inner(keys_area);
    if inner.width == 0 || inner.height == 0 {
        return Vec::new();
    }
    let grid = GridLayout::new(inner.width, mode);
    let first_row = grid.first_visible_row(selected.min(order.len().saturating_sub(1)), inner.height);
    let visible_rows = grid.visible_rows(inner.height);

    order
        .iter()
        .enumerate()
        .filter_map(|(index, id)| {
            let (row, col) = grid.index_to_pos(index);
            let row = row.checked_sub(first_row).filter(|row| *row < visible_rows)?;
            let area = grid.card_area(inner, row, col);
            (area.bottom() <= inner.bottom()).then_some((*id, area))
        })
        .collect()
}

/// Key card rects as drop candidates
pub fn key_drop_candidates(
    keys_area: Rect,
    mode: LayoutMode,
    order: &[KeyId],
    selected: usize,
) -> Vec<(KeyId, CardRect)> {
    key_card_rects(keys_area, mode, order, selected)
        .into_iter()
        .map(|(id, rect)| (id, rect.into()))
        .collect()
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let mut spans = vec![];

    // Connection status
    let conn_status = if state.server_connected {
        Span::styled(" ● ", Style::default().fg(Color::Green))
    } else {
        Span::styled(" ○ ", Style::default().fg(Color::Red))
    };
    spans.push(conn_status);

    let hints = if state.interaction.is_dragging() {
        "Drop on a card to reorder, on a project to move/copy  Esc:cancel"
    } else {
        "h/j/k/l:nav  y:copy  e:lock  d:del key  Tab:project  x:del project  v:layout  r:refresh"
    };
    spans.push(Span::styled(hints, Style::default().fg(Color::Gray)));

    spans.push(Span::raw(" | "));
    spans.push(Span::styled(
        state.key_layout.label(),
        Style::default().fg(Color::Blue),
    ));

    let (encrypted, total) = state.encryption_counts();
    if total > 0 {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("🔒 {encrypted}/{total}"),
            Style::default().fg(Color::Yellow),
        ));
    }

    if let Some(notice) = state.notifications.status() {
        let color = match notice.level {
            NoticeLevel::Success => Color::Green,
            NoticeLevel::Info => Color::Cyan,
            NoticeLevel::Warning | NoticeLevel::Error => Color::Yellow,
        };
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(notice.message.as_str(), Style::default().fg(color)));
    }

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, area);

    // Quit hint on the right (double Ctrl+C to quit)
    let quit_hint = " ^C^C:quit ";
    let quit_area = Rect {
        x: area.x + area.width.saturating_sub(quit_hint.len() as u16),
        y: area.y,
        width: (quit_hint.len() as u16).min(area.width),
        height: 1,
    };
    let quit_widget =
        Paragraph::new(quit_hint).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
    frame.render_widget(quit_widget, quit_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dnd::hit_test;
    use pretty_assertions::assert_eq;

    fn ids(n: i64) -> Vec<KeyId> {
        (1..=n).map(KeyId).collect()
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("DATABASE_URL", 20), "DATABASE_URL");
        assert_eq!(truncate("DATABASE_URL", 8), "DATAB...");
        assert_eq!(truncate("DATABASE_URL", 2), "DA");
        assert_eq!(truncate("Überprüfung", 6), "Übe...");
        assert_eq!(truncate("anything", 0), "");
    }

    #[test]
    fn test_screen_layout_splits_sidebar_and_status() {
        let layout = ScreenLayout::new(Rect::new(0, 0, 100, 30));
        assert_eq!(layout.sidebar, Rect::new(0, 0, SIDEBAR_WIDTH, 29));
        assert_eq!(layout.keys, Rect::new(SIDEBAR_WIDTH, 0, 100 - SIDEBAR_WIDTH, 29));
        assert_eq!(layout.status, Rect::new(0, 29, 100, 1));
    }

    #[test]
    fn test_grid_columns_follow_width() {
        assert_eq!(GridLayout::new(20, LayoutMode::Grid).columns, 1);
        assert_eq!(GridLayout::new(53, LayoutMode::Grid).columns, 2);
        assert_eq!(GridLayout::new(80, LayoutMode::Grid).columns, 3);
        assert_eq!(GridLayout::new(80, LayoutMode::List).columns, 1);
    }

    #[test]
    fn test_grid_cards_wrap_rows() {
        let area = Rect::new(0, 0, 55, 20);
        let rects = key_card_rects(area, LayoutMode::Grid, &ids(3), 0);
        assert_eq!(rects.len(), 3);
        assert_eq!(rects[0].1, Rect::new(1, 1, 26, GRID_CARD_HEIGHT));
        assert_eq!(rects[1].1, Rect::new(28, 1, 26, GRID_CARD_HEIGHT));
        assert_eq!(rects[2].1, Rect::new(1, 1 + GRID_CARD_HEIGHT, 26, GRID_CARD_HEIGHT));
    }

    #[test]
    fn test_cards_below_panel_are_hidden_until_selected() {
        // Room for two list cards
        let area = Rect::new(0, 0, 40, 2 * LIST_CARD_HEIGHT + 2);
        let shown: Vec<_> = key_card_rects(area, LayoutMode::List, &ids(5), 0)
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(shown, vec![KeyId(1), KeyId(2)]);

        let scrolled: Vec<_> = key_card_rects(area, LayoutMode::List, &ids(5), 4)
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(scrolled, vec![KeyId(4), KeyId(5)]);
    }

    #[test]
    fn test_long_list_only_builds_visible_cards() {
        // Far more rows than a u16 offset can address
        let order = ids(70_000);
        let area = Rect::new(0, 0, 40, 3 * LIST_CARD_HEIGHT + 2);

        let top: Vec<_> = key_card_rects(area, LayoutMode::List, &order, 0)
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(top, vec![KeyId(1), KeyId(2), KeyId(3)]);

        let end = key_card_rects(area, LayoutMode::List, &order, order.len() - 1);
        let shown: Vec<_> = end.iter().map(|(id, _)| *id).collect();
        assert_eq!(shown, vec![KeyId(69_998), KeyId(69_999), KeyId(70_000)]);
        assert_eq!(end[0].1.y, 1);
    }

    #[test]
    fn test_hit_test_matches_drawn_card() {
        let area = Rect::new(10, 0, 55, 20);
        let candidates = key_drop_candidates(area, LayoutMode::Grid, &ids(4), 0);
        let (_, second) = key_card_rects(area, LayoutMode::Grid, &ids(4), 0)[1];
        assert_eq!(
            hit_test(pointer(second.x, second.y), &candidates),
            Some(KeyId(2))
        );
        // Spacing column between cards hits nothing
        assert_eq!(hit_test(pointer(second.x - 1, second.y), &candidates), None);
    }

    #[test]
    fn test_sidebar_rows_skip_separator() {
        let projects = vec![
            Project {
                id: ProjectId(7),
                name: "infra".to_string(),
                position: 0,
            },
            Project {
                id: ProjectId(8),
                name: "web".to_string(),
                position: 1,
            },
        ];
        let sidebar = Rect::new(0, 0, SIDEBAR_WIDTH, 20);
        assert_eq!(
            sidebar_row_at(sidebar, &projects, 3, 1),
            Some(SidebarRow::AllProjects)
        );
        assert_eq!(sidebar_row_at(sidebar, &projects, 3, 2), None);
        assert_eq!(
            sidebar_row_at(sidebar, &projects, 3, 3),
            Some(SidebarRow::Project(ProjectId(7)))
        );
        assert_eq!(
            sidebar_row_at(sidebar, &projects, 3, 4),
            Some(SidebarRow::Project(ProjectId(8)))
        );
        assert_eq!(sidebar_row_at(sidebar, &projects, 3, 5), None);
    }

    #[test]
    fn test_pointer_is_cell_centre() {
        assert_eq!(pointer(3, 4), Point::new(3.5, 4.5));
        assert_eq!(
            CardRect::from(Rect::new(1, 2, 3, 4)),
            CardRect::new(1.0, 2.0, 3.0, 4.0)
        );
    }
}
