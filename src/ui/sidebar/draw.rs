//! Sidebar drawing functions

use super::ALL_PROJECTS_LABEL;
use crate::app::App;
use crate::dnd::InsertSide;
use crate::state::{ItemRef, ProjectId};
use crate::ui::layout::{inner, sidebar_rows, truncate, SidebarRow};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// How a row should look while a gesture is in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowCue {
    None,
    /// The project row being dragged
    Dragged,
    /// Dragged project will land above or below this row
    Insert(InsertSide),
    /// Dragged key would be moved or copied here
    KeyTarget,
}

fn row_cue(app: &App, project_id: ProjectId) -> RowCue {
    let interaction = &app.state.interaction;
    if let Some(drag) = interaction.project_drag() {
        if drag.project_id == project_id {
            return RowCue::Dragged;
        }
        if let Some(hover) = drag.hover.filter(|h| h.target == project_id) {
            return RowCue::Insert(hover.side);
        }
    }
    if interaction
        .key_drag()
        .is_some_and(|d| d.hovered_project == Some(project_id))
    {
        return RowCue::KeyTarget;
    }
    RowCue::None
}

/// Draw the project list with the "All Projects" row on top
pub fn draw_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let block = Block::default()
        .title(" Projects ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(block, area);

    let selected = state.interaction.selected_project_id();

    for (row, rect) in sidebar_rows(area, &state.projects) {
        let is_selected = row.project_id() == selected;
        let prefix = if is_selected { "▸ " } else { "  " };

        let (label, cue, item) = match row {
            SidebarRow::AllProjects => (ALL_PROJECTS_LABEL.to_string(), RowCue::None, None),
            SidebarRow::Project(id) => {
                let name = state
                    .project(id)
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                (name, row_cue(app, id), Some(ItemRef::Project(id)))
            }
        };

        let mut style = if is_selected {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        if let Some(item) = item {
            if state.busy.is_busy(item) {
                style = Style::default().fg(Color::DarkGray);
            } else if state.is_flashing(item) {
                style = style.bg(Color::Green).fg(Color::Black);
            }
        }

        let marker = match cue {
            RowCue::None => Span::raw(""),
            RowCue::Dragged => {
                style = style.fg(Color::Yellow).add_modifier(Modifier::DIM);
                Span::raw("")
            }
            RowCue::Insert(InsertSide::Before) => {
                Span::styled("↑ ", Style::default().fg(Color::Magenta))
            }
            RowCue::Insert(InsertSide::After) => {
                Span::styled("↓ ", Style::default().fg(Color::Magenta))
            }
            RowCue::KeyTarget => {
                style = style.bg(Color::Blue).fg(Color::White);
                Span::styled("⇢ ", Style::default().fg(Color::White).bg(Color::Blue))
            }
        };

        let max_len = rect.width.saturating_sub(4) as usize;
        let line = Line::from(vec![
            Span::styled(prefix, style),
            marker,
            Span::styled(truncate(&label, max_len), style),
        ]);
        frame.render_widget(Paragraph::new(line), rect);
    }

    if state.projects.is_empty() {
        let inner = inner(area);
        if inner.height > 3 {
            let hint = Rect::new(inner.x, inner.y + 2, inner.width, 1);
            frame.render_widget(
                Paragraph::new("  No projects").style(Style::default().fg(Color::DarkGray)),
                hint,
            );
        }
    }
}
