//! Key card panel (grid or list)

use super::layout::{inner, key_card_rects, truncate};
use super::sidebar::ALL_PROJECTS_LABEL;
use crate::app::App;
use crate::dnd::{LayoutMode, Placement};
use crate::state::{ItemRef, Key, KeyId};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Per-card render flags
#[derive(Debug, Default, Clone, Copy)]
struct CardLook {
    selected: bool,
    dragged: bool,
    busy: bool,
    flashing: bool,
    drop_hint: Option<&'static str>,
}

/// Order the panel shows: the drag preview while a key is dragged
pub fn display_order(app: &App) -> Vec<KeyId> {
    match app.state.interaction.key_drag() {
        Some(drag) => drag.preview.clone(),
        None => app.state.keys.ids(),
    }
}

/// Draw the key panel
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let scope_name = state
        .interaction
        .selected_project_id()
        .and_then(|id| state.project(id))
        .map_or(ALL_PROJECTS_LABEL, |p| p.name.as_str());

    let block = Block::default()
        .title(format!(" Keys: {scope_name} ({}) ", state.keys.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(block, area);

    if state.keys.is_empty() {
        let message = Paragraph::new("No keys here.\nPress 'r' to refresh.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(message, inner(area));
        return;
    }

    let drag = state.interaction.key_drag();
    let dragged_id = state.interaction.dragged_key_id();
    let order = display_order(app);

    for (id, card_area) in key_card_rects(area, state.key_layout, &order, state.selected_key_index) {
        let Some(key) = state.keys.get(id) else {
            continue;
        };
        let item = ItemRef::Key(id);
        let drop_hint = drag
            .and_then(|d| d.placement)
            .filter(|placement| placement.target() == Some(id))
            .map(|placement| match placement {
                Placement::Before(_) => " ▲ ",
                _ => " ▼ ",
            });
        let look = CardLook {
            selected: drag.is_none() && state.selected_key() == Some(key),
            dragged: dragged_id == Some(id),
            busy: state.busy.is_busy(item),
            flashing: state.is_flashing(item),
            drop_hint,
        };
        draw_key_card(frame, card_area, key, state.key_layout, look);
    }
}

/// Draw a single key card
fn draw_key_card(frame: &mut Frame, area: Rect, key: &Key, mode: LayoutMode, look: CardLook) {
    let border_style = if look.dragged {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::DIM)
    } else if look.flashing {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else if look.drop_hint.is_some() {
        Style::default().fg(Color::Magenta)
    } else if look.selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let text_style = if look.busy || look.dragged {
        Style::default().fg(Color::DarkGray)
    } else if look.selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    if look.selected && !look.flashing {
        block = block.style(Style::default().bg(Color::DarkGray));
    }
    if let Some(hint) = look.drop_hint {
        block = block.title(Span::styled(hint, Style::default().fg(Color::Magenta)));
    }
    if look.busy {
        block = block.title_bottom(Span::styled(" … ", Style::default().fg(Color::Yellow)));
    }
    frame.render_widget(block, area);

    let inner = inner(area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }
    let width = inner.width as usize;

    let lock = if key.encrypted { "🔒 " } else { "" };
    let name_line = Line::from(vec![
        Span::styled(lock, Style::default().fg(Color::Yellow)),
        Span::styled(truncate(&key.name, width.saturating_sub(3)), text_style),
    ]);

    let value = if key.encrypted {
        "(encrypted)".to_string()
    } else {
        "•".repeat(key.value.chars().count().clamp(4, 12))
    };

    let content = match mode {
        LayoutMode::List => {
            let detail = key.description.as_deref().unwrap_or("");
            vec![Line::from(vec![
                Span::styled(lock, Style::default().fg(Color::Yellow)),
                Span::styled(truncate(&key.name, width / 2), text_style),
                Span::raw("  "),
                Span::styled(value, Style::default().fg(Color::DarkGray)),
                Span::raw("  "),
                Span::styled(
                    truncate(detail, width / 3),
                    Style::default().fg(Color::Gray),
                ),
            ])]
        }
        LayoutMode::Grid => {
            let detail = key
                .description
                .as_deref()
                .or(key.used_with.as_deref())
                .unwrap_or("");
            vec![
                name_line,
                Line::from(Span::styled(
                    truncate(detail, width),
                    Style::default().fg(Color::Gray),
                )),
                Line::from(Span::styled(value, Style::default().fg(Color::DarkGray))),
            ]
        }
    };

    frame.render_widget(Paragraph::new(content), inner);
}
