//! Move/copy choice shown after a key is dropped on another project

use super::base::{centered_rect, hint_line, option_lines, render_box, title_line};
use crate::state::{MoveMode, PendingMove};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
    Frame,
};

pub fn render_move_copy_dialog(frame: &mut Frame, pending: &PendingMove) {
    let area = centered_rect(frame.area(), 56, 12);

    let selected = match pending.mode {
        MoveMode::Move => 0,
        MoveMode::Copy => 1,
    };

    let mut content = vec![
        title_line("Move or copy key", Color::Cyan),
        Line::from(""),
        Line::from(vec![
            Span::styled("Key:    ", Style::default().fg(Color::DarkGray)),
            Span::styled(pending.key_name.clone(), Style::default().fg(Color::White)),
            Span::styled(
                if pending.encrypted { "  🔒" } else { "" },
                Style::default().fg(Color::Yellow),
            ),
        ]),
        Line::from(vec![
            Span::styled("Target: ", Style::default().fg(Color::DarkGray)),
            Span::styled(pending.target_name.clone(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(""),
    ];
    content.extend(option_lines(
        &[
            ("Move (remove from current project)", Color::Yellow),
            ("Copy (keep the original)", Color::Green),
        ],
        selected,
    ));
    content.push(Line::from(""));
    content.push(hint_line(&[
        ("↑↓/m/c", "select"),
        ("Enter", "confirm"),
        ("Esc", "cancel"),
    ]));

    render_box(frame, area, Color::Cyan, content);
}
