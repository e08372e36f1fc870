//! Confirmation before a key is deleted

use super::base::{centered_rect, hint_line, option_lines, render_box, title_line};
use crate::state::PendingKeyDelete;
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
    Frame,
};

pub fn render_delete_key_dialog(frame: &mut Frame, pending: &PendingKeyDelete) {
    let area = centered_rect(frame.area(), 50, 10);

    let mut content = vec![
        title_line("Delete key", Color::Red),
        Line::from(""),
        Line::from(vec![
            Span::styled("Key: ", Style::default().fg(Color::DarkGray)),
            Span::styled(pending.key_name.clone(), Style::default().fg(Color::White)),
        ]),
        Line::from(""),
    ];
    content.extend(option_lines(
        &[("Keep", Color::White), ("Delete", Color::Red)],
        usize::from(pending.confirmed),
    ));
    content.push(Line::from(""));
    content.push(hint_line(&[("y", "delete"), ("Tab", "switch"), ("Esc", "cancel")]));

    render_box(frame, area, Color::Red, content);
}
