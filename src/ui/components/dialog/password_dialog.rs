//! Masked password prompt for locking and unlocking keys

use super::base::{centered_rect, hint_line, render_box, title_line};
use crate::state::PasswordPrompt;
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
    Frame,
};

pub fn render_password_dialog(frame: &mut Frame, prompt: &PasswordPrompt, key_name: &str) {
    let area = centered_rect(frame.area(), 50, 10);

    let error_line = match &prompt.error {
        Some(error) => Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))),
        None => Line::from(""),
    };

    let label = if prompt.is_confirming() {
        "Confirm:  "
    } else {
        "Password: "
    };

    let content = vec![
        title_line(prompt.action.title(), Color::Yellow),
        Line::from(""),
        Line::from(vec![
            Span::styled("Key: ", Style::default().fg(Color::DarkGray)),
            Span::raw(key_name.to_string()),
        ]),
        Line::from(vec![
            Span::styled(label, Style::default().fg(Color::DarkGray)),
            Span::styled(prompt.masked(), Style::default().fg(Color::White)),
            Span::styled("▏", Style::default().fg(Color::Cyan)),
        ]),
        error_line,
        Line::from(""),
        hint_line(&[("Enter", prompt.action.submit_label()), ("Esc", "cancel")]),
    ];

    render_box(frame, area, Color::Yellow, content);
}
