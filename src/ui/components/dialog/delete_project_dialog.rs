//! Delete-project dialog with the keep/delete keys choice

use super::base::{centered_rect, hint_line, option_lines, render_box, title_line};
use crate::state::{DeleteChoice, PendingProjectDelete};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
    Frame,
};

pub fn render_delete_project_dialog(frame: &mut Frame, pending: &PendingProjectDelete) {
    let area = centered_rect(frame.area(), 56, 12);

    let selected = DeleteChoice::ALL
        .iter()
        .position(|c| *c == pending.choice)
        .unwrap_or(0);
    let labels: Vec<(&str, Color)> = DeleteChoice::ALL
        .iter()
        .map(|c| {
            let color = match c {
                DeleteChoice::Cancel => Color::White,
                DeleteChoice::KeepKeys => Color::Yellow,
                DeleteChoice::DeleteKeys => Color::Red,
            };
            (c.label(), color)
        })
        .collect();

    let mut content = vec![
        title_line("Delete project", Color::Red),
        Line::from(""),
        Line::from(vec![
            Span::styled("Project: ", Style::default().fg(Color::DarkGray)),
            Span::styled(pending.project_name.clone(), Style::default().fg(Color::White)),
        ]),
        Line::from("What should happen to its keys?"),
        Line::from(""),
    ];
    content.extend(option_lines(&labels, selected));
    content.push(Line::from(""));
    content.push(hint_line(&[
        ("↑↓", "select"),
        ("Enter", "confirm"),
        ("Esc", "cancel"),
    ]));

    render_box(frame, area, Color::Red, content);
}
