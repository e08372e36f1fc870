//! Shared dialog building blocks

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Configuration for rendering a message dialog
pub struct DialogConfig<'a> {
    pub title: &'a str,
    pub title_color: Color,
    pub border_color: Color,
    /// Message content (can be multi-line with \n)
    pub message: &'a str,
    /// Hint text shown at the bottom (e.g., "Press Enter to dismiss")
    pub hint: Option<Vec<Span<'a>>>,
    pub max_width: u16,
}

/// Rect of the given size centred in `area`, clamped to fit
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Clear `area` and draw `content` in a bordered box
pub fn render_box(frame: &mut Frame, area: Rect, border_color: Color, content: Vec<Line>) {
    frame.render_widget(Clear, area);
    let dialog = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color))
                .style(Style::default().bg(Color::Black)),
        )
        .style(Style::new().bg(Color::Black).fg(Color::White));
    frame.render_widget(dialog, area);
}

/// Bold coloured title line
pub fn title_line(title: impl Into<String>, color: Color) -> Line<'static> {
    Line::from(Span::styled(
        title.into(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

/// One line per option, the selected one marked and coloured
pub fn option_lines(labels: &[(&str, Color)], selected: usize) -> Vec<Line<'static>> {
    labels
        .iter()
        .enumerate()
        .map(|(i, (label, color))| {
            let is_selected = i == selected;
            let prefix = if is_selected { "▸ " } else { "  " };
            let style = if is_selected {
                Style::default().fg(*color).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Line::from(Span::styled(format!("{prefix}{label}"), style))
        })
        .collect()
}

/// Key hint line: pairs of (key, description)
pub fn hint_line(pairs: &[(&'static str, &'static str)]) -> Line<'static> {
    let spans = pairs
        .iter()
        .flat_map(|(key, what)| {
            [
                Span::styled(*key, Style::default().fg(Color::Cyan)),
                Span::styled(format!(" {what}  "), Style::default().fg(Color::DarkGray)),
            ]
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

/// Render a centered, word-wrapped message dialog
pub fn render_dialog(frame: &mut Frame, config: DialogConfig) {
    let area = frame.area();
    let padding = 4u16; // 2 chars padding on each side
    let max_line_width = config.max_width.saturating_sub(padding) as usize;

    let wrapped_lines = wrap_text(config.message, max_line_width);
    let line_count = wrapped_lines.len();

    let content_width = wrapped_lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .max(config.title.chars().count()) as u16;
    let dialog_width = (content_width + padding + 2).min(config.max_width); // +2 for borders

    // Height: title + blank + message lines + blank (if hint) + hint + borders
    let hint_lines = if config.hint.is_some() { 2 } else { 0 };
    let dialog_height = (2 + line_count as u16 + hint_lines + 2).max(5);

    let mut content = vec![title_line(config.title, config.title_color), Line::from("")];
    content.extend(wrapped_lines.into_iter().map(Line::from));
    if let Some(hint_spans) = config.hint {
        content.push(Line::from(""));
        content.push(Line::from(hint_spans));
    }

    render_box(
        frame,
        centered_rect(area, dialog_width, dialog_height),
        config.border_color,
        content,
    );
}

/// Wrap text to fit within a maximum width
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        if paragraph.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        for word in paragraph.split_whitespace() {
            if current_line.len() + word.len() + 1 > max_width && !current_line.is_empty() {
                lines.push(std::mem::take(&mut current_line));
            }
            if !current_line.is_empty() {
                current_line.push(' ');
            }
            current_line.push_str(word);
        }
        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_breaks_on_words() {
        let lines = wrap_text("Key was moved but re-encryption failed", 16);
        assert_eq!(lines, vec!["Key was moved", "but", "re-encryption", "failed"]);
    }

    #[test]
    fn test_centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(centered_rect(area, 20, 4), Rect::new(10, 3, 20, 4));
        assert_eq!(centered_rect(area, 60, 20), area);
    }
}
