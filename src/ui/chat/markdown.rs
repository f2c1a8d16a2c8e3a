//! Minimal markdown styling for assistant replies: headings, bold, inline
//! code, and fenced code blocks, which is what the backend actually emits.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Wrap text to fit within the given width.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.len() + word.len() + 1 <= width {
            if !current_line.is_empty() {
                current_line.push(' ');
            }
            current_line.push_str(word);
        } else {
            if !current_line.is_empty() {
                lines.push(current_line);
                current_line = String::new();
            }
            current_line.push_str(word);
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Render markdown text into styled lines, word-wrapped to `width`.
pub fn render_lines(text: &str, width: usize, base: Style) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut in_code_block = false;

    for raw in text.lines() {
        let trimmed = raw.trim_start();

        if trimmed.starts_with("```") {
            in_code_block = !in_code_block;
            continue;
        }

        if in_code_block {
            lines.push(Line::from(Span::styled(
                raw.to_string(),
                Style::default().fg(Color::Cyan),
            )));
            continue;
        }

        if raw.trim().is_empty() {
            lines.push(Line::from(Span::raw("")));
            continue;
        }

        if let Some(heading) = trimmed.strip_prefix('#') {
            let title = heading.trim_start_matches('#').trim().to_string();
            lines.push(Line::from(Span::styled(
                title,
                base.add_modifier(Modifier::BOLD),
            )));
            continue;
        }

        for wrapped in wrap(raw, width) {
            lines.push(Line::from(inline_spans(&wrapped, base)));
        }
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::raw("")));
    }

    lines
}

/// Split a line on `**bold**` and `` `code` `` markers.
fn inline_spans(line: &str, base: Style) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut buffer = String::new();
    let mut bold = false;
    let mut code = false;
    let mut chars = line.chars().peekable();

    let flush = |buffer: &mut String, spans: &mut Vec<Span<'static>>, bold: bool, code: bool| {
        if buffer.is_empty() {
            return;
        }
        let style = if code {
            Style::default().fg(Color::Cyan)
        } else if bold {
            base.add_modifier(Modifier::BOLD)
        } else {
            base
        };
        spans.push(Span::styled(std::mem::take(buffer), style));
    };

    while let Some(c) = chars.next() {
        match c {
            '*' if !code && chars.peek() == Some(&'*') => {
                chars.next();
                flush(&mut buffer, &mut spans, bold, code);
                bold = !bold;
            }
            '`' => {
                flush(&mut buffer, &mut spans, bold, code);
                code = !code;
            }
            _ => buffer.push(c),
        }
    }
    flush(&mut buffer, &mut spans, bold, code);

    if spans.is_empty() {
        spans.push(Span::raw(""));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn fenced_blocks_drop_markers_and_keep_content() {
        let lines = render_lines("before\n```\noc get pods\n```\nafter", 80, Style::default());
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(texts, vec!["before", "oc get pods", "after"]);
    }

    #[test]
    fn bold_and_code_markers_are_stripped() {
        let lines = render_lines("**Command Executed:** `oc status`", 80, Style::default());
        assert_eq!(line_text(&lines[0]), "Command Executed: oc status");
        assert!(lines[0].spans.len() >= 2);
    }

    #[test]
    fn long_lines_wrap_to_width() {
        let lines = render_lines("one two three four five", 9, Style::default());
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line_text(line).len() <= 9);
        }
    }
}
