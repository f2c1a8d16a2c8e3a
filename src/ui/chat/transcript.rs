//! Append-only chat transcript display component.

use crate::events::Role;
use crate::ui::chat::markdown;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};
use uuid::Uuid;

/// A finished transcript message. Immutable once appended.
#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Rendered through the markdown styler when set; literal text otherwise.
    /// User input is always literal so it cannot be interpreted as markup.
    pub markdown: bool,
    /// Distinguished command-result message mirrored from the terminal log.
    pub command_result: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// One transcript entry: a message, or the placeholder standing in for an
/// outstanding request.
#[derive(Debug, Clone)]
pub enum Entry {
    Message(Message),
    Loading { id: Uuid },
}

/// Ordered, append-only transcript. Cleared only wholesale.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Message(message) => Some(message),
            Entry::Loading { .. } => None,
        })
    }

    pub fn push_user(&mut self, content: String) {
        self.push_message(Message {
            role: Role::User,
            content,
            markdown: false,
            command_result: false,
            timestamp: chrono::Utc::now(),
        });
    }

    pub fn push_assistant(&mut self, content: String) {
        self.push_message(Message {
            role: Role::Assistant,
            content,
            markdown: true,
            command_result: false,
            timestamp: chrono::Utc::now(),
        });
    }

    /// Assistant-role message rendered as literal text (help output, errors).
    pub fn push_assistant_plain(&mut self, content: String) {
        self.push_message(Message {
            role: Role::Assistant,
            content,
            markdown: false,
            command_result: false,
            timestamp: chrono::Utc::now(),
        });
    }

    pub fn push_command_result(&mut self, content: String) {
        self.push_message(Message {
            role: Role::Assistant,
            content,
            markdown: true,
            command_result: true,
            timestamp: chrono::Utc::now(),
        });
    }

    fn push_message(&mut self, message: Message) {
        self.entries.push(Entry::Message(message));
    }

    /// Append a loading placeholder and return its id.
    pub fn push_loading(&mut self) -> Uuid {
        let id = Uuid::new_v4();
        self.entries.push(Entry::Loading { id });
        id
    }

    /// Remove the placeholder with the given id, wherever it sits.
    pub fn remove_loading(&mut self, id: Uuid) {
        self.entries
            .retain(|entry| !matches!(entry, Entry::Loading { id: entry_id } if *entry_id == id));
    }

    pub fn has_loading(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| matches!(entry, Entry::Loading { .. }))
    }

    /// Reset to the initial welcome state.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

impl Widget for &Transcript {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title("💬 Chat");
        let inner = block.inner(area);
        block.render(area, buf);

        if self.entries.is_empty() {
            let welcome = [
                Line::from(Span::styled(
                    "Welcome to ROSA AI Agent",
                    Style::default().fg(Color::Green),
                )),
                Line::from(Span::raw("")),
                Line::from(Span::styled(
                    "Your expert assistant for Red Hat OpenShift Service on AWS",
                    Style::default().fg(Color::Gray),
                )),
                Line::from(Span::styled(
                    "Ask me anything about ROSA cluster deployment, CLI commands, or troubleshooting!",
                    Style::default().fg(Color::Gray),
                )),
            ];
            for (i, line) in welcome.iter().enumerate() {
                if i < inner.height as usize {
                    buf.set_line(inner.x, inner.y + i as u16, line, inner.width);
                }
            }
            return;
        }

        let mut all_lines: Vec<Line> = Vec::new();
        for entry in &self.entries {
            match entry {
                Entry::Message(message) => {
                    all_lines.extend(render_message(message, inner.width));
                }
                Entry::Loading { .. } => {
                    all_lines.push(loading_line());
                }
            }
            // spacing between entries
            all_lines.push(Line::from(Span::raw("")));
        }

        // Pin the view to the bottom: show the last `height` lines.
        let height = inner.height as usize;
        let start = all_lines.len().saturating_sub(height);
        for (i, line) in all_lines[start..].iter().enumerate() {
            buf.set_line(inner.x, inner.y + i as u16, line, inner.width);
        }
    }
}

fn render_message(message: &Message, width: u16) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let avatar = if message.command_result {
        "⚡"
    } else {
        match message.role {
            Role::User => "👤",
            Role::Assistant => "🤖",
        }
    };
    let timestamp = message.timestamp.format("%H:%M:%S").to_string();
    let header = format!("{} {} {}", avatar, timestamp, "─".repeat(20));
    lines.push(Line::from(Span::styled(
        header,
        Style::default().fg(Color::DarkGray),
    )));

    let style = match message.role {
        Role::User => Style::default().fg(Color::Blue),
        Role::Assistant => Style::default().fg(Color::Green),
    };
    let content_width = width.saturating_sub(2) as usize;

    if message.markdown {
        for line in markdown::render_lines(&message.content, content_width, style) {
            let mut spans = vec![Span::raw("  ")];
            spans.extend(line.spans);
            lines.push(Line::from(spans));
        }
    } else {
        for raw in message.content.lines() {
            for wrapped in markdown::wrap(raw, content_width) {
                lines.push(Line::from(vec![Span::raw("  "), Span::styled(wrapped, style)]));
            }
        }
    }

    lines
}

fn loading_line() -> Line<'static> {
    let dots = match (std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        / 300)
        % 4
    {
        0 => ".",
        1 => "..",
        2 => "...",
        _ => "   ",
    };
    Line::from(vec![
        Span::styled("🤖 thinking", Style::default().fg(Color::Green)),
        Span::styled(dots.to_string(), Style::default().fg(Color::Yellow)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_removed_by_id() {
        let mut transcript = Transcript::new();
        transcript.push_user("hello".to_string());
        let id = transcript.push_loading();
        assert!(transcript.has_loading());

        transcript.remove_loading(id);
        assert!(!transcript.has_loading());
        assert_eq!(transcript.entries().len(), 1);
    }

    #[test]
    fn messages_keep_append_order() {
        let mut transcript = Transcript::new();
        transcript.push_user("first".to_string());
        transcript.push_command_result("**Command Executed:** `oc status`".to_string());
        transcript.push_assistant("second".to_string());

        let contents: Vec<&str> = transcript.messages().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "**Command Executed:** `oc status`", "second"]);
        assert!(transcript.messages().nth(1).unwrap().command_result);
    }

    #[test]
    fn user_messages_are_literal_text() {
        let mut transcript = Transcript::new();
        transcript.push_user("**not bold**".to_string());
        assert!(!transcript.messages().next().unwrap().markdown);
    }

    #[test]
    fn reset_returns_to_welcome_state() {
        let mut transcript = Transcript::new();
        transcript.push_user("hello".to_string());
        transcript.push_loading();
        transcript.reset();
        assert!(transcript.entries().is_empty());
    }
}
