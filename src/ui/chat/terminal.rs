//! Terminal log pane mirroring commands the backend executed.

use crate::ui::chat::markdown;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalLine {
    Command(String),
    Output(String),
    Error(String),
    Info(String),
}

/// Sequence of command/output-or-error pairs, plus informational lines.
#[derive(Debug, Clone)]
pub struct TerminalLog {
    lines: Vec<TerminalLine>,
}

impl Default for TerminalLog {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalLog {
    pub fn new() -> Self {
        Self {
            lines: vec![TerminalLine::Info(
                "Commands executed by the assistant appear here.".to_string(),
            )],
        }
    }

    pub fn lines(&self) -> &[TerminalLine] {
        &self.lines
    }

    /// Record one executed command: the command line, then exactly one of an
    /// output line or an error line, in that order.
    pub fn push_execution(&mut self, command: &str, output: Option<&str>, error: Option<&str>) {
        self.lines.push(TerminalLine::Command(command.to_string()));
        if let Some(error) = error {
            self.lines.push(TerminalLine::Error(error.to_string()));
        } else if let Some(output) = output {
            self.lines.push(TerminalLine::Output(output.to_string()));
        }
    }

    /// Reset to the informational state.
    pub fn reset(&mut self) {
        self.lines = vec![TerminalLine::Info("Terminal cleared.".to_string())];
    }
}

impl Widget for &TerminalLog {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title("⚡ Terminal");
        let inner = block.inner(area);
        block.render(area, buf);

        let width = inner.width.saturating_sub(2) as usize;
        let mut all_lines: Vec<Line> = Vec::new();
        for line in &self.lines {
            let (prefix, text, style) = match line {
                TerminalLine::Command(text) => {
                    ("$ ", text, Style::default().fg(Color::White))
                }
                TerminalLine::Output(text) => ("  ", text, Style::default().fg(Color::Gray)),
                TerminalLine::Error(text) => ("  ", text, Style::default().fg(Color::Red)),
                TerminalLine::Info(text) => ("  ", text, Style::default().fg(Color::DarkGray)),
            };
            for raw in text.lines() {
                for wrapped in markdown::wrap(raw, width) {
                    all_lines.push(Line::from(vec![
                        Span::raw(prefix),
                        Span::styled(wrapped, style),
                    ]));
                }
            }
        }

        // Pinned to the bottom, same as the transcript.
        let height = inner.height as usize;
        let start = all_lines.len().saturating_sub(height);
        for (i, line) in all_lines[start..].iter().enumerate() {
            buf.set_line(inner.x, inner.y + i as u16, line, inner.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_execution_logs_command_then_output() {
        let mut log = TerminalLog::new();
        log.push_execution("oc get pods", Some("pod/a Running"), None);

        let lines = &log.lines()[1..];
        assert_eq!(
            lines,
            &[
                TerminalLine::Command("oc get pods".to_string()),
                TerminalLine::Output("pod/a Running".to_string()),
            ]
        );
    }

    #[test]
    fn failed_execution_logs_error_not_output() {
        let mut log = TerminalLog::new();
        log.push_execution("oc status", None, Some("timeout"));

        let lines = &log.lines()[1..];
        assert_eq!(
            lines,
            &[
                TerminalLine::Command("oc status".to_string()),
                TerminalLine::Error("timeout".to_string()),
            ]
        );
    }

    #[test]
    fn reset_leaves_a_single_info_line() {
        let mut log = TerminalLog::new();
        log.push_execution("oc get pods", Some("pod/a Running"), None);
        log.reset();
        assert_eq!(
            log.lines(),
            &[TerminalLine::Info("Terminal cleared.".to_string())]
        );
    }
}
