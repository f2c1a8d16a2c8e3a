//! Read-only system info panel, populated once from the health endpoint.

use crate::api::HealthReport;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

#[derive(Debug, Clone)]
pub enum SystemInfo {
    Loading,
    Ready {
        status: String,
        provider: String,
        /// Tool name and the first line of its version string.
        tools: Vec<(String, String)>,
    },
    Failed,
}

impl SystemInfo {
    pub fn from_report(report: HealthReport) -> Self {
        let tools = report
            .cli_tools
            .into_iter()
            .map(|(tool, version)| {
                let first_line = version.lines().next().unwrap_or_default().to_string();
                (tool, first_line)
            })
            .collect();
        SystemInfo::Ready {
            status: report.status,
            provider: report.provider,
            tools,
        }
    }
}

impl Widget for &SystemInfo {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title("System");
        let inner = block.inner(area);
        block.render(area, buf);

        let lines: Vec<Line> = match self {
            SystemInfo::Loading => vec![Line::from(Span::styled(
                "Loading system information...",
                Style::default().fg(Color::DarkGray),
            ))],
            SystemInfo::Failed => vec![Line::from(Span::styled(
                "Failed to load system information",
                Style::default().fg(Color::Red),
            ))],
            SystemInfo::Ready {
                status,
                provider,
                tools,
            } => {
                let mut lines = vec![
                    Line::from(vec![
                        Span::raw("Status: "),
                        Span::styled(status.clone(), Style::default().fg(Color::Green)),
                    ]),
                    Line::from(vec![
                        Span::raw("Current provider: "),
                        Span::styled(provider.clone(), Style::default().fg(Color::Gray)),
                    ]),
                    Line::from(Span::raw("CLI tools:")),
                ];
                for (tool, version) in tools {
                    lines.push(Line::from(vec![
                        Span::raw("  "),
                        Span::styled(tool.clone(), Style::default().fg(Color::Cyan)),
                        Span::raw(format!(": {version}")),
                    ]));
                }
                lines
            }
        };

        for (i, line) in lines.iter().enumerate() {
            if i < inner.height as usize {
                buf.set_line(inner.x, inner.y + i as u16, line, inner.width);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn versions_are_truncated_to_their_first_line() {
        let mut cli_tools = BTreeMap::new();
        cli_tools.insert(
            "oc".to_string(),
            "Client Version: 4.15.0\nKustomize Version: v5".to_string(),
        );
        cli_tools.insert("rosa".to_string(), "1.2.40".to_string());

        let info = SystemInfo::from_report(HealthReport {
            status: "healthy".to_string(),
            provider: "groq".to_string(),
            cli_tools,
        });

        match info {
            SystemInfo::Ready { tools, .. } => {
                assert_eq!(
                    tools,
                    vec![
                        ("oc".to_string(), "Client Version: 4.15.0".to_string()),
                        ("rosa".to_string(), "1.2.40".to_string()),
                    ]
                );
            }
            other => panic!("expected ready info, got {other:?}"),
        }
    }
}
