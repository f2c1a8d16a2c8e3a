//! Provider settings form: one visible field group per provider variant,
//! validate-and-save, and an independent test-connection action.

use crate::events::SettingsEvent;
use crate::provider::{self, Provider, ProviderConfig, ProviderFields};
use crate::ui::settings::info::SystemInfo;
use crate::ui::settings::notice::{NoticeKind, NoticeSlot};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};
use std::time::Instant;

/// A single editable field row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Endpoint,
    ApiKey,
    Model,
}

impl FieldKind {
    fn label(self) -> &'static str {
        match self {
            FieldKind::Endpoint => "Endpoint URL",
            FieldKind::ApiKey => "API key",
            FieldKind::Model => "Model",
        }
    }
}

/// Exactly one field group is visible; a pure function of the selection.
pub fn visible_fields(provider: Provider) -> &'static [FieldKind] {
    if provider::spec(provider).has_endpoint {
        &[FieldKind::Endpoint, FieldKind::ApiKey, FieldKind::Model]
    } else {
        &[FieldKind::ApiKey, FieldKind::Model]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Selector,
    Field(FieldKind),
    Save,
    Test,
}

/// Actions the form asks the app layer to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsAction {
    None,
    Save(ProviderConfig),
    Test(ProviderConfig),
    Back,
}

pub struct SettingsForm {
    selected: Provider,
    groups: [ProviderFields; Provider::ALL.len()],
    focus: Focus,
    saving: bool,
    testing: bool,
    notice: NoticeSlot,
    pub info: SystemInfo,
}

impl Default for SettingsForm {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsForm {
    pub fn new() -> Self {
        Self {
            selected: Provider::Groq,
            groups: Default::default(),
            focus: Focus::Selector,
            saving: false,
            testing: false,
            notice: NoticeSlot::default(),
            info: SystemInfo::Loading,
        }
    }

    pub fn selected(&self) -> Provider {
        self.selected
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn is_testing(&self) -> bool {
        self.testing
    }

    pub fn notice(&self) -> Option<&crate::ui::settings::notice::Notice> {
        self.notice.current()
    }

    fn index(provider: Provider) -> usize {
        Provider::ALL
            .iter()
            .position(|p| *p == provider)
            .unwrap_or_default()
    }

    pub fn fields(&self, provider: Provider) -> &ProviderFields {
        &self.groups[Self::index(provider)]
    }

    pub fn fields_mut(&mut self, provider: Provider) -> &mut ProviderFields {
        &mut self.groups[Self::index(provider)]
    }

    /// Select a variant; the visible field group follows deterministically.
    pub fn select(&mut self, provider: Provider) {
        self.selected = provider;
        if let Focus::Field(kind) = self.focus {
            if !visible_fields(provider).contains(&kind) {
                self.focus = Focus::Selector;
            }
        }
    }

    /// Populate the selected variant's fields from a loaded config, applying
    /// the documented default model when the backend omitted one. Fields of
    /// other variants are left untouched.
    pub fn apply_loaded(&mut self, config: ProviderConfig) {
        let (provider, mut fields) = config.into_fields();
        if fields.model.is_empty() {
            fields.model = provider::spec(provider).default_model.to_string();
        }
        *self.fields_mut(provider) = fields;
        self.select(provider);
    }

    fn assemble_validated(&mut self, now: Instant) -> Option<ProviderConfig> {
        let fields = self.fields(self.selected);
        if let Err(message) = provider::validate(self.selected, fields) {
            self.notice.set(NoticeKind::Error, message, now);
            return None;
        }
        Some(provider::assemble(self.selected, fields))
    }

    /// Validate and assemble for save. `None` means no request may be sent.
    pub fn begin_save(&mut self, now: Instant) -> Option<ProviderConfig> {
        if self.saving {
            return None;
        }
        let config = self.assemble_validated(now)?;
        self.saving = true;
        Some(config)
    }

    /// Same assembly and validation as save, for the test-connection action.
    /// Independent of `begin_save`; only its own busy flag gates it.
    pub fn begin_test(&mut self, now: Instant) -> Option<ProviderConfig> {
        if self.testing {
            return None;
        }
        let config = self.assemble_validated(now)?;
        self.testing = true;
        Some(config)
    }

    pub fn handle_event(&mut self, event: SettingsEvent, now: Instant) {
        match event {
            SettingsEvent::Loaded(config) => self.apply_loaded(config),
            SettingsEvent::LoadFailed(message) => {
                self.notice.set(
                    NoticeKind::Error,
                    format!("Failed to load settings: {message}"),
                    now,
                );
            }
            SettingsEvent::SaveAck(ack) => {
                self.saving = false;
                if ack.success {
                    self.notice.set(
                        NoticeKind::Success,
                        "Settings saved successfully! You can now use the chat.",
                        now,
                    );
                } else {
                    let error = ack
                        .error
                        .unwrap_or_else(|| "Failed to save settings".to_string());
                    self.notice.set(NoticeKind::Error, error, now);
                }
            }
            SettingsEvent::SaveFailed(message) => {
                self.saving = false;
                self.notice.set(
                    NoticeKind::Error,
                    format!("Failed to save settings: {message}"),
                    now,
                );
            }
            SettingsEvent::TestAck(ack) => {
                self.testing = false;
                if ack.success {
                    self.notice
                        .set(NoticeKind::Success, "Connection test successful!", now);
                } else {
                    let error = ack
                        .error
                        .unwrap_or_else(|| "Connection test failed".to_string());
                    self.notice.set(NoticeKind::Error, error, now);
                }
            }
            SettingsEvent::TestFailed(message) => {
                self.testing = false;
                self.notice.set(
                    NoticeKind::Error,
                    format!("Connection test failed: {message}"),
                    now,
                );
            }
            SettingsEvent::SystemInfo(report) => {
                self.info = SystemInfo::from_report(report);
            }
            SettingsEvent::SystemInfoFailed => {
                self.info = SystemInfo::Failed;
            }
        }
    }

    /// Expire the notice if its time is up.
    pub fn tick(&mut self, now: Instant) {
        self.notice.tick(now);
    }

    fn rows(&self) -> Vec<Focus> {
        let mut rows = vec![Focus::Selector];
        rows.extend(visible_fields(self.selected).iter().map(|f| Focus::Field(*f)));
        rows.push(Focus::Save);
        rows.push(Focus::Test);
        rows
    }

    fn move_focus(&mut self, delta: isize) {
        let rows = self.rows();
        let current = rows.iter().position(|r| *r == self.focus).unwrap_or(0) as isize;
        let len = rows.len() as isize;
        let next = (current + delta).rem_euclid(len);
        self.focus = rows[next as usize];
    }

    fn cycle_provider(&mut self, delta: isize) {
        let current = Self::index(self.selected) as isize;
        let len = Provider::ALL.len() as isize;
        let next = (current + delta).rem_euclid(len);
        self.select(Provider::ALL[next as usize]);
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> SettingsAction {
        if key.kind != KeyEventKind::Press {
            return SettingsAction::None;
        }

        match key.code {
            KeyCode::Esc => return SettingsAction::Back,
            KeyCode::Tab | KeyCode::Down => self.move_focus(1),
            KeyCode::BackTab | KeyCode::Up => self.move_focus(-1),
            KeyCode::Left if self.focus == Focus::Selector => self.cycle_provider(-1),
            KeyCode::Right if self.focus == Focus::Selector => self.cycle_provider(1),
            KeyCode::Enter => match self.focus {
                Focus::Save => {
                    if let Some(config) = self.begin_save(now) {
                        return SettingsAction::Save(config);
                    }
                }
                Focus::Test => {
                    if let Some(config) = self.begin_test(now) {
                        return SettingsAction::Test(config);
                    }
                }
                _ => self.move_focus(1),
            },
            KeyCode::Char(c) => {
                if let Focus::Field(kind) = self.focus {
                    let provider = self.selected;
                    self.field_value_mut(provider, kind).push(c);
                }
            }
            KeyCode::Backspace => {
                if let Focus::Field(kind) = self.focus {
                    let provider = self.selected;
                    self.field_value_mut(provider, kind).pop();
                }
            }
            _ => {}
        }

        SettingsAction::None
    }

    fn field_value_mut(&mut self, provider: Provider, kind: FieldKind) -> &mut String {
        let fields = self.fields_mut(provider);
        match kind {
            FieldKind::Endpoint => &mut fields.endpoint_url,
            FieldKind::ApiKey => &mut fields.api_key,
            FieldKind::Model => &mut fields.model,
        }
    }

    fn field_value(&self, kind: FieldKind) -> &str {
        let fields = self.fields(self.selected);
        match kind {
            FieldKind::Endpoint => &fields.endpoint_url,
            FieldKind::ApiKey => &fields.api_key,
            FieldKind::Model => &fields.model,
        }
    }
}

impl Widget for &SettingsForm {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(8)])
            .split(area);

        self.render_form(chunks[0], buf);
        self.info.render(chunks[1], buf);
    }
}

impl SettingsForm {
    fn render_form(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("⚙ Provider Settings (Esc to return)");
        let inner = block.inner(area);
        block.render(area, buf);

        let focus_style = Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let label_style = Style::default().fg(Color::Gray);

        let mut lines: Vec<Line> = Vec::new();

        let selector_style = if self.focus == Focus::Selector {
            focus_style
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(vec![
            Span::styled("Provider: ", label_style),
            Span::styled(
                format!("◀ {} ▶", provider::spec(self.selected).label),
                selector_style,
            ),
        ]));
        lines.push(Line::from(Span::raw("")));

        for kind in visible_fields(self.selected) {
            let value = self.field_value(*kind);
            let display = if *kind == FieldKind::ApiKey {
                "•".repeat(value.chars().count().min(32))
            } else {
                value.to_string()
            };
            let style = if self.focus == Focus::Field(*kind) {
                focus_style
            } else {
                Style::default().fg(Color::White)
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{:>12}: ", kind.label()), label_style),
                Span::styled(display, style),
            ]));
        }
        lines.push(Line::from(Span::raw("")));

        let save_label = if self.saving { "Saving..." } else { "Save Settings" };
        let test_label = if self.testing {
            "Testing..."
        } else {
            "Test Connection"
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("[ {save_label} ]"),
                if self.focus == Focus::Save {
                    focus_style
                } else {
                    Style::default().fg(Color::Green)
                },
            ),
            Span::raw("  "),
            Span::styled(
                format!("[ {test_label} ]"),
                if self.focus == Focus::Test {
                    focus_style
                } else {
                    Style::default().fg(Color::Yellow)
                },
            ),
        ]));

        if let Some(notice) = self.notice.current() {
            let color = match notice.kind {
                NoticeKind::Success => Color::Green,
                NoticeKind::Error => Color::Red,
            };
            lines.push(Line::from(Span::raw("")));
            lines.push(Line::from(Span::styled(
                notice.text.clone(),
                Style::default().fg(color),
            )));
        }

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
    use crate::api::SettingsAck;

    fn now() -> Instant {
        Instant::now()
    }

    #[test]
    fn exactly_one_field_group_is_visible() {
        assert_eq!(visible_fields(Provider::Groq), &[FieldKind::ApiKey, FieldKind::Model]);
        assert_eq!(visible_fields(Provider::Openai), &[FieldKind::ApiKey, FieldKind::Model]);
        assert_eq!(
            visible_fields(Provider::Local),
            &[FieldKind::Endpoint, FieldKind::ApiKey, FieldKind::Model]
        );
    }

    #[test]
    fn loading_empty_config_applies_the_default_model() {
        let mut form = SettingsForm::new();
        let config: ProviderConfig =
            serde_json::from_str(r#"{"provider":"openai","config":{}}"#).unwrap();
        form.apply_loaded(config);

        assert_eq!(form.selected(), Provider::Openai);
        assert_eq!(form.fields(Provider::Openai).api_key, "");
        assert_eq!(form.fields(Provider::Openai).model, "gpt-4");
        // Other variants' fields stay untouched.
        assert_eq!(form.fields(Provider::Groq), &ProviderFields::default());
    }

    #[test]
    fn save_with_missing_key_is_rejected_before_any_request() {
        for provider in [Provider::Groq, Provider::Openai, Provider::Anthropic] {
            let mut form = SettingsForm::new();
            form.select(provider);
            form.fields_mut(provider).model = "some-model".to_string();

            assert!(form.begin_save(now()).is_none());
            assert!(!form.is_saving());
            let notice = form.notice().unwrap();
            assert_eq!(notice.kind, NoticeKind::Error);
            assert!(notice.text.contains("API key is required"));
        }
    }

    #[test]
    fn local_accepts_empty_key_but_not_empty_endpoint() {
        let mut form = SettingsForm::new();
        form.select(Provider::Local);
        form.fields_mut(Provider::Local).model = "llama2".to_string();

        assert!(form.begin_save(now()).is_none());
        assert!(form.notice().unwrap().text.contains("Endpoint URL is required"));

        form.fields_mut(Provider::Local).endpoint_url = "http://localhost:11434".to_string();
        let config = form.begin_save(now()).unwrap();
        assert_eq!(
            config,
            ProviderConfig::Local {
                endpoint_url: "http://localhost:11434".to_string(),
                api_key: String::new(),
                model: "llama2".to_string(),
            }
        );
    }

    #[test]
    fn assembly_reads_only_the_selected_variant() {
        let mut form = SettingsForm::new();
        form.fields_mut(Provider::Groq).api_key = "gsk-1".to_string();
        form.fields_mut(Provider::Groq).model = "llama-3.1-8b-instant".to_string();
        form.fields_mut(Provider::Openai).api_key = "sk-other".to_string();
        form.select(Provider::Groq);

        let config = form.begin_save(now()).unwrap();
        assert_eq!(
            config,
            ProviderConfig::Groq {
                api_key: "gsk-1".to_string(),
                model: "llama-3.1-8b-instant".to_string(),
            }
        );
    }

    #[test]
    fn save_and_test_busy_flags_are_independent() {
        let mut form = SettingsForm::new();
        form.fields_mut(Provider::Groq).api_key = "gsk-1".to_string();

        assert!(form.begin_save(now()).is_some());
        assert!(form.is_saving());
        // A second save is gated; a test is not.
        assert!(form.begin_save(now()).is_none());
        assert!(form.begin_test(now()).is_some());
        assert!(form.is_testing());

        form.handle_event(
            SettingsEvent::TestAck(SettingsAck {
                success: true,
                error: None,
            }),
            now(),
        );
        assert!(!form.is_testing());
        assert!(form.is_saving());
        assert_eq!(form.notice().unwrap().text, "Connection test successful!");
    }

    #[test]
    fn failed_ack_surfaces_backend_error_or_fallback() {
        let mut form = SettingsForm::new();
        form.handle_event(
            SettingsEvent::SaveAck(SettingsAck {
                success: false,
                error: Some("invalid key".to_string()),
            }),
            now(),
        );
        assert_eq!(form.notice().unwrap().text, "invalid key");

        form.handle_event(
            SettingsEvent::SaveAck(SettingsAck {
                success: false,
                error: None,
            }),
            now(),
        );
        assert_eq!(form.notice().unwrap().text, "Failed to save settings");
    }

    #[test]
    fn selection_change_resets_focus_off_hidden_fields() {
        let mut form = SettingsForm::new();
        form.select(Provider::Local);
        form.focus = Focus::Field(FieldKind::Endpoint);
        form.select(Provider::Groq);
        assert_eq!(form.focus, Focus::Selector);
    }

    #[test]
    fn typing_edits_only_the_focused_field_of_the_selected_variant() {
        use crossterm::event::KeyModifiers;
        let mut form = SettingsForm::new();
        form.focus = Focus::Field(FieldKind::ApiKey);
        for c in "gsk".chars() {
            form.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE), now());
        }
        assert_eq!(form.fields(Provider::Groq).api_key, "gsk");
        assert_eq!(form.fields(Provider::Openai).api_key, "");
    }
}
