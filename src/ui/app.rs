//! Application event loop: one cooperative UI thread, with backend calls on
//! spawned tasks that report back through single-shot outcome channels.

use crate::api::ApiClient;
use crate::config::Config;
use crate::events::{ChatEvent, SettingsEvent, TurnOutcome};
use crate::provider::ProviderConfig;
use crate::ui::chat::{ChatAction, ChatController};
use crate::ui::settings::{SettingsAction, SettingsForm};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};
use std::io::Stdout;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Delay before re-fetching settings after a save, so the backend's masked
/// secret representation is picked up.
const SETTINGS_REFETCH_DELAY: Duration = Duration::from_secs(1);

const TICK_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Chat,
    Settings,
}

pub struct App {
    api: ApiClient,
    screen: Screen,
    chat: ChatController,
    settings: SettingsForm,
    settings_loaded: bool,
    chat_tx: mpsc::UnboundedSender<ChatEvent>,
    chat_rx: mpsc::UnboundedReceiver<ChatEvent>,
    settings_tx: mpsc::UnboundedSender<SettingsEvent>,
    settings_rx: mpsc::UnboundedReceiver<SettingsEvent>,
    should_exit: bool,
}

/// Set up the terminal, run the app, and restore the terminal on the way out.
pub async fn run(config: Config) -> Result<()> {
    let api = ApiClient::new(config.backend_url.clone());
    spawn_health_probe(api.clone());

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = App::new(api).run(&mut terminal).await;

    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

/// Fire-and-forget startup probe; its only effect is a diagnostic log entry.
fn spawn_health_probe(api: ApiClient) {
    tokio::spawn(async move {
        match api.health().await {
            Ok(report) if report.is_healthy() => {
                tracing::info!(provider = %report.provider, "backend is healthy");
            }
            Ok(report) => {
                tracing::warn!(status = %report.status, "backend reports unhealthy");
            }
            Err(error) => {
                tracing::error!(error = %error, "backend health check failed");
            }
        }
    });
}

impl App {
    pub fn new(api: ApiClient) -> Self {
        let (chat_tx, chat_rx) = mpsc::unbounded_channel();
        let (settings_tx, settings_rx) = mpsc::unbounded_channel();
        Self {
            api,
            screen: Screen::Chat,
            chat: ChatController::new(),
            settings: SettingsForm::new(),
            settings_loaded: false,
            chat_tx,
            chat_rx,
            settings_tx,
            settings_rx,
            should_exit: false,
        }
    }

    async fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        while !self.should_exit {
            self.drain_outcomes();
            self.settings.tick(Instant::now());
            terminal.draw(|frame| self.draw(frame))?;

            if event::poll(TICK_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
        }
        Ok(())
    }

    /// Drain outcomes pushed by spawned request tasks (called every tick).
    fn drain_outcomes(&mut self) {
        while let Ok(event) = self.chat_rx.try_recv() {
            self.chat.handle_event(event);
        }
        while let Ok(event) = self.settings_rx.try_recv() {
            self.settings.handle_event(event, Instant::now());
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.screen {
            Screen::Chat => match self.chat.handle_key(key) {
                ChatAction::Dispatch(message) => self.dispatch_chat(message),
                ChatAction::RequestClear => self.request_clear(),
                ChatAction::OpenSettings => self.open_settings(),
                ChatAction::Exit => self.should_exit = true,
                ChatAction::None => {}
            },
            Screen::Settings => match self.settings.handle_key(key, Instant::now()) {
                SettingsAction::Save(config) => self.save_settings(config),
                SettingsAction::Test(config) => self.test_settings(config),
                SettingsAction::Back => self.screen = Screen::Chat,
                SettingsAction::None => {}
            },
        }
    }

    fn open_settings(&mut self) {
        self.screen = Screen::Settings;
        if !self.settings_loaded {
            self.settings_loaded = true;
            self.load_settings();
            self.load_system_info();
        }
    }

    fn dispatch_chat(&self, message: String) {
        let api = self.api.clone();
        let tx = self.chat_tx.clone();
        tokio::spawn(async move {
            let outcome = match api.send_message(&message).await {
                Ok(response) => TurnOutcome::Resolved(response),
                Err(error) => TurnOutcome::Failed(error.to_string()),
            };
            let _ = tx.send(ChatEvent::Turn(outcome));
        });
    }

    fn request_clear(&self) {
        let api = self.api.clone();
        let tx = self.chat_tx.clone();
        tokio::spawn(async move {
            let event = match api.clear_conversation().await {
                Ok(()) => ChatEvent::Cleared,
                Err(error) => ChatEvent::ClearFailed(error.to_string()),
            };
            let _ = tx.send(event);
        });
    }

    fn load_settings(&self) {
        let api = self.api.clone();
        let tx = self.settings_tx.clone();
        tokio::spawn(async move {
            let event = match api.get_settings().await {
                Ok(config) => SettingsEvent::Loaded(config),
                Err(error) => SettingsEvent::LoadFailed(error.to_string()),
            };
            let _ = tx.send(event);
        });
    }

    fn load_system_info(&self) {
        let api = self.api.clone();
        let tx = self.settings_tx.clone();
        tokio::spawn(async move {
            let event = match api.health().await {
                Ok(report) => SettingsEvent::SystemInfo(report),
                Err(_) => SettingsEvent::SystemInfoFailed,
            };
            let _ = tx.send(event);
        });
    }

    fn save_settings(&self, config: ProviderConfig) {
        let api = self.api.clone();
        let tx = self.settings_tx.clone();
        tokio::spawn(async move {
            match api.save_settings(&config, false).await {
                Ok(ack) => {
                    let succeeded = ack.success;
                    let _ = tx.send(SettingsEvent::SaveAck(ack));
                    if succeeded {
                        // Pick up the server-side masked key representation.
                        tokio::time::sleep(SETTINGS_REFETCH_DELAY).await;
                        let event = match api.get_settings().await {
                            Ok(config) => SettingsEvent::Loaded(config),
                            Err(error) => SettingsEvent::LoadFailed(error.to_string()),
                        };
                        let _ = tx.send(event);
                    }
                }
                Err(error) => {
                    let _ = tx.send(SettingsEvent::SaveFailed(error.to_string()));
                }
            }
        });
    }

    fn test_settings(&self, config: ProviderConfig) {
        let api = self.api.clone();
        let tx = self.settings_tx.clone();
        tokio::spawn(async move {
            let event = match api.save_settings(&config, true).await {
                Ok(ack) => SettingsEvent::TestAck(ack),
                Err(error) => SettingsEvent::TestFailed(error.to_string()),
            };
            let _ = tx.send(event);
        });
    }

    fn draw(&self, frame: &mut Frame) {
        match self.screen {
            Screen::Chat => self.draw_chat(frame),
            Screen::Settings => frame.render_widget(&self.settings, frame.size()),
        }
    }

    fn draw_chat(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(10),
                Constraint::Length(8),
                Constraint::Length(4),
            ])
            .split(frame.size());

        frame.render_widget(self.chat.transcript(), chunks[0]);
        frame.render_widget(self.chat.terminal(), chunks[1]);
        frame.render_widget(self.chat.composer(), chunks[2]);

        if self.chat.confirm_pending() {
            draw_confirm_modal(frame);
        }
    }
}

fn draw_confirm_modal(frame: &mut Frame) {
    let area = centered_rect(50, 5, frame.size());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Confirm")
        .style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let lines = [
        Line::from(Span::raw("Clear the chat history?")),
        Line::from(Span::styled(
            "y: clear    n/Esc: keep",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    for (i, line) in lines.iter().enumerate() {
        if i < inner.height as usize {
            frame
                .buffer_mut()
                .set_line(inner.x, inner.y + i as u16, line, inner.width);
        }
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
