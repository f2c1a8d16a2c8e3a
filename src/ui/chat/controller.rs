//! Conversation controller: one in-flight request at a time, demultiplexing
//! each backend reply into transcript and terminal-log entries.

use crate::api::CommandExecuted;
use crate::events::{ChatEvent, TurnOutcome};
use crate::ui::chat::commands::{SlashCommand, get_help_text};
use crate::ui::chat::composer::{Composer, ComposerResult};
use crate::ui::chat::terminal::TerminalLog;
use crate::ui::chat::transcript::Transcript;
use crossterm::event::{KeyCode, KeyEvent};
use uuid::Uuid;

/// Phase of the current logical turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    Sending,
}

/// Actions the controller asks the app layer to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatAction {
    None,
    /// Dispatch this message to the backend.
    Dispatch(String),
    /// The user confirmed the clear action; call the backend.
    RequestClear,
    OpenSettings,
    Exit,
}

pub struct ChatController {
    transcript: Transcript,
    terminal: TerminalLog,
    composer: Composer,
    phase: TurnPhase,
    placeholder: Option<Uuid>,
    confirm_clear: bool,
}

impl Default for ChatController {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatController {
    pub fn new() -> Self {
        Self {
            transcript: Transcript::new(),
            terminal: TerminalLog::new(),
            composer: Composer::new(),
            phase: TurnPhase::Idle,
            placeholder: None,
            confirm_clear: false,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn terminal(&self) -> &TerminalLog {
        &self.terminal
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn is_sending(&self) -> bool {
        self.phase == TurnPhase::Sending
    }

    pub fn confirm_pending(&self) -> bool {
        self.confirm_clear
    }

    /// Route a key press. Input is inert while a request is outstanding; the
    /// confirmation modal swallows everything except its own answers.
    pub fn handle_key(&mut self, key: KeyEvent) -> ChatAction {
        if self.confirm_clear {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    self.confirm_clear = false;
                    return ChatAction::RequestClear;
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.confirm_clear = false;
                }
                _ => {}
            }
            return ChatAction::None;
        }

        if self.is_sending() {
            return ChatAction::None;
        }

        match self.composer.handle_key(key) {
            ComposerResult::Submitted(content) => match self.begin_turn(&content) {
                Some(message) => ChatAction::Dispatch(message),
                None => ChatAction::None,
            },
            ComposerResult::Command(command) => self.handle_command(command),
            ComposerResult::None => ChatAction::None,
        }
    }

    pub fn handle_command(&mut self, command: SlashCommand) -> ChatAction {
        match command {
            SlashCommand::Clear => {
                self.confirm_clear = true;
                ChatAction::None
            }
            SlashCommand::Settings => ChatAction::OpenSettings,
            SlashCommand::Help => {
                self.transcript.push_assistant_plain(get_help_text());
                ChatAction::None
            }
            SlashCommand::Quit => ChatAction::Exit,
        }
    }

    /// IDLE → SENDING. Appends the user message and a loading placeholder,
    /// locks input, and hands back the trimmed message for dispatch. Empty
    /// input and an already outstanding request both refuse the transition.
    pub fn begin_turn(&mut self, input: &str) -> Option<String> {
        let message = input.trim();
        if message.is_empty() || self.is_sending() {
            return None;
        }

        self.transcript.push_user(message.to_string());
        self.placeholder = Some(self.transcript.push_loading());
        self.composer.clear();
        self.composer.set_focus(false);
        self.phase = TurnPhase::Sending;
        Some(message.to_string())
    }

    pub fn handle_event(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::Turn(outcome) => self.resolve(outcome),
            ChatEvent::Cleared => {
                self.transcript.reset();
                self.terminal.reset();
            }
            ChatEvent::ClearFailed(message) => {
                tracing::error!(%message, "failed to clear conversation");
            }
        }
    }

    /// SENDING → {RESOLVED | FAILED} → IDLE. The placeholder removal and the
    /// unlock run before any response handling, so the input can never stay
    /// disabled whatever the outcome carries.
    pub fn resolve(&mut self, outcome: TurnOutcome) {
        if let Some(id) = self.placeholder.take() {
            self.transcript.remove_loading(id);
        }
        self.phase = TurnPhase::Idle;
        self.composer.set_focus(true);

        match outcome {
            TurnOutcome::Resolved(response) if response.success => {
                if let Some(command) = &response.command_executed {
                    self.record_command(command);
                }
                self.transcript.push_assistant(response.response);
            }
            TurnOutcome::Resolved(response) => {
                let error = response
                    .error
                    .unwrap_or_else(|| "Failed to get response".to_string());
                self.transcript.push_assistant(format!("❌ Error: {error}"));
            }
            TurnOutcome::Failed(message) => {
                self.transcript.push_assistant(format!("❌ Error: {message}"));
            }
        }
    }

    /// Mirror an executed command into the terminal log and, as a distinguished
    /// command-result message, into the transcript.
    fn record_command(&mut self, command: &CommandExecuted) {
        let (output, error) = if command.success {
            (command.output.as_deref(), None)
        } else {
            (None, command.error.as_deref())
        };
        self.terminal.push_execution(&command.command, output, error);

        let mut message = format!("**Command Executed:** `{}`\n\n", command.command);
        if command.success {
            message.push_str(&format!(
                "**Output:**\n```\n{}\n```",
                command.output.as_deref().unwrap_or_default()
            ));
        } else {
            message.push_str(&format!(
                "**Error:**\n```\n{}\n```",
                command.error.as_deref().unwrap_or_default()
            ));
        }
        self.transcript.push_command_result(message);
    }
}
