use crate::api::{ChatResponse, HealthReport, SettingsAck};
use crate::provider::ProviderConfig;

/// Role of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// Outcome of one chat turn, pushed by the spawned request task when the
/// backend call resolves or faults.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The backend replied (the reply itself may still report failure).
    Resolved(ChatResponse),
    /// Transport or parse fault; carries the user-visible message.
    Failed(String),
}

/// Events flowing back into the chat screen from spawned tasks.
#[derive(Debug)]
pub enum ChatEvent {
    Turn(TurnOutcome),
    /// The clear call resolved; local views reset regardless of reply content.
    Cleared,
    /// The clear call faulted in transit; logged only, views stay as they are.
    ClearFailed(String),
}

/// Events flowing back into the settings screen from spawned tasks.
#[derive(Debug)]
pub enum SettingsEvent {
    Loaded(ProviderConfig),
    LoadFailed(String),
    SaveAck(SettingsAck),
    SaveFailed(String),
    TestAck(SettingsAck),
    TestFailed(String),
    SystemInfo(HealthReport),
    SystemInfoFailed,
}
