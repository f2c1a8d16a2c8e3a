//! Settings screen: provider configuration form and system info panel.

pub mod form;
pub mod info;
pub mod notice;

pub use form::{SettingsAction, SettingsForm};
