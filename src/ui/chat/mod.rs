//! Chat screen: transcript, terminal log, and input composer.

pub mod commands;
pub mod composer;
pub mod controller;
pub mod markdown;
pub mod terminal;
pub mod transcript;

pub use controller::{ChatAction, ChatController};
