//! Terminal UI: screens, event loop, and widgets.

pub mod app;
pub mod chat;
pub mod settings;

pub use app::run;
