//! UI layer: the application shell and the board widget.

pub mod app;

pub use app::BotPlayApp;
