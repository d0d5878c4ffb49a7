//! Client-side core for the bot-play chess app.
//!
//! Owns the tap-to-move selection controller, the command boundary towards
//! the board widget ([`BoardView`]), the HTTP client that asks the server
//! for the bot's reply, and the pure presentation helpers (status line,
//! move-history table, eval-bar mapping). The GUI shell wires these
//! together but holds no game logic of its own.

use engine::Square;

pub mod bot_client;
pub mod controller;
pub mod display;

pub use bot_client::{BotMoveClient, BotMoveError, DEFAULT_BOT_MOVE_DELAY};
pub use controller::{Activation, DropOutcome, SelectionController};
pub use display::{history_rows, score_to_percentage, status_line, HistoryRow};

/// Commands the controller issues to the board widget.
///
/// The view is write-only from the controller's perspective: it never
/// answers queries, it only renders. Highlights accumulate until
/// [`BoardView::clear_highlights`]; `set_position` replaces the displayed
/// position wholesale, which is also what makes an illegal drag snap back
/// (the view never saw the piece leave its square).
pub trait BoardView {
    fn highlight_square(&mut self, square: Square);
    fn clear_highlights(&mut self);
    fn set_position(&mut self, fen: &str);
    fn mark_game_over(&mut self);
}
