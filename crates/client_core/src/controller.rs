//! Two-phase (tap-to-move) move selection.
//!
//! The controller's entire persistent state is the pending origin square.
//! Every square activation either starts a selection, redirects it, clears
//! it, or commits a move; drags are a one-shot commit with implicit origin.

use engine::{Game, MoveRecord, SanApplyError, Square};
use tracing::debug;

use crate::BoardView;

/// What a square activation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Nothing changed: empty square with no selection, or the game is over.
    Ignored,
    /// A pending origin was started (or redirected) and its destinations
    /// highlighted.
    Selected { from: Square, targets: Vec<Square> },
    /// The pending origin was dropped and highlights cleared.
    Cleared,
    /// A move was committed and the view updated.
    Moved { record: MoveRecord, game_over: bool },
}

/// Outcome of a drag-and-drop commit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Illegal: the view keeps its old position, so the piece snaps back.
    Snapback,
    Moved { record: MoveRecord, game_over: bool },
}

pub struct SelectionController {
    game: Game,
    pending: Option<Square>,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionController {
    pub fn new() -> Self {
        Self::with_game(Game::new())
    }

    pub fn with_game(game: Game) -> Self {
        Self {
            game,
            pending: None,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn pending(&self) -> Option<Square> {
        self.pending
    }

    /// Handles one tap (or click) on `square`.
    ///
    /// Game-over suppresses both this path and [`Self::handle_drop`]; the
    /// two input paths share one policy.
    pub fn handle_square_activation(
        &mut self,
        square: Square,
        view: &mut dyn BoardView,
    ) -> Activation {
        if self.game.is_game_over() {
            return Activation::Ignored;
        }

        match self.pending {
            None => self.select(square, view),
            Some(origin) if origin == square => {
                debug!(%square, "pending origin reactivated; clearing selection");
                self.pending = None;
                view.clear_highlights();
                Activation::Cleared
            }
            Some(origin) => match self.game.try_move(origin, square) {
                Ok(record) => self.committed(record, view),
                Err(_) if self.game.piece_at(square).is_some() => {
                    debug!(%origin, %square, "illegal commit; redirecting selection");
                    view.clear_highlights();
                    self.select(square, view)
                }
                Err(_) => {
                    debug!(%origin, %square, "illegal commit onto empty square; clearing");
                    self.pending = None;
                    view.clear_highlights();
                    Activation::Cleared
                }
            },
        }
    }

    /// Handles a drag release: one commit attempt from `source` to `target`.
    pub fn handle_drop(
        &mut self,
        source: Square,
        target: Square,
        view: &mut dyn BoardView,
    ) -> DropOutcome {
        self.pending = None;
        view.clear_highlights();
        if self.game.is_game_over() {
            return DropOutcome::Snapback;
        }
        match self.game.try_move(source, target) {
            Ok(record) => {
                let game_over = self.game.is_game_over();
                view.set_position(&self.game.fen());
                if game_over {
                    view.mark_game_over();
                }
                DropOutcome::Moved { record, game_over }
            }
            Err(err) => {
                debug!(%err, "drop rejected; snapping back");
                DropOutcome::Snapback
            }
        }
    }

    /// Applies the SAN token returned by the move server and refreshes the
    /// view.
    pub fn apply_bot_move(
        &mut self,
        san: &str,
        view: &mut dyn BoardView,
    ) -> Result<MoveRecord, SanApplyError> {
        let record = self.game.apply_san(san)?;
        view.set_position(&self.game.fen());
        if self.game.is_game_over() {
            view.mark_game_over();
        }
        Ok(record)
    }

    fn select(&mut self, square: Square, view: &mut dyn BoardView) -> Activation {
        let moves = self.game.legal_moves_from(square);
        if moves.is_empty() && self.pending.is_none() {
            return Activation::Ignored;
        }
        let targets: Vec<Square> = moves.iter().map(|m| m.to).collect();
        for target in &targets {
            view.highlight_square(*target);
        }
        self.pending = Some(square);
        debug!(%square, targets = targets.len(), "selection started");
        Activation::Selected {
            from: square,
            targets,
        }
    }

    fn committed(&mut self, record: MoveRecord, view: &mut dyn BoardView) -> Activation {
        self.pending = None;
        view.clear_highlights();
        let game_over = self.game.is_game_over();
        view.set_position(&self.game.fen());
        if game_over {
            view.mark_game_over();
        }
        debug!(san = %record.san, game_over, "move committed");
        Activation::Moved { record, game_over }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
