//! Rules oracle for the bot-play client and server.
//!
//! [`Game`] wraps a `shakmaty` position together with the SAN history needed
//! for PGN output and a zobrist history for threefold-repetition detection.
//! All position mutation goes through [`Game::try_move`] and
//! [`Game::apply_san`]; an illegal attempt leaves the game untouched.

use shakmaty::{
    fen::Fen,
    san::{San, SanPlus},
    zobrist::{Zobrist64, ZobristHash},
    CastlingMode, Chess, EnPassantMode, FromSetup, Move, Position, Setup,
};
use thiserror::Error;

pub use shakmaty;
pub use shakmaty::{Color, Piece, Role, Square};

/// A legal move from one square, described by its endpoints.
///
/// Castling is reported with the king's destination square (g1/c1 style), so
/// endpoint pairs line up with what a board UI sends back. Promotions other
/// than to a queen are omitted; move commitment always promotes to a queen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegalMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

/// A committed move, in the state the game was in before it was played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub san: String,
    pub from: Square,
    pub to: Square,
    pub capture: bool,
}

/// Terminal and non-terminal game states, in the order the status line
/// reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress { turn: Color, in_check: bool },
    Checkmate { winner: Color },
    Stalemate { side: Color },
    DrawByRepetition,
    DrawByInsufficientMaterial,
    DrawByFiftyMoveRule,
}

#[derive(Debug, Error)]
pub enum InvalidFen {
    #[error("unreadable FEN: {0}")]
    Parse(#[from] shakmaty::fen::ParseFenError),
    #[error("FEN does not describe a legal position: {0}")]
    Position(String),
}

#[derive(Debug, Error)]
#[error("no legal move from {from} to {to}")]
pub struct IllegalMove {
    pub from: Square,
    pub to: Square,
}

#[derive(Debug, Error)]
pub enum SanApplyError {
    #[error("unreadable SAN token '{token}': {source}")]
    Parse {
        token: String,
        source: shakmaty::san::ParseSanError,
    },
    #[error("SAN token '{token}' is not playable here: {source}")]
    Illegal {
        token: String,
        source: shakmaty::san::SanError,
    },
}

/// Centipawn piece values for the material evaluation.
fn role_value(role: Role) -> i32 {
    match role {
        Role::Pawn => 100,
        Role::Knight => 300,
        Role::Bishop => 300,
        Role::Rook => 500,
        Role::Queen => 900,
        Role::King => 0,
    }
}

#[derive(Debug, Clone)]
pub struct Game {
    pos: Chess,
    sans: Vec<String>,
    hashes: Vec<Zobrist64>,
    start_fullmove: u32,
    started_with_black: bool,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Standard starting position.
    pub fn new() -> Self {
        Self::with_position(Chess::default())
    }

    /// Resumes a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, InvalidFen> {
        let setup = Setup::from(Fen::from_ascii(fen.as_bytes())?);
        let pos = Chess::from_setup(setup, CastlingMode::Standard)
            .map_err(|err| InvalidFen::Position(err.to_string()))?;
        Ok(Self::with_position(pos))
    }

    fn with_position(pos: Chess) -> Self {
        let hash: Zobrist64 = pos.zobrist_hash(EnPassantMode::Legal);
        let start_fullmove = pos.fullmoves().get();
        let started_with_black = pos.turn() == Color::Black;
        Self {
            pos,
            sans: Vec::new(),
            hashes: vec![hash],
            start_fullmove,
            started_with_black,
        }
    }

    pub fn fen(&self) -> String {
        Fen::from_position(self.pos.clone(), EnPassantMode::Legal).to_string()
    }

    pub fn turn(&self) -> Color {
        self.pos.turn()
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.pos.board().piece_at(square)
    }

    /// SAN tokens played so far, oldest first.
    pub fn san_history(&self) -> &[String] {
        &self.sans
    }

    /// Movetext without headers or a result marker, e.g. `1. e4 e5 2. Nf3`.
    pub fn pgn(&self) -> String {
        let mut out = String::new();
        let mut number = self.start_fullmove;
        let mut white_to_move = !self.started_with_black;
        for san in &self.sans {
            if white_to_move {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(&format!("{number}. {san}"));
            } else {
                if out.is_empty() {
                    out.push_str(&format!("{number}... {san}"));
                } else {
                    out.push_str(&format!(" {san}"));
                }
                number += 1;
            }
            white_to_move = !white_to_move;
        }
        out
    }

    /// All legal moves in the current position.
    pub fn legal_moves(&self) -> Vec<LegalMove> {
        self.pos
            .legal_moves()
            .iter()
            .filter_map(|m| self.describe(m))
            .collect()
    }

    /// Legal moves whose origin is `square`. Empty when the square is empty,
    /// holds an enemy piece, or its piece is pinned into immobility.
    pub fn legal_moves_from(&self, square: Square) -> Vec<LegalMove> {
        self.pos
            .legal_moves()
            .iter()
            .filter(|m| m.from() == Some(square))
            .filter_map(|m| self.describe(m))
            .collect()
    }

    fn describe(&self, m: &Move) -> Option<LegalMove> {
        // Underpromotions collapse into the queen entry.
        if m.is_promotion() && m.promotion() != Some(Role::Queen) {
            return None;
        }
        Some(LegalMove {
            from: m.from()?,
            to: self.destination(m),
            promotion: m.promotion(),
        })
    }

    /// Destination square as a UI understands it: the king's target square
    /// for castling, `m.to()` otherwise.
    fn destination(&self, m: &Move) -> Square {
        match m.castling_side() {
            Some(side) => side.king_to(self.pos.turn()),
            None => m.to(),
        }
    }

    /// Attempts the move `from` -> `to`, promoting to a queen when the move
    /// is a promotion. On failure the position is unchanged.
    pub fn try_move(&mut self, from: Square, to: Square) -> Result<MoveRecord, IllegalMove> {
        let chosen = self
            .pos
            .legal_moves()
            .iter()
            .find(|m| {
                m.from() == Some(from)
                    && self.destination(m) == to
                    && (m.promotion().is_none() || m.promotion() == Some(Role::Queen))
            })
            .cloned();
        match chosen {
            Some(m) => Ok(self.play(&m)),
            None => Err(IllegalMove { from, to }),
        }
    }

    /// Plays a SAN token, e.g. one returned by the move server.
    pub fn apply_san(&mut self, token: &str) -> Result<MoveRecord, SanApplyError> {
        let san: San = token.trim_end_matches(['+', '#']).parse().map_err(|source| {
            SanApplyError::Parse {
                token: token.to_string(),
                source,
            }
        })?;
        let m = san.to_move(&self.pos).map_err(|source| SanApplyError::Illegal {
            token: token.to_string(),
            source,
        })?;
        Ok(self.play(&m))
    }

    fn play(&mut self, m: &Move) -> MoveRecord {
        let record = MoveRecord {
            san: SanPlus::from_move(self.pos.clone(), m).to_string(),
            from: m.from().unwrap_or_else(|| m.to()),
            to: self.destination(m),
            capture: m.is_capture(),
        };
        self.pos.play_unchecked(m);
        self.hashes.push(self.pos.zobrist_hash(EnPassantMode::Legal));
        self.sans.push(record.san.clone());
        record
    }

    pub fn is_checkmate(&self) -> bool {
        self.pos.is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.pos.is_stalemate()
    }

    pub fn is_insufficient_material(&self) -> bool {
        self.pos.is_insufficient_material()
    }

    pub fn is_fifty_move_draw(&self) -> bool {
        self.pos.halfmoves() >= 100
    }

    /// The same position (zobrist over board, turn, castling and en passant
    /// rights) has been on the board three or more times.
    pub fn is_threefold_repetition(&self) -> bool {
        let current = self.hashes.last().copied();
        match current {
            Some(hash) => self.hashes.iter().filter(|h| **h == hash).count() >= 3,
            None => false,
        }
    }

    pub fn is_game_over(&self) -> bool {
        !matches!(self.status(), GameStatus::InProgress { .. })
    }

    pub fn status(&self) -> GameStatus {
        if self.pos.is_checkmate() {
            GameStatus::Checkmate {
                winner: !self.pos.turn(),
            }
        } else if self.pos.is_stalemate() {
            GameStatus::Stalemate {
                side: self.pos.turn(),
            }
        } else if self.is_threefold_repetition() {
            GameStatus::DrawByRepetition
        } else if self.pos.is_insufficient_material() {
            GameStatus::DrawByInsufficientMaterial
        } else if self.is_fifty_move_draw() {
            GameStatus::DrawByFiftyMoveRule
        } else {
            GameStatus::InProgress {
                turn: self.pos.turn(),
                in_check: self.pos.is_check(),
            }
        }
    }

    /// Material difference in centipawns from `perspective`'s point of view.
    pub fn material_balance(&self, perspective: Color) -> i32 {
        let board = self.pos.board();
        let mut balance = 0;
        for square in board.occupied() {
            if let Some(piece) = board.piece_at(square) {
                let value = role_value(piece.role);
                if piece.color == perspective {
                    balance += value;
                } else {
                    balance -= value;
                }
            }
        }
        balance
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
