//! Pure presentation helpers: eval-bar mapping, status line, history table.

use engine::{Color, Game, GameStatus};

/// Score at which the eval bar saturates. Eight pawns up is, for display
/// purposes, completely winning.
pub const EVAL_SATURATION_CENTIPAWNS: f64 = 800.0;

/// Maps a centipawn score to the white side's fill percentage of the eval
/// bar: -800 -> 0, 0 -> 50, +800 -> 100, clamped outside that range.
pub fn score_to_percentage(score: f64) -> f64 {
    let clamped = score.clamp(-EVAL_SATURATION_CENTIPAWNS, EVAL_SATURATION_CENTIPAWNS);
    (clamped + EVAL_SATURATION_CENTIPAWNS) / (2.0 * EVAL_SATURATION_CENTIPAWNS) * 100.0
}

/// One row of the move-history table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub number: u32,
    pub white: String,
    pub black: String,
}

/// Rebuilds the full two-column move table from the game's SAN history.
/// Assumes a game played from the standard starting position, so White
/// moves first.
pub fn history_rows(game: &Game) -> Vec<HistoryRow> {
    game.san_history()
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| HistoryRow {
            number: i as u32 + 1,
            white: pair[0].clone(),
            black: pair.get(1).cloned().unwrap_or_default(),
        })
        .collect()
}

fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}

/// One-line game status for the UI.
pub fn status_line(game: &Game) -> String {
    match game.status() {
        GameStatus::InProgress { turn, in_check } => {
            let name = color_name(turn);
            if in_check {
                format!("{name} is in check! {name} to move...")
            } else {
                format!("{name} to move...")
            }
        }
        GameStatus::Checkmate { winner } => {
            format!(
                "{} is in checkmate. {} wins!",
                color_name(!winner),
                color_name(winner)
            )
        }
        GameStatus::Stalemate { side } => format!("{} is stalemated.", color_name(side)),
        GameStatus::DrawByRepetition => "Game is drawn by threefold repetition rule.".to_string(),
        GameStatus::DrawByInsufficientMaterial => {
            "Game is drawn by insufficient material.".to_string()
        }
        GameStatus::DrawByFiftyMoveRule => "Game is drawn by fifty-move rule.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_mapping_hits_the_anchor_points() {
        assert_eq!(score_to_percentage(-800.0), 0.0);
        assert_eq!(score_to_percentage(0.0), 50.0);
        assert_eq!(score_to_percentage(800.0), 100.0);
    }

    #[test]
    fn score_mapping_saturates_outside_the_bounds() {
        assert_eq!(score_to_percentage(-950.0), 0.0);
        assert_eq!(score_to_percentage(950.0), 100.0);
        assert_eq!(score_to_percentage(f64::MAX), 100.0);
    }

    #[test]
    fn score_mapping_is_monotonic() {
        let samples = [-1200.0, -800.0, -400.0, -1.0, 0.0, 1.0, 400.0, 800.0, 1200.0];
        for pair in samples.windows(2) {
            assert!(score_to_percentage(pair[0]) <= score_to_percentage(pair[1]));
        }
    }

    #[test]
    fn history_rows_pair_white_and_black_moves() {
        let mut game = Game::new();
        for san in ["e4", "e5", "Nf3"] {
            game.apply_san(san).expect("move");
        }
        let rows = history_rows(&game);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].number, 1);
        assert_eq!(rows[0].white, "e4");
        assert_eq!(rows[0].black, "e5");
        assert_eq!(rows[1].number, 2);
        assert_eq!(rows[1].white, "Nf3");
        assert_eq!(rows[1].black, "");
    }

    #[test]
    fn status_line_reports_turn_and_check() {
        let mut game = Game::new();
        assert_eq!(status_line(&game), "White to move...");
        for san in ["e4", "e5", "Qh5", "Nc6", "Qxf7"] {
            game.apply_san(san).expect("move");
        }
        assert_eq!(status_line(&game), "Black is in check! Black to move...");
    }

    #[test]
    fn status_line_reports_checkmate_winner() {
        let mut game = Game::new();
        for san in ["f3", "e5", "g4", "Qh4"] {
            game.apply_san(san).expect("move");
        }
        assert_eq!(status_line(&game), "White is in checkmate. Black wins!");
    }

    #[test]
    fn status_line_reports_stalemate_and_draws() {
        let stalemate = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").expect("fen");
        assert_eq!(status_line(&stalemate), "Black is stalemated.");

        let bare_kings = Game::from_fen("K7/8/k7/8/8/8/8/8 w - - 0 1").expect("fen");
        assert_eq!(
            status_line(&bare_kings),
            "Game is drawn by insufficient material."
        );
    }
}
