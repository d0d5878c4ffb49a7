//! Application shell: board widget, eval bar, move table, and the event
//! pump that feeds bot replies back into the game.

use std::time::Duration;

use client_core::{
    history_rows, score_to_percentage, status_line, Activation, BoardView, DropOutcome,
    SelectionController,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use engine::{Color, Square};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{err_label, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

const LIGHT_SQUARE: egui::Color32 = egui::Color32::from_rgb(238, 238, 210);
const DARK_SQUARE: egui::Color32 = egui::Color32::from_rgb(118, 150, 86);
const SELECTED_SQUARE: egui::Color32 = egui::Color32::from_rgb(246, 246, 105);
const TARGET_DOT: egui::Color32 = egui::Color32::from_rgb(70, 80, 60);
const WHITE_PIECE: egui::Color32 = egui::Color32::from_rgb(245, 245, 245);
const BLACK_PIECE: egui::Color32 = egui::Color32::from_rgb(25, 25, 25);

fn piece_glyph(piece: char) -> Option<char> {
    Some(match piece {
        'K' => '♔',
        'Q' => '♕',
        'R' => '♖',
        'B' => '♗',
        'N' => '♘',
        'P' => '♙',
        'k' => '♚',
        'q' => '♛',
        'r' => '♜',
        'b' => '♝',
        'n' => '♞',
        'p' => '♟',
        _ => return None,
    })
}

/// Board-field FEN parser for display. Returns piece letters indexed by
/// square (a1 = 0, h8 = 63).
fn parse_board_fen(fen: &str) -> Option<[Option<char>; 64]> {
    let board = fen.split_whitespace().next()?;
    let ranks: Vec<&str> = board.split('/').collect();
    if ranks.len() != 8 {
        return None;
    }

    let mut squares = [None; 64];
    for (i, rank_text) in ranks.iter().enumerate() {
        let rank = 7 - i;
        let mut file = 0usize;
        for c in rank_text.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as usize;
            } else {
                if file >= 8 || piece_glyph(c).is_none() {
                    return None;
                }
                squares[rank * 8 + file] = Some(c);
                file += 1;
            }
        }
        if file != 8 {
            return None;
        }
    }
    Some(squares)
}

fn square_at(board_rect: egui::Rect, square_size: f32, pos: egui::Pos2) -> Option<Square> {
    if !board_rect.contains(pos) {
        return None;
    }
    let file = ((pos.x - board_rect.min.x) / square_size).floor() as u32;
    let row = ((pos.y - board_rect.min.y) / square_size).floor() as u32;
    if file >= 8 || row >= 8 {
        return None;
    }
    Some(Square::new((7 - row) * 8 + file))
}

/// The rendered board. Write-only from the game's point of view: it holds
/// whatever position it was last told to show, which is what makes an
/// illegal drag appear to snap back.
pub struct BoardPanel {
    squares: [Option<char>; 64],
    highlights: Vec<Square>,
    game_over: bool,
}

impl Default for BoardPanel {
    fn default() -> Self {
        Self {
            squares: [None; 64],
            highlights: Vec::new(),
            game_over: false,
        }
    }
}

impl BoardPanel {
    fn piece_letter(&self, square: Square) -> Option<char> {
        self.squares[usize::from(square)]
    }

    fn is_highlighted(&self, square: Square) -> bool {
        self.highlights.contains(&square)
    }
}

impl BoardView for BoardPanel {
    fn highlight_square(&mut self, square: Square) {
        if !self.highlights.contains(&square) {
            self.highlights.push(square);
        }
    }

    fn clear_highlights(&mut self) {
        self.highlights.clear();
    }

    fn set_position(&mut self, fen: &str) {
        match parse_board_fen(fen) {
            Some(squares) => self.squares = squares,
            None => tracing::warn!(%fen, "unparseable fen from game state"),
        }
    }

    fn mark_game_over(&mut self) {
        self.game_over = true;
    }
}

pub struct BotPlayApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    controller: SelectionController,
    board: BoardPanel,

    status: String,
    eval_percent: f64,
    awaiting_bot: bool,
    drag_from: Option<Square>,
    // bumped on every reset; replies tagged with an older value are stale
    session: u64,
}

impl BotPlayApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let controller = SelectionController::new();
        let mut board = BoardPanel::default();
        board.set_position(&controller.game().fen());
        let status = status_line(controller.game());
        Self {
            cmd_tx,
            ui_rx,
            controller,
            board,
            status,
            eval_percent: 50.0,
            awaiting_bot: false,
            drag_from: None,
            session: 0,
        }
    }

    fn reset(&mut self) {
        self.controller = SelectionController::new();
        self.board = BoardPanel::default();
        self.board.set_position(&self.controller.game().fen());
        self.eval_percent = 50.0;
        self.awaiting_bot = false;
        self.drag_from = None;
        // a request for the old game may still be in flight; its reply will
        // carry the old session and be dropped by the event pump
        self.session += 1;
        self.refresh_status();
    }

    fn refresh_status(&mut self) {
        self.status = status_line(self.controller.game());
    }

    fn input_locked(&self) -> bool {
        self.awaiting_bot
    }

    fn tap(&mut self, square: Square) {
        let outcome = self
            .controller
            .handle_square_activation(square, &mut self.board);
        if let Activation::Moved { game_over, .. } = outcome {
            self.after_player_move(game_over);
        } else {
            self.refresh_status();
        }
    }

    fn drop(&mut self, from: Square, to: Square) {
        match self.controller.handle_drop(from, to, &mut self.board) {
            DropOutcome::Moved { game_over, .. } => self.after_player_move(game_over),
            DropOutcome::Snapback => self.refresh_status(),
        }
    }

    /// Picking a piece up shows where it may go, like a tap would.
    fn begin_drag(&mut self, from: Square) {
        self.drag_from = Some(from);
        self.board.clear_highlights();
        for hint in self.controller.game().legal_moves_from(from) {
            self.board.highlight_square(hint.to);
        }
    }

    fn after_player_move(&mut self, game_over: bool) {
        if game_over {
            self.refresh_status();
            return;
        }
        self.awaiting_bot = true;
        self.status = "Bot is thinking...".to_string();
        dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::RequestBotMove {
                session: self.session,
                fen: self.controller.game().fen(),
                pgn: self.controller.game().pgn(),
            },
            &mut self.status,
        );
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    tracing::info!(%message, "backend worker");
                }
                UiEvent::BotMove { session, san, score } => {
                    if session != self.session {
                        tracing::debug!(%san, session, "dropping bot reply for an earlier game");
                        continue;
                    }
                    self.awaiting_bot = false;
                    match self.controller.apply_bot_move(&san, &mut self.board) {
                        Ok(record) => {
                            // the side the bot just moved for
                            let bot_color = !self.controller.game().turn();
                            let white_score = if bot_color == Color::White {
                                score
                            } else {
                                -score
                            };
                            self.eval_percent = score_to_percentage(white_score);
                            tracing::debug!(san = %record.san, score, "bot move applied");
                            self.refresh_status();
                        }
                        Err(err) => {
                            tracing::warn!(%san, error = %err, "bot returned an unplayable move");
                            self.status = format!("Bot move error: {err}");
                        }
                    }
                }
                UiEvent::BotMoveFailed { session, error } => {
                    if session != self.session {
                        tracing::debug!(session, "dropping bot failure for an earlier game");
                        continue;
                    }
                    self.awaiting_bot = false;
                    self.status =
                        format!("{} error: {}", err_label(error.category()), error.message());
                }
                UiEvent::Error(err) => {
                    self.awaiting_bot = false;
                    self.status = format!("{} error: {}", err_label(err.category()), err.message());
                }
            }
        }
    }

    fn show_eval_bar(&self, ui: &mut egui::Ui) {
        let height = ui.available_height().max(200.0);
        let (rect, _) =
            ui.allocate_exact_size(egui::vec2(26.0, height), egui::Sense::hover());
        let painter = ui.painter();
        painter.rect_filled(rect, egui::CornerRadius::same(4), egui::Color32::from_rgb(35, 35, 35));
        let white_height = rect.height() * (self.eval_percent as f32 / 100.0);
        let white_rect = egui::Rect::from_min_max(
            egui::pos2(rect.min.x, rect.max.y - white_height),
            rect.max,
        );
        painter.rect_filled(
            white_rect,
            egui::CornerRadius::same(4),
            egui::Color32::from_rgb(232, 232, 232),
        );
    }

    fn show_moves_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Bot Play Chess");
        ui.add_space(4.0);
        if ui.button("New game").clicked() {
            self.reset();
        }
        ui.separator();
        ui.label(&self.status);
        ui.separator();
        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("move_history")
                .striped(true)
                .num_columns(3)
                .min_col_width(48.0)
                .show(ui, |ui| {
                    ui.strong("#");
                    ui.strong("White");
                    ui.strong("Black");
                    ui.end_row();
                    for row in history_rows(self.controller.game()) {
                        ui.label(format!("{}.", row.number));
                        ui.label(row.white);
                        ui.label(row.black);
                        ui.end_row();
                    }
                });
        });
    }

    fn show_board(&mut self, ui: &mut egui::Ui) {
        let side = ui
            .available_height()
            .min(ui.available_width())
            .max(320.0);
        let square_size = side / 8.0;
        let (board_rect, _) =
            ui.allocate_exact_size(egui::vec2(side, side), egui::Sense::hover());
        let painter = ui.painter_at(board_rect);

        let mut tapped = None;
        for rank in 0..8u32 {
            for file in 0..8u32 {
                let square = Square::new(rank * 8 + file);
                let min = board_rect.min
                    + egui::vec2(file as f32 * square_size, (7 - rank) as f32 * square_size);
                let rect = egui::Rect::from_min_size(min, egui::vec2(square_size, square_size));

                let mut fill = if (rank + file) % 2 == 1 {
                    LIGHT_SQUARE
                } else {
                    DARK_SQUARE
                };
                if self.controller.pending() == Some(square) {
                    fill = SELECTED_SQUARE;
                }
                painter.rect_filled(rect, egui::CornerRadius::ZERO, fill);

                if self.board.is_highlighted(square) {
                    painter.circle_filled(rect.center(), square_size * 0.12, TARGET_DOT);
                }

                if self.drag_from != Some(square) {
                    if let Some(letter) = self.board.piece_letter(square) {
                        if let Some(glyph) = piece_glyph(letter) {
                            let color = if letter.is_ascii_uppercase() {
                                WHITE_PIECE
                            } else {
                                BLACK_PIECE
                            };
                            painter.text(
                                rect.center(),
                                egui::Align2::CENTER_CENTER,
                                glyph,
                                egui::FontId::proportional(square_size * 0.75),
                                color,
                            );
                        }
                    }
                }

                let response =
                    ui.interact(rect, ui.id().with(square), egui::Sense::click_and_drag());
                if !self.input_locked() {
                    if response.drag_started() && self.board.piece_letter(square).is_some() {
                        self.begin_drag(square);
                    }
                    if response.clicked() {
                        tapped = Some(square);
                    }
                }
            }
        }

        if self.board.game_over {
            painter.rect_filled(
                board_rect,
                egui::CornerRadius::ZERO,
                egui::Color32::from_rgba_unmultiplied(30, 30, 30, 100),
            );
        }

        if let Some(square) = tapped {
            self.tap(square);
        }

        if let Some(from) = self.drag_from {
            let pointer = ui.input(|i| i.pointer.interact_pos());
            if let Some(pos) = pointer {
                if let Some(letter) = self.board.piece_letter(from) {
                    if let Some(glyph) = piece_glyph(letter) {
                        let color = if letter.is_ascii_uppercase() {
                            WHITE_PIECE
                        } else {
                            BLACK_PIECE
                        };
                        ui.painter().text(
                            pos,
                            egui::Align2::CENTER_CENTER,
                            glyph,
                            egui::FontId::proportional(square_size * 0.75),
                            color,
                        );
                    }
                }
            }
            if ui.input(|i| i.pointer.any_released()) {
                self.drag_from = None;
                let target = pointer.and_then(|pos| square_at(board_rect, square_size, pos));
                match target {
                    Some(to) if !self.input_locked() => self.drop(from, to),
                    // released off the board; the drop hints go away
                    _ => self.board.clear_highlights(),
                }
            }
        }
    }
}

impl eframe::App for BotPlayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::SidePanel::left("eval_panel")
            .exact_width(48.0)
            .resizable(false)
            .show(ctx, |ui| self.show_eval_bar(ui));

        egui::SidePanel::right("moves_panel")
            .min_width(240.0)
            .show(ctx, |ui| self.show_moves_panel(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.show_board(ui));

        if self.awaiting_bot || self.drag_from.is_some() {
            ctx.request_repaint_after(Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::events::{UiError, UiErrorContext};
    use crossbeam_channel::bounded;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn square(name: &str) -> Square {
        name.parse().expect("square")
    }

    fn app_with_channels() -> (
        BotPlayApp,
        Receiver<BackendCommand>,
        Sender<UiEvent>,
    ) {
        let (cmd_tx, cmd_rx) = bounded(8);
        let (ui_tx, ui_rx) = bounded(8);
        (BotPlayApp::new(cmd_tx, ui_rx), cmd_rx, ui_tx)
    }

    #[test]
    fn parses_the_starting_position() {
        let squares = parse_board_fen(START_FEN).expect("board");
        assert_eq!(squares[usize::from(square("a1"))], Some('R'));
        assert_eq!(squares[usize::from(square("e1"))], Some('K'));
        assert_eq!(squares[usize::from(square("e8"))], Some('k'));
        assert_eq!(squares[usize::from(square("e4"))], None);
        assert_eq!(squares.iter().flatten().count(), 32);
    }

    #[test]
    fn rejects_malformed_boards() {
        assert!(parse_board_fen("not a position").is_none());
        assert!(parse_board_fen("8/8/8/8/8/8/8 w - - 0 1").is_none());
        assert!(parse_board_fen("9/8/8/8/8/8/8/8 w - - 0 1").is_none());
        assert!(parse_board_fen("xxxxxxxx/8/8/8/8/8/8/8 w - - 0 1").is_none());
    }

    #[test]
    fn maps_piece_letters_to_glyphs() {
        assert_eq!(piece_glyph('K'), Some('♔'));
        assert_eq!(piece_glyph('p'), Some('♟'));
        assert_eq!(piece_glyph('x'), None);
    }

    #[test]
    fn board_panel_tracks_position_and_highlights() {
        let mut board = BoardPanel::default();
        board.set_position(START_FEN);
        assert_eq!(board.piece_letter(square("d1")), Some('Q'));

        board.highlight_square(square("e3"));
        board.highlight_square(square("e3"));
        board.highlight_square(square("e4"));
        assert!(board.is_highlighted(square("e3")));
        assert_eq!(board.highlights.len(), 2);

        board.clear_highlights();
        assert!(!board.is_highlighted(square("e3")));

        // a bad fen leaves the last good position in place
        board.set_position("garbage");
        assert_eq!(board.piece_letter(square("d1")), Some('Q'));
    }

    #[test]
    fn stale_bot_reply_from_an_earlier_game_is_dropped() {
        let (mut app, cmd_rx, ui_tx) = app_with_channels();

        app.tap(square("e2"));
        app.tap(square("e4"));
        assert!(app.awaiting_bot);
        let BackendCommand::RequestBotMove {
            session: old_session,
            ..
        } = cmd_rx.try_recv().expect("first request");

        app.reset();
        app.tap(square("e2"));
        app.tap(square("e4"));
        let BackendCommand::RequestBotMove {
            session: current, ..
        } = cmd_rx.try_recv().expect("second request");
        assert_ne!(old_session, current);

        // replies for the old game land after the reset
        ui_tx
            .send(UiEvent::BotMove {
                session: old_session,
                san: "Nc6".into(),
                score: 40.0,
            })
            .expect("send");
        ui_tx
            .send(UiEvent::BotMoveFailed {
                session: old_session,
                error: UiError::from_message(UiErrorContext::BotMove, "connection refused"),
            })
            .expect("send");
        app.process_ui_events();
        assert!(app.awaiting_bot);
        assert_eq!(app.status, "Bot is thinking...");
        assert_eq!(app.controller.game().san_history().len(), 1);
        assert_eq!(app.eval_percent, 50.0);

        // the current game's reply still goes through
        ui_tx
            .send(UiEvent::BotMove {
                session: current,
                san: "c5".into(),
                score: 0.0,
            })
            .expect("send");
        app.process_ui_events();
        assert!(!app.awaiting_bot);
        assert_eq!(app.controller.game().san_history().len(), 2);
    }

    #[test]
    fn worker_notices_do_not_clobber_the_status_line() {
        let (mut app, _cmd_rx, ui_tx) = app_with_channels();
        ui_tx
            .send(UiEvent::Info("Backend worker ready".into()))
            .expect("send");
        app.process_ui_events();
        assert_eq!(app.status, "White to move...");
    }

    #[test]
    fn starting_a_drag_shows_the_destination_hints() {
        let (mut app, _cmd_rx, _ui_tx) = app_with_channels();
        app.begin_drag(square("e2"));
        assert_eq!(app.drag_from, Some(square("e2")));
        assert!(app.board.is_highlighted(square("e3")));
        assert!(app.board.is_highlighted(square("e4")));
        assert_eq!(app.board.highlights.len(), 2);

        app.drag_from = None;
        app.drop(square("e2"), square("e5"));
        assert!(app.board.highlights.is_empty());
    }

    #[test]
    fn maps_screen_positions_to_squares() {
        let rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(80.0, 80.0));
        assert_eq!(square_at(rect, 10.0, egui::pos2(5.0, 75.0)), Some(square("a1")));
        assert_eq!(square_at(rect, 10.0, egui::pos2(75.0, 5.0)), Some(square("h8")));
        assert_eq!(square_at(rect, 10.0, egui::pos2(45.0, 45.0)), Some(square("e4")));
        assert_eq!(square_at(rect, 10.0, egui::pos2(100.0, 45.0)), None);
    }
}
