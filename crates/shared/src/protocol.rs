use serde::{Deserialize, Serialize};

/// Request body for `POST /api/get_server_move`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerMoveRequest {
    pub fen: String,
    pub pgn: String,
}

/// Reply with the bot's chosen move.
///
/// `san` rides on the wire as `move`, which is a keyword in most clients.
/// `score` is a centipawn evaluation of the resulting position from the
/// perspective of the side that just moved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerMoveResponse {
    #[serde(rename = "move")]
    pub san: String,
    pub score: f64,
    pub message: String,
}
