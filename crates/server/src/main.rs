use std::net::SocketAddr;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use engine::Game;
use rand::Rng;
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{ServerMoveRequest, ServerMoveResponse},
};
use tracing::{debug, info};

mod config;

use config::load_settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let app = build_router();

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "move server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router() -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/get_server_move", post(get_server_move))
}

async fn healthz() -> &'static str {
    "ok"
}

/// Picks a uniformly random legal move for the side to move in the posted
/// position and scores the resulting position by material, from the mover's
/// point of view.
async fn get_server_move(
    Json(req): Json<ServerMoveRequest>,
) -> Result<Json<ServerMoveResponse>, (StatusCode, Json<ApiError>)> {
    debug!(fen = %req.fen, pgn_len = req.pgn.len(), "bot move requested");

    let mut game = Game::from_fen(&req.fen).map_err(|e| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiError::new(
                ErrorCode::Validation,
                format!("invalid fen: {e}"),
            )),
        )
    })?;

    let moves = game.legal_moves();
    if moves.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiError::new(
                ErrorCode::Validation,
                "position has no legal moves",
            )),
        ));
    }

    let mover = game.turn();
    let pick = &moves[rand::thread_rng().gen_range(0..moves.len())];
    let record = game.try_move(pick.from, pick.to).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new(ErrorCode::Internal, e.to_string())),
        )
    })?;

    let score = f64::from(game.material_balance(mover));
    debug!(san = %record.san, score, "bot move chosen");

    Ok(Json(ServerMoveResponse {
        san: record.san,
        score,
        message: format!("Random move from server for input fen: {}", req.fen),
    }))
}
