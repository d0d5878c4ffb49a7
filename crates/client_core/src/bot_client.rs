//! HTTP client for the opponent-move endpoint.

use std::time::Duration;

use reqwest::Client;
use shared::protocol::{ServerMoveRequest, ServerMoveResponse};
use thiserror::Error;
use tracing::{debug, warn};

/// Pause between the player's move landing on the board and the request for
/// the bot's reply, leaving a beat for the move animation.
pub const DEFAULT_BOT_MOVE_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum BotMoveError {
    #[error("bot move request failed after retry: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Asks the server for the bot's move. Transient failures get one retry,
/// then the error is surfaced so the UI can show a "move unavailable"
/// status instead of failing silently.
pub struct BotMoveClient {
    http: Client,
    server_url: String,
    delay: Duration,
}

impl BotMoveClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            server_url: server_url.into(),
            delay: DEFAULT_BOT_MOVE_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits out the configured delay, then fetches the bot's reply for the
    /// given position and game record.
    pub async fn fetch_bot_move(
        &self,
        fen: &str,
        pgn: &str,
    ) -> Result<ServerMoveResponse, BotMoveError> {
        tokio::time::sleep(self.delay).await;

        match self.request(fen, pgn).await {
            Ok(response) => Ok(response),
            Err(first) => {
                warn!(error = %first, "bot move request failed; retrying once");
                self.request(fen, pgn).await.map_err(BotMoveError::Transport)
            }
        }
    }

    async fn request(&self, fen: &str, pgn: &str) -> Result<ServerMoveResponse, reqwest::Error> {
        debug!(%fen, "requesting bot move");
        self.http
            .post(format!("{}/api/get_server_move", self.server_url))
            .json(&ServerMoveRequest {
                fen: fen.to_string(),
                pgn: pgn.to_string(),
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[cfg(test)]
#[path = "tests/bot_client_tests.rs"]
mod tests;
