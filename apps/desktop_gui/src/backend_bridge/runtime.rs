//! Backend worker: owns the tokio runtime and the HTTP client, consumes the
//! UI command queue, and reports results back as [`UiEvent`]s.

use std::thread;
use std::time::Duration;

use client_core::BotMoveClient;
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    server_url: String,
    bot_delay: Duration,
) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let client = BotMoveClient::new(server_url).with_delay(bot_delay);
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::RequestBotMove { session, fen, pgn } => {
                        match client.fetch_bot_move(&fen, &pgn).await {
                            Ok(reply) => {
                                let _ = ui_tx.try_send(UiEvent::BotMove {
                                    session,
                                    san: reply.san,
                                    score: reply.score,
                                });
                            }
                            Err(err) => {
                                tracing::warn!(error = %err, "bot move fetch failed");
                                let _ = ui_tx.try_send(UiEvent::BotMoveFailed {
                                    session,
                                    error: UiError::from_message(
                                        UiErrorContext::BotMove,
                                        err.to_string(),
                                    ),
                                });
                            }
                        }
                    }
                }
            }
        });
    });
}
