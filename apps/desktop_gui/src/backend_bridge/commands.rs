//! Commands queued from the UI to the backend worker.

pub enum BackendCommand {
    /// `session` identifies the game the request belongs to; the worker
    /// echoes it so replies that outlive a "New game" can be dropped.
    RequestBotMove {
        session: u64,
        fen: String,
        pgn: String,
    },
}
