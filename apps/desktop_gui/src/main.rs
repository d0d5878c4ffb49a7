use std::time::Duration;

use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;

#[derive(Debug, Parser)]
#[command(name = "bot-play", about = "Play casual chess against a server-side bot")]
struct Args {
    /// Base URL of the move server.
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    server_url: String,

    /// Pause before each bot move request, in milliseconds.
    #[arg(long, default_value_t = 250)]
    bot_delay_ms: u64,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(
        cmd_rx,
        ui_tx,
        args.server_url.clone(),
        Duration::from_millis(args.bot_delay_ms),
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Bot Play Chess")
            .with_inner_size([1080.0, 760.0])
            .with_min_inner_size([820.0, 620.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Bot Play Chess",
        options,
        Box::new(move |_cc| Ok(Box::new(ui::BotPlayApp::new(cmd_tx, ui_rx)))),
    )
}
