use clap::Parser;
use dotenvy::dotenv;
use room_chat::config::{self, ConfigOverrides};
use room_chat::network::{self, ChannelAdapter, ChannelSession};
use room_chat::sync::{RoomSession, RoomSettings};
use room_chat::ui::ChatApp;

#[derive(Parser)]
#[command(name = "room_chat", version, about = "Real-time room chat client")]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Room to join, overrides config and environment
    #[arg(long)]
    room: Option<String>,
    /// Display name, overrides config and environment
    #[arg(long)]
    username: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    dotenv().ok();
    // Khởi tạo Logger để debug
    env_logger::init();

    let cli = Cli::parse();
    let mut app_config = config::load_config(&cli.config);
    app_config.apply_overrides(config::env_overrides());
    app_config.apply_overrides(ConfigOverrides {
        room_id: cli.room,
        username: cli.username,
    });

    // 1. Khởi chạy Network Task (Chạy ngầm)
    let bootstrap_peers = network::parse_bootstrap_peers(&app_config.bootstrap_nodes);
    log::info!(
        "Client started with {} bootstrap peers",
        bootstrap_peers.len()
    );
    let mut channel = Some(ChannelSession::connect(
        &app_config.topic_prefix,
        bootstrap_peers,
    ));
    let settings = RoomSettings::from(&app_config);

    // 2. Khởi chạy UI (Chạy trên Main Thread)
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Room Chat",
        options,
        Box::new(move |cc| {
            let channel = channel
                .take()
                .expect("ChatApp should only be initialized once");
            let session = RoomSession::join(ChannelAdapter::new(channel), settings.clone());
            Ok(Box::new(ChatApp::new(cc, session)))
        }),
    )
}
