use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::error::{
    ChatError, ChatResult, ParseConfigSnafu, ReadConfigSnafu, SerializeConfigSnafu,
    WriteConfigSnafu,
};

pub const DEFAULT_CONFIG_PATH: &str = "config/room_chat.json";
pub const ROOM_ENV: &str = "ROOM_CHAT_ROOM";
pub const USERNAME_ENV: &str = "ROOM_CHAT_USERNAME";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub room_id: String,
    pub username: String,
    pub typing_idle_ms: u64,
    pub remote_typing_expiry_ms: u64,
    pub topic_prefix: String,
    pub bootstrap_nodes: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            room_id: "test-room-id".to_string(),
            username: "user".to_string(),
            typing_idle_ms: 2000,
            remote_typing_expiry_ms: 5000,
            topic_prefix: "room-chat".to_string(),
            bootstrap_nodes: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn typing_idle(&self) -> Duration {
        Duration::from_millis(self.typing_idle_ms)
    }

    pub fn remote_typing_expiry(&self) -> Duration {
        Duration::from_millis(self.remote_typing_expiry_ms)
    }

    /// Blank overrides are ignored.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(room_id) = overrides.room_id.filter(|room| !room.trim().is_empty()) {
            self.room_id = room_id;
        }
        if let Some(username) = overrides.username.filter(|name| !name.trim().is_empty()) {
            self.username = username;
        }
    }
}

/// Values that can replace what the config file says.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub room_id: Option<String>,
    pub username: Option<String>,
}

pub fn env_overrides() -> ConfigOverrides {
    ConfigOverrides {
        room_id: std::env::var(ROOM_ENV).ok(),
        username: std::env::var(USERNAME_ENV).ok(),
    }
}

pub fn read_config(path: &str) -> ChatResult<AppConfig> {
    let content = fs::read_to_string(path).context(ReadConfigSnafu { path })?;
    serde_json::from_str::<AppConfig>(&content).context(ParseConfigSnafu { path })
}

pub fn load_config(path: &str) -> AppConfig {
    match read_config(path) {
        Ok(config) => config,
        Err(ChatError::ReadConfig { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            log::info!("Config file {path} not found ({source}); using defaults");
            AppConfig::default()
        }
        Err(err) => {
            log::warn!("{err}; using defaults");
            AppConfig::default()
        }
    }
}

pub fn save_config(path: &str, config: &AppConfig) -> ChatResult<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context(WriteConfigSnafu { path })?;
        }
    }
    let json = serde_json::to_string_pretty(config).context(SerializeConfigSnafu)?;
    fs::write(path, json).context(WriteConfigSnafu { path })
}
