//! Configuration shared by the native binaries.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

pub const CONFIG_PATH: &str = "config.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub game: GameConfig,
}

impl Config {
    /// Load `config.toml` (writing the defaults when missing), then apply
    /// environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from(Path::new(CONFIG_PATH))?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }

    /// `PORT` sets the web port, `GAME_ADDRESS`/`GAME_PORT` the game server.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("PORT") {
            match port.parse() {
                Ok(port) => self.web.port = port,
                Err(_) => warn!("Ignoring invalid PORT: {}", port),
            }
        }
        if let Some(address) = lookup("GAME_ADDRESS") {
            self.game.address = address;
        }
        if let Some(port) = lookup("GAME_PORT") {
            match port.parse() {
                Ok(port) => self.game.port = port,
                Err(_) => warn!("Ignoring invalid GAME_PORT: {}", port),
            }
        }
    }
}

/// Static front-end server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WebConfig {
    /// Bind address.
    #[serde(default = "default_web_bind")]
    pub bind: String,
    /// Port to listen on.
    #[serde(default = "default_web_port")]
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_web_bind(),
            port: default_web_port(),
        }
    }
}

fn default_web_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_web_port() -> u16 {
    3000
}

/// Game server the clients connect to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GameConfig {
    #[serde(default = "default_game_address")]
    pub address: String,
    #[serde(default = "default_game_port")]
    pub port: u16,
    /// Reconnect with backoff after the connection drops. The browser
    /// client honours this; the terminal spectator always exits.
    #[serde(default)]
    pub reconnect: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            address: default_game_address(),
            port: default_game_port(),
            reconnect: false,
        }
    }
}

impl GameConfig {
    pub fn url(&self) -> String {
        format!("ws://{}:{}/", self.address, self.port)
    }
}

fn default_game_address() -> String {
    "localhost".to_string()
}
fn default_game_port() -> u16 {
    5678
}
