use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: Option<u16>,
    pub unix_socket: Option<PathBuf>,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Seconds a heartbeat stays fresh before a poll refreshes (and
    /// persists) it.
    #[serde(default = "default_heartbeat_refresh")]
    pub heartbeat_refresh: i64,
    #[serde(default = "default_board_capacity")]
    pub board_capacity: usize,
    #[serde(default = "default_max_participants_per_board")]
    pub max_participants_per_board: usize,
    #[serde(default = "default_max_username_len")]
    pub max_username_len: usize,
    /// Placeholder names rejected at join time.
    #[serde(default = "default_reserved_usernames")]
    pub reserved_usernames: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Required to create or destroy boards.
    pub master_password: String,
    /// Required to read /metrics.
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[allow(dead_code)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_console")]
    pub console: bool,
}

// Default value functions
fn default_num_threads() -> usize {
    num_cpus::get()
}

fn default_max_connections() -> usize {
    10000
}

fn default_heartbeat_refresh() -> i64 {
    900 // 15 minutes
}

fn default_board_capacity() -> usize {
    1000
}

fn default_max_participants_per_board() -> usize {
    500
}

fn default_max_username_len() -> usize {
    40
}

pub fn default_reserved_usernames() -> Vec<String> {
    ["username", "Username", "name", "Name"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_console() -> bool {
    false
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            heartbeat_refresh: default_heartbeat_refresh(),
            board_capacity: default_board_capacity(),
            max_participants_per_board: default_max_participants_per_board(),
            max_username_len: default_max_username_len(),
            reserved_usernames: default_reserved_usernames(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port.is_none() && self.server.unix_socket.is_none() {
            bail!("Either port or unix_socket must be specified in server config");
        }

        if let Some(port) = self.server.port {
            if port == 0 {
                bail!("Server port must be greater than 0");
            }
        }

        if self.server.num_threads == 0 {
            bail!("num_threads must be greater than 0");
        }

        if self.server.max_connections == 0 {
            bail!("max_connections must be greater than 0");
        }

        if self.queue.heartbeat_refresh < 0 {
            bail!("heartbeat_refresh must be non-negative");
        }

        if self.queue.board_capacity == 0 {
            bail!("board_capacity must be greater than 0");
        }

        if self.queue.max_participants_per_board == 0 {
            bail!("max_participants_per_board must be greater than 0");
        }

        if self.queue.max_username_len == 0 {
            bail!("max_username_len must be greater than 0");
        }

        if self.admin.master_password.is_empty() {
            bail!("master_password must not be empty");
        }

        if self.admin.api_key.is_empty() {
            bail!("api_key must not be empty");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        Ok(())
    }
}
