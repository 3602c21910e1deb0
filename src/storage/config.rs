//! 应用配置持久化
//!
//! 配置文件: ~/.dolt/config.toml，不存在时使用默认值；
//! 环境变量优先于文件。

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

use super::{default_database_path, dolt_dir, load_toml, save_toml};

/// 数据库路径环境变量
pub const ENV_DATABASE_PATH: &str = "DOLT_DATABASE_PATH";
/// Slack signing secret 环境变量
pub const ENV_SLACK_SIGNING_SECRET: &str = "SLACK_SIGNING_SECRET";
/// API HMAC 密钥环境变量
pub const ENV_API_SECRET: &str = "DOLT_API_SECRET";

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub slack: SlackConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3030
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    /// SQLite 文件路径，缺省为 ~/.dolt/dolt.db
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_database_path)
    }
}

/// Slack 集成配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SlackConfig {
    /// Slash command 请求签名密钥；未设置时不校验签名
    #[serde(default)]
    pub signing_secret: Option<String>,
}

/// JSON API 配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    /// HMAC 密钥；未设置时 API 不做签名校验
    #[serde(default)]
    pub secret_key: Option<String>,
}

impl Config {
    /// 用环境变量覆盖
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = non_empty(ENV_DATABASE_PATH) {
            self.database.path = Some(PathBuf::from(path));
        }
        if let Some(secret) = non_empty(ENV_SLACK_SIGNING_SECRET) {
            self.slack.signing_secret = Some(secret);
        }
        if let Some(secret) = non_empty(ENV_API_SECRET) {
            self.api.secret_key = Some(secret);
        }
    }

    /// 用于展示的副本（隐藏密钥）
    pub fn redacted(&self) -> Self {
        let mask = |s: &Option<String>| s.as_ref().map(|_| "********".to_string());
        let mut copy = self.clone();
        copy.slack.signing_secret = mask(&self.slack.signing_secret);
        copy.api.secret_key = mask(&self.api.secret_key);
        copy
    }
}

/// 获取配置文件路径
pub fn config_path() -> PathBuf {
    dolt_dir().join("config.toml")
}

/// 从指定文件加载配置（不存在则返回默认值）
pub fn load_config_from(path: &Path) -> io::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    load_toml(path)
}

/// 加载配置并应用环境变量
pub fn load_config() -> io::Result<Config> {
    let mut config = load_config_from(&config_path())?;
    config.apply_env();
    Ok(config)
}

/// 保存配置
pub fn save_config(config: &Config) -> io::Result<()> {
    save_toml(&config_path(), config)
}
