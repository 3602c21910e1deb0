pub mod config;
pub mod database;
pub mod groups;
pub mod tasks;
pub mod users;

pub use database::Database;

use std::io;
use std::path::{Path, PathBuf};

/// 获取 ~/.dolt/ 目录路径
pub fn dolt_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".dolt")
}

/// 默认数据库路径: ~/.dolt/dolt.db
pub fn default_database_path() -> PathBuf {
    dolt_dir().join("dolt.db")
}

/// 从 TOML 文件加载反序列化数据
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> io::Result<T> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// 将数据序列化后保存到 TOML 文件
pub fn save_toml<T: serde::Serialize>(path: &Path, data: &T) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content =
        toml::to_string_pretty(data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, content)
}
