//! Dolt 统一错误类型定义
//!
//! 使用 `thiserror` 库提供统一的错误处理，支持错误链式传播。

use std::io;
use thiserror::Error;

/// Dolt 错误类型
#[derive(Debug, Error)]
pub enum DoltError {
    /// I/O 错误（文件读写、目录操作等）
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// SQLite 错误
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// 配置错误
    #[error("Config error: {0}")]
    Config(String),

    /// TOML 解析错误
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML 序列化错误
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON 解析错误
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// 存储错误（通用）
    #[error("Storage error: {0}")]
    Storage(String),

    /// 资源不存在
    #[error("Not found: {0}")]
    NotFound(String),

    /// 参数校验失败（如缺少标题）
    #[error("Validation error: {0}")]
    Validation(String),

    /// 身份校验失败（签名错误 / 未知用户）
    #[error("Auth error: {0}")]
    Auth(String),
}

/// Dolt Result 类型别名
pub type Result<T> = std::result::Result<T, DoltError>;

impl DoltError {
    /// 创建 Config 错误
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// 创建 Storage 错误
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// 创建 NotFound 错误
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// 创建 Validation 错误
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// 创建 Auth 错误
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// 是否为 NotFound
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DoltError::validation("title is required");
        assert_eq!(err.to_string(), "Validation error: title is required");

        let err = DoltError::not_found("group 'Errands'");
        assert_eq!(err.to_string(), "Not found: group 'Errands'");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let dolt_err: DoltError = io_err.into();
        assert!(matches!(dolt_err, DoltError::Io(_)));
    }

    #[test]
    fn test_sqlite_error_conversion() {
        let dolt_err: DoltError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(dolt_err, DoltError::Sqlite(_)));
        assert!(!dolt_err.is_not_found());
        assert!(DoltError::not_found("task 3").is_not_found());
    }
}
